//! Session loop: connect, authenticate, ack and dispatch every frame, reconnect on drop.

use tokio::sync::{broadcast, watch};
use tracing::{debug, error, info, warn};

use crate::config::ConnectionConfig;
use crate::error::{AppError, AppResult};
use crate::handlers::dispatcher::Dispatcher;
use crate::handlers::transport::Transport;
use crate::services::{classify, ReconnectPolicy};

/// Lifecycle of a session. Every transition is published on [`Session::states`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connecting,
    Authenticated,
    Listening,
    Reconnecting,
    Terminated,
}

/// One long-lived client session. The receive loop is the only driver of its state.
pub struct Session<P> {
    config: ConnectionConfig,
    dispatcher: Dispatcher,
    policy: P,
    shutdown: watch::Receiver<bool>,
    state: SessionState,
    state_tx: broadcast::Sender<SessionState>,
    listened: bool,
}

impl<P: ReconnectPolicy> Session<P> {
    pub fn new(
        config: ConnectionConfig,
        dispatcher: Dispatcher,
        policy: P,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        let (state_tx, _) = broadcast::channel(32);
        Self {
            config,
            dispatcher,
            policy,
            shutdown,
            state: SessionState::Disconnected,
            state_tx,
            listened: false,
        }
    }

    /// Subscribe to state transitions made after this call.
    pub fn states(&self) -> broadcast::Receiver<SessionState> {
        self.state_tx.subscribe()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Run until shutdown (`Ok`) or a fatal error. Transport failures reconnect
    /// according to the policy.
    pub async fn run(&mut self) -> AppResult<()> {
        let mut attempt: u32 = 0;
        loop {
            if *self.shutdown.borrow() {
                return self.terminate(Ok(()));
            }

            self.set_state(SessionState::Connecting);
            self.listened = false;
            let err = match self.connect_and_listen().await {
                Ok(()) => return self.terminate(Ok(())),
                Err(e) if e.is_fatal() => {
                    error!(error = %e, "session stopped");
                    return self.terminate(Err(e));
                }
                Err(e) => e,
            };

            self.set_state(SessionState::Reconnecting);
            if self.listened {
                self.policy.reset();
                attempt = 0;
            }
            attempt = attempt.saturating_add(1);
            let Some(delay) = self.policy.next_delay(attempt) else {
                error!(error = %err, attempts = attempt - 1, "giving up");
                return self.terminate(Err(AppError::RetriesExhausted(attempt - 1)));
            };
            warn!(
                error = %err,
                attempt,
                delay_ms = delay.as_millis() as u64,
                "connection lost; reconnecting"
            );

            let stopped = tokio::select! {
                _ = tokio::time::sleep(delay) => false,
                _ = wait_for_shutdown(&mut self.shutdown) => true,
            };
            if stopped {
                return self.terminate(Ok(()));
            }
        }
    }

    /// One connection: returns `Ok` only when shutdown was observed.
    async fn connect_and_listen(&mut self) -> AppResult<()> {
        let mut transport = tokio::select! {
            res = Transport::connect(&self.config) => res?,
            _ = wait_for_shutdown(&mut self.shutdown) => return Ok(()),
        };

        if self.config.mode.sends_auth() {
            if let Some(token) = &self.config.auth_token {
                transport.authenticate(token).await?;
            }
        }
        self.set_state(SessionState::Authenticated);

        loop {
            let frame = tokio::select! {
                biased;
                _ = wait_for_shutdown(&mut self.shutdown) => None,
                frame = transport.next_frame() => Some(frame),
            };
            let Some(frame) = frame else {
                transport.close().await;
                return Ok(());
            };
            let raw = match frame {
                Some(Ok(raw)) => raw,
                Some(Err(e)) => return Err(e),
                None => return Err(AppError::ConnectionClosed),
            };

            transport.acknowledge().await?;
            // A connection only counts as established once the service talks back.
            if !self.listened {
                self.set_state(SessionState::Listening);
                self.listened = true;
            }
            let reply = self.dispatcher.dispatch(classify(&raw)).await;

            if let Some(reply) = reply {
                if *self.shutdown.borrow() {
                    debug!("shutdown observed; reply dropped");
                    transport.close().await;
                    return Ok(());
                }
                transport.send(&reply).await?;
            }
        }
    }

    fn set_state(&mut self, state: SessionState) {
        let previous = std::mem::replace(&mut self.state, state);
        if previous != state {
            info!(from = ?previous, to = ?state, "session state");
            let _ = self.state_tx.send(state);
        }
    }

    fn terminate(&mut self, result: AppResult<()>) -> AppResult<()> {
        self.set_state(SessionState::Terminated);
        result
    }
}

/// Resolves once shutdown is requested. Never resolves if the signal sender is gone.
async fn wait_for_shutdown(rx: &mut watch::Receiver<bool>) {
    let requested = rx.wait_for(|stop| *stop).await.is_ok();
    if !requested {
        std::future::pending::<()>().await;
    }
}
