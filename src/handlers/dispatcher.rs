//! Routes classified frames to poll state, persistence, and ballot sends.

use std::sync::Arc;
use tracing::{info, warn};

use crate::config::EndpointMode;
use crate::models::event::{Classified, InboundEvent, Outbound};
use crate::repositories::{PollRecord, RecordStore};
use crate::services::PollState;

/// Per-session dispatcher. Owns the session's poll state; nothing is shared between sessions.
pub struct Dispatcher {
    mode: EndpointMode,
    state: PollState,
    store: Arc<dyn RecordStore>,
}

impl Dispatcher {
    pub fn new(mode: EndpointMode, state: PollState, store: Arc<dyn RecordStore>) -> Self {
        Self { mode, state, store }
    }

    pub fn state(&self) -> &PollState {
        &self.state
    }

    /// Handle one classified frame. Returns the frame to send back, if any.
    /// Per-frame failures are logged here and never propagate.
    pub async fn dispatch(&mut self, frame: Classified) -> Option<Outbound> {
        match frame {
            Classified::Heartbeat(raw) => {
                info!(frame = %raw, "heartbeat");
                None
            }
            Classified::Malformed(reason) => {
                warn!(reason = %reason, "malformed event skipped");
                None
            }
            Classified::Event(event) => self.handle_event(event).await,
        }
    }

    async fn handle_event(&mut self, event: InboundEvent) -> Option<Outbound> {
        info!(kind = %event.kind(), "event");
        match event {
            InboundEvent::Poll(snapshot) => {
                let snapshot = self.state.apply_snapshot(snapshot);
                let name = snapshot.record_name();
                let record = PollRecord::from_snapshot(snapshot);
                if let Err(e) = self.store.persist(&name, &record).await {
                    warn!(record = %name, error = %e, "poll record not persisted");
                }
                None
            }
            InboundEvent::Call => {
                let ballot = self.state.ballot().clone();
                if !self.mode.sends_auth() {
                    info!(ballot = %ballot, "spectating; ballot not sent");
                    return None;
                }
                info!(ballot = %ballot, votes = ballot.len(), "casting ballot");
                Some(Outbound::Ballot(ballot))
            }
            InboundEvent::Unrecognized(kind) => {
                warn!(kind = %kind, "unrecognized event kind");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, AppResult};
    use crate::models::suggestion::SuggestionList;
    use crate::services::classify;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryStore {
        names: Mutex<Vec<String>>,
        fail: bool,
    }

    #[async_trait]
    impl RecordStore for MemoryStore {
        async fn persist(&self, name: &str, _record: &PollRecord) -> AppResult<()> {
            if self.fail {
                return Err(AppError::Persistence(std::io::Error::other("disk full")));
            }
            self.names.lock().unwrap().push(name.to_string());
            Ok(())
        }
    }

    const POLL: &str =
        r#"{"Mtype":"poll","Title":"X","Ends":0,"Options":{"65":"Cats","66":"Dogs"}}"#;

    fn dispatcher(mode: EndpointMode, store: Arc<MemoryStore>) -> Dispatcher {
        Dispatcher::new(mode, PollState::new(SuggestionList::new(["dogs"])), store)
    }

    #[tokio::test]
    async fn call_before_poll_sends_empty_ballot() {
        let mut d = dispatcher(EndpointMode::Voter, Arc::default());
        let out = d.dispatch(classify(r#"{"Mtype":"call"}"#)).await;
        assert_eq!(out.unwrap().to_text(), "ballot: ");
    }

    #[tokio::test]
    async fn poll_then_call_sends_matching_ballot() {
        let store = Arc::new(MemoryStore::default());
        let mut d = dispatcher(EndpointMode::Voter, store.clone());
        assert!(d.dispatch(classify(POLL)).await.is_none());
        assert_eq!(store.names.lock().unwrap().len(), 1);
        let out = d.dispatch(classify(r#"{"Mtype":"call"}"#)).await;
        assert_eq!(out.unwrap().to_text(), "ballot: B");
    }

    #[tokio::test]
    async fn persistence_failure_does_not_block_ballot() {
        let store = Arc::new(MemoryStore {
            fail: true,
            ..Default::default()
        });
        let mut d = dispatcher(EndpointMode::Voter, store);
        d.dispatch(classify(POLL)).await;
        assert_eq!(d.state().ballot().encode(), "B");
    }

    #[tokio::test]
    async fn heartbeat_and_malformed_change_nothing() {
        let mut d = dispatcher(EndpointMode::Voter, Arc::default());
        assert!(d.dispatch(classify("ping")).await.is_none());
        assert!(d.dispatch(classify(r#"{"Title":"X"}"#)).await.is_none());
        assert!(d.dispatch(classify(r#"{"Mtype":"tally"}"#)).await.is_none());
        assert!(d.state().snapshot().is_none());
    }

    #[tokio::test]
    async fn spectator_never_sends() {
        let mut d = dispatcher(EndpointMode::Spectator, Arc::default());
        d.dispatch(classify(POLL)).await;
        assert!(d.dispatch(classify(r#"{"Mtype":"call"}"#)).await.is_none());
    }
}
