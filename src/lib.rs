//! Persistent tkpolls client.
//!
//! Keeps one authenticated WebSocket session open, acknowledges every frame,
//! records each announced poll, and answers call events with a ballot built
//! by matching the user's suggestions against the poll options.

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod services;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use handlers::{Dispatcher, Session, SessionState};
pub use models::SuggestionList;

use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;

use repositories::FsRecordStore;
use services::{ExponentialBackoff, PollState};

/// Build a ready-to-run session from configuration. Used by main and by integration tests.
///
/// Fails with [`AppError::Config`] when the suggestion source cannot be read;
/// the session never starts in that case.
pub async fn create_session(
    config: &Config,
    shutdown: watch::Receiver<bool>,
) -> AppResult<Session<ExponentialBackoff>> {
    let suggestions = SuggestionList::load(&config.suggestions_path).await?;
    info!(
        count = suggestions.len(),
        path = %config.suggestions_path.display(),
        "suggestions loaded"
    );

    let store = Arc::new(FsRecordStore::new(&config.records_dir));
    let dispatcher = Dispatcher::new(config.connection.mode, PollState::new(suggestions), store);
    Ok(Session::new(
        config.connection.clone(),
        dispatcher,
        ExponentialBackoff::from(config.backoff),
        shutdown,
    ))
}
