//! Application error types for the session client.

use thiserror::Error;
use tokio_tungstenite::tungstenite;

/// Application-level errors.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Connection error: {0}")]
    Connection(#[from] tungstenite::Error),

    #[error("Connection closed by remote")]
    ConnectionClosed,

    #[error("Invalid handshake header: {0}")]
    InvalidHeader(String),

    #[error("Malformed event: {0}")]
    MalformedEvent(String),

    #[error("Persistence error: {0}")]
    Persistence(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Reconnect attempts exhausted after {0} tries")]
    RetriesExhausted(u32),

    #[error("Shutdown requested")]
    Shutdown,

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Whether the session loop must stop instead of reconnecting.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            AppError::Config(_)
                | AppError::InvalidHeader(_)
                | AppError::RetriesExhausted(_)
                | AppError::Shutdown
        )
    }
}

impl From<crate::config::ConfigLoadError> for AppError {
    fn from(e: crate::config::ConfigLoadError) -> Self {
        AppError::Config(e.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
