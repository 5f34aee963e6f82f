//! Application configuration loaded from environment.

use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_VOTER_URL: &str = "wss://tkpolls.com/voter";
const DEFAULT_SPECTATOR_URL: &str = "wss://tkpolls.com/spectatorws";
const DEFAULT_ORIGIN: &str = "https://tkpolls.com";
const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:121.0) Gecko/20100101 Firefox/121.0";

/// Which endpoint the client attaches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointMode {
    /// Authenticates and casts ballots.
    Voter,
    /// Read-only: no `auth:` frame, no ballots.
    ///
    /// The spectator endpoint carries no session token, so the service has no
    /// voter to attribute a ballot to. Ballots are still computed and logged on
    /// `call` but never sent.
    Spectator,
}

impl EndpointMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "voter" | "vote" => Some(EndpointMode::Voter),
            "spectator" | "spectate" => Some(EndpointMode::Spectator),
            _ => None,
        }
    }

    pub fn sends_auth(&self) -> bool {
        matches!(self, EndpointMode::Voter)
    }
}

/// Connection parameters for one session.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    pub mode: EndpointMode,
    /// WebSocket endpoint (e.g. `wss://tkpolls.com/voter`).
    pub endpoint: String,
    /// Session token sent as `auth: <token>`. Absent in spectator mode.
    pub auth_token: Option<String>,
    /// Value of the `sesh` cookie presented during the handshake.
    pub session_cookie: Option<String>,
    pub origin: String,
    pub user_agent: String,
}

/// Reconnect backoff settings.
#[derive(Debug, Clone, Copy)]
pub struct BackoffConfig {
    pub base: Duration,
    pub max: Duration,
    /// `None` retries forever.
    pub max_attempts: Option<u32>,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            base: Duration::from_millis(1000),
            max: Duration::from_millis(60_000),
            max_attempts: None,
        }
    }
}

/// Application configuration loaded from `.env` and environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub connection: ConnectionConfig,
    pub backoff: BackoffConfig,
    /// Suggestion list, one entry per line.
    pub suggestions_path: PathBuf,
    /// Directory receiving one JSON record per poll.
    pub records_dir: PathBuf,
    /// Optional debug-level log file in addition to the console.
    pub log_file: Option<PathBuf>,
    /// Console log level: `error`, `warn`, `info`, `debug`, `trace`.
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment. Call `dotenvy::dotenv().ok()` before this.
    pub fn from_env() -> Result<Self, ConfigLoadError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup (environment, map, ...).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigLoadError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mode = match var("TKVOTE_MODE") {
            Some(raw) => EndpointMode::parse(&raw).ok_or(ConfigLoadError::InvalidMode(raw))?,
            None => EndpointMode::Voter,
        };

        let endpoint = match mode {
            EndpointMode::Voter => {
                var("TKVOTE_VOTER_URL").unwrap_or_else(|| DEFAULT_VOTER_URL.to_string())
            }
            EndpointMode::Spectator => {
                var("TKVOTE_SPECTATOR_URL").unwrap_or_else(|| DEFAULT_SPECTATOR_URL.to_string())
            }
        };

        let auth_token = match mode {
            EndpointMode::Voter => Some(var("TKVOTE_SESSION").ok_or(ConfigLoadError::MissingToken)?),
            EndpointMode::Spectator => None,
        };
        let session_cookie = var("TKVOTE_COOKIE").or_else(|| auth_token.clone());

        let backoff = BackoffConfig {
            base: Duration::from_millis(parse_number(&var, "TKVOTE_BACKOFF_BASE_MS", 1000)?),
            max: Duration::from_millis(parse_number(&var, "TKVOTE_BACKOFF_MAX_MS", 60_000)?),
            max_attempts: match var("TKVOTE_MAX_RECONNECTS") {
                Some(raw) => Some(
                    raw.trim()
                        .parse()
                        .map_err(|_| ConfigLoadError::InvalidNumber("TKVOTE_MAX_RECONNECTS"))?,
                ),
                None => None,
            },
        };

        Ok(Self {
            connection: ConnectionConfig {
                mode,
                endpoint,
                auth_token,
                session_cookie,
                origin: var("TKVOTE_ORIGIN").unwrap_or_else(|| DEFAULT_ORIGIN.to_string()),
                user_agent: var("TKVOTE_USER_AGENT")
                    .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            },
            backoff,
            suggestions_path: var("TKVOTE_SUGGESTIONS")
                .unwrap_or_else(|| "suggestions.txt".to_string())
                .into(),
            records_dir: var("TKVOTE_RECORDS_DIR")
                .unwrap_or_else(|| "polls".to_string())
                .into(),
            log_file: var("TKVOTE_LOG_FILE").map(PathBuf::from),
            log_level: var("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn parse_number<F>(var: &F, key: &'static str, default: u64) -> Result<u64, ConfigLoadError>
where
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigLoadError::InvalidNumber(key)),
        None => Ok(default),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("TKVOTE_SESSION is required in voter mode")]
    MissingToken,
    #[error("Invalid TKVOTE_MODE: {0}")]
    InvalidMode(String),
    #[error("Invalid number in {0}")]
    InvalidNumber(&'static str),
}
