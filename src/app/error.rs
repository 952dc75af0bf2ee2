use thiserror::Error;

use crate::config::ConfigError;

#[derive(Error, Debug)]
pub enum PlatescoutError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A single browser operation failed; the session itself is still usable.
    #[error("Browser error: {0}")]
    Browser(String),

    /// The browsing session is unusable. Aborts the remaining batch.
    #[error("Browser session lost: {0}")]
    Session(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Restaurant not found: {0}")]
    RestaurantNotFound(String),

    #[error("{0}")]
    Other(String),
}

impl PlatescoutError {
    /// Whether this error means the browsing session can no longer be used.
    pub fn is_session_fatal(&self) -> bool {
        matches!(self, PlatescoutError::Session(_))
    }
}

impl From<ConfigError> for PlatescoutError {
    fn from(e: ConfigError) -> Self {
        PlatescoutError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PlatescoutError>;
