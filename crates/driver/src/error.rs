//! Error types for the storefront driver

use thiserror::Error;
use vitrine_sync::SyncError;

pub type DriverResult<T> = std::result::Result<T, DriverError>;

#[derive(Error, Debug)]
pub enum DriverError {
    #[error("node not found. Install Node.js and run: npm i playwright && npx playwright install")]
    NodeNotFound,

    #[error("bridge startup failed: {0}")]
    BridgeStartup(String),

    #[error("bridge exited: {0}")]
    BridgeGone(String),

    #[error("browser command failed: {command}: {reason}")]
    CommandFailed { command: String, reason: String },

    #[error("timeout waiting for: {0}")]
    Timeout(String),

    #[error("auth API error: {0}")]
    Api(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl From<DriverError> for SyncError {
    fn from(err: DriverError) -> Self {
        SyncError::Session(err.to_string())
    }
}
