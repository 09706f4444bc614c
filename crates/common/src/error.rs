//! Error types for the E2E suite

use thiserror::Error;

/// Result type alias using the suite Error
pub type Result<T> = std::result::Result<T, Error>;

/// Suite error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Browser session failed to start: {0}")]
    SessionStartup(String),

    #[error("WebDriver error [{code}]: {message}")]
    WebDriver {
        /// Error code from the driver payload, e.g. "no such element"
        code: String,
        message: String,
    },

    #[error("Timed out after {ms}ms waiting for {what}")]
    Timeout { what: String, ms: u64 },

    #[error("Assertion failed: {0}")]
    AssertionFailed(String),

    #[error("Test skipped: {0}")]
    Skipped(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Test not found: {0}")]
    TestNotFound(String),
}

impl Error {
    /// Timeout helper with a readable description of what was awaited.
    pub fn timeout(what: impl Into<String>, ms: u64) -> Self {
        Error::Timeout { what: what.into(), ms }
    }
}
