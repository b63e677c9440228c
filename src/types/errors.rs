use thiserror::Error;

use super::tab::TabId;

// === BrowserError ===

/// Failures talking to the browser through the extension shim.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BrowserError {
    /// Nobody is listening on the other end (no popup open, no content agent).
    #[error("No receiving end for message")]
    NoReceiver,
    /// The tab no longer exists.
    #[error("Tab not found: {0}")]
    TabNotFound(TabId),
    /// The bridge to the extension shim is gone.
    #[error("Browser bridge disconnected")]
    Disconnected,
    /// The shim did not answer in time.
    #[error("Browser call timed out after {0} ms")]
    Timeout(u64),
    /// The browser refused the call.
    #[error("Browser rejected call: {0}")]
    Rejected(String),
    /// The reply could not be interpreted.
    #[error("Malformed browser response: {0}")]
    Protocol(String),
}

impl BrowserError {
    /// Expected when no UI is open; never worth logging.
    pub fn is_no_receiver(&self) -> bool {
        matches!(self, BrowserError::NoReceiver)
    }
}

// === SettingsError ===

/// Errors related to settings management.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// An I/O error occurred while reading or writing settings.
    #[error("Settings I/O error: {0}")]
    IoError(String),
    /// Failed to serialize or deserialize settings.
    #[error("Settings serialization error: {0}")]
    SerializationError(String),
    /// The provided settings key is invalid.
    #[error("Invalid settings key: {0}")]
    InvalidKey(String),
    /// The provided settings value is invalid.
    #[error("Invalid settings value: {0}")]
    InvalidValue(String),
}

// === HandlerError ===

/// Errors surfaced to the caller of an inbound command.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("Missing parameter: {0}")]
    MissingParam(&'static str),
    #[error("Invalid parameter: {0}")]
    InvalidParam(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for HandlerError {
    fn from(err: serde_json::Error) -> Self {
        HandlerError::Internal(err.to_string())
    }
}
