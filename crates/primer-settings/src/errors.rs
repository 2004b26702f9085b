//! Settings error types.

use thiserror::Error;

/// Errors that can occur while reading a config file.
///
/// These never escape [`load_config`](crate::loader::load_config) — loading
/// fails open — but internal read/parse steps report through this type.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// I/O error reading the config file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parse or deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience result alias for settings operations.
pub type Result<T> = std::result::Result<T, SettingsError>;
