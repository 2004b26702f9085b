//! Engine error types.

use thiserror::Error;

/// Errors internal to the engine.
///
/// These never cross the hook boundary: the analytics writer catches and
/// logs them, and every handler degrades to an unchanged outcome.
#[derive(Debug, Error)]
pub enum EngineError {
    /// I/O error writing the analytics file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
