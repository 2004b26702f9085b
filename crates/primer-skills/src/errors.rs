//! Error types for skill loading.

use thiserror::Error;

/// Errors that can occur while reading a skill file.
///
/// These never escape the store — a skill that fails to read is reported as
/// absent — but the read path distinguishes the causes for logging.
#[derive(Debug, Error)]
pub enum SkillError {
    /// I/O error during filesystem operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Skill file exceeds the maximum size.
    #[error("skill file too large: {path} ({size} bytes > {max} bytes)")]
    FileTooLarge {
        /// Path to the oversized file.
        path: String,
        /// Actual file size.
        size: u64,
        /// Maximum allowed size.
        max: u64,
    },
}
