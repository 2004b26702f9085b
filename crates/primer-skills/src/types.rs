//! Skill types.

use serde::Serialize;

/// A loaded skill document. Immutable once loaded; shared across sessions
/// as `Arc<Skill>` through the store's cache.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    /// Skill name (the name it was requested under).
    pub name: String,
    /// One-line description from the header, or empty.
    pub description: String,
    /// Summary from the header, or synthesized from the body's first
    /// paragraph. `None` only when the body has no prose to summarize.
    pub summary: Option<String>,
    /// Body content after the header.
    #[serde(skip)]
    pub content: String,
    /// Estimated token count of the body content.
    pub tokens: u64,
    /// Path of the file the skill was loaded from.
    pub path: String,
}
