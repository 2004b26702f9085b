//! Trigger taxonomy.
//!
//! Every skill load is attributed to the trigger that caused it. The
//! variant is recorded in analytics on first load and serialized in
//! `camelCase` for the analytics file.

use serde::{Deserialize, Serialize};

/// The kind of trigger that caused a skill to be loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TriggerType {
    /// Listed in the config's always-load set.
    AlwaysLoad,
    /// Conditional skill whose condition held at session creation.
    Conditional,
    /// Matched the active agent name.
    Agent,
    /// Matched a message keyword.
    Keyword,
    /// Matched the extension of a touched file.
    Extension,
    /// Matched a path glob pattern.
    PathPattern,
}

impl std::fmt::Display for TriggerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlwaysLoad => write!(f, "alwaysLoad"),
            Self::Conditional => write!(f, "conditional"),
            Self::Agent => write!(f, "agent"),
            Self::Keyword => write!(f, "keyword"),
            Self::Extension => write!(f, "extension"),
            Self::PathPattern => write!(f, "pathPattern"),
        }
    }
}
