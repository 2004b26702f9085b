//! The fixed hook union exposed to the host.
//!
//! One [`HookEvent`] variant per lifecycle event, one [`HookOutcome`]
//! describing what (if anything) the engine changed. All types use
//! `camelCase` serde renaming for wire compatibility with the host. The
//! handler set is fixed per engine instance — there is no string-keyed
//! dynamic dispatch.

use serde::{Deserialize, Serialize};

use primer_core::constants::FILE_PATH_ARG_KEYS;

/// The lifecycle hooks the engine can expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HookKind {
    /// A user message arrived.
    MessageReceived,
    /// A tool is about to execute.
    ToolExecuteBefore,
    /// A tool finished executing.
    ToolExecuteAfter,
    /// The host is about to compact the session context.
    ContextCompacting,
    /// A session lifecycle event (the engine reacts to deletion).
    SessionEvent,
    /// The outgoing instruction list is being rendered. Present only when
    /// the injection method targets the instruction channel.
    RenderInstructions,
}

impl std::fmt::Display for HookKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MessageReceived => write!(f, "messageReceived"),
            Self::ToolExecuteBefore => write!(f, "toolExecuteBefore"),
            Self::ToolExecuteAfter => write!(f, "toolExecuteAfter"),
            Self::ContextCompacting => write!(f, "contextCompacting"),
            Self::SessionEvent => write!(f, "sessionEvent"),
            Self::RenderInstructions => write!(f, "renderInstructions"),
        }
    }
}

/// A lifecycle event delivered by the host.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "hookType", rename_all = "camelCase")]
pub enum HookEvent {
    /// A user message arrived for a session.
    #[serde(rename_all = "camelCase")]
    MessageReceived {
        /// Session the message belongs to.
        session_id: String,
        /// The message text.
        text: String,
        /// Active agent name, if the host tracks one.
        #[serde(default)]
        agent: Option<String>,
    },
    /// A tool is about to execute.
    #[serde(rename_all = "camelCase")]
    ToolExecuteBefore {
        /// Session the tool call belongs to.
        session_id: String,
        /// Unique ID for this tool call.
        tool_call_id: String,
        /// Tool being invoked.
        tool_name: String,
        /// Arguments passed to the tool.
        arguments: serde_json::Value,
    },
    /// A tool finished executing.
    #[serde(rename_all = "camelCase")]
    ToolExecuteAfter {
        /// Session the tool call belongs to.
        session_id: String,
        /// Unique ID for this tool call.
        tool_call_id: String,
        /// Tool that was invoked.
        tool_name: String,
    },
    /// The host is about to compact the session context.
    #[serde(rename_all = "camelCase")]
    ContextCompacting {
        /// Session being compacted.
        session_id: String,
    },
    /// A session lifecycle event.
    #[serde(rename_all = "camelCase")]
    SessionEvent {
        /// Session the event concerns.
        session_id: String,
        /// Event kind; the engine acts on `"deleted"`.
        event_type: String,
    },
    /// The outgoing instruction list is being rendered.
    #[serde(rename_all = "camelCase")]
    RenderInstructions {
        /// Session the instructions belong to.
        session_id: String,
        /// The instruction list assembled so far.
        instructions: Vec<String>,
    },
}

impl HookEvent {
    /// The [`HookKind`] for this event.
    #[must_use]
    pub fn kind(&self) -> HookKind {
        match self {
            Self::MessageReceived { .. } => HookKind::MessageReceived,
            Self::ToolExecuteBefore { .. } => HookKind::ToolExecuteBefore,
            Self::ToolExecuteAfter { .. } => HookKind::ToolExecuteAfter,
            Self::ContextCompacting { .. } => HookKind::ContextCompacting,
            Self::SessionEvent { .. } => HookKind::SessionEvent,
            Self::RenderInstructions { .. } => HookKind::RenderInstructions,
        }
    }

    /// The session ID from any event variant.
    #[must_use]
    pub fn session_id(&self) -> &str {
        match self {
            Self::MessageReceived { session_id, .. }
            | Self::ToolExecuteBefore { session_id, .. }
            | Self::ToolExecuteAfter { session_id, .. }
            | Self::ContextCompacting { session_id, .. }
            | Self::SessionEvent { session_id, .. }
            | Self::RenderInstructions { session_id, .. } => session_id,
        }
    }
}

/// What the engine changed in response to an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum HookOutcome {
    /// Nothing to change; the host proceeds as-is.
    Unchanged,
    /// Replacement text for the incoming chat message.
    #[serde(rename_all = "camelCase")]
    Message {
        /// The rewritten message, skill blocks prepended.
        text: String,
    },
    /// Replacement instruction list with the skill block appended.
    #[serde(rename_all = "camelCase")]
    Instructions {
        /// The full instruction list to use.
        instructions: Vec<String>,
    },
    /// An entry to append to the compaction context.
    #[serde(rename_all = "camelCase")]
    ContextEntry {
        /// Rendered block of every loaded skill.
        entry: String,
    },
}

/// Tool arguments reduced to the fields the engine reads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedToolArgs {
    /// File path the tool is touching, if any.
    pub file_path: Option<String>,
}

/// Normalize a tool's argument object.
///
/// This is the single point where tool arguments are read. The path is
/// looked up under `file_path`, `path`, `notebook_path` in priority order,
/// at the top level first and then under an `input` wrapper (some hosts
/// nest the real arguments one level down).
pub fn normalize_tool_args(arguments: &serde_json::Value) -> NormalizedToolArgs {
    let candidates = [arguments, &arguments["input"]];
    for object in candidates {
        for key in FILE_PATH_ARG_KEYS {
            if let Some(path) = object.get(key).and_then(serde_json::Value::as_str) {
                if !path.is_empty() {
                    return NormalizedToolArgs {
                        file_path: Some(path.to_string()),
                    };
                }
            }
        }
    }
    NormalizedToolArgs::default()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_kind_and_session_id() {
        let event = HookEvent::MessageReceived {
            session_id: "s1".to_string(),
            text: "hello".to_string(),
            agent: None,
        };
        assert_eq!(event.kind(), HookKind::MessageReceived);
        assert_eq!(event.session_id(), "s1");
    }

    #[test]
    fn test_event_serde_tag() {
        let event = HookEvent::ContextCompacting {
            session_id: "s1".to_string(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"hookType\":\"contextCompacting\""));
        assert!(json.contains("\"sessionId\":\"s1\""));
    }

    #[test]
    fn test_event_serde_roundtrip() {
        let event = HookEvent::ToolExecuteBefore {
            session_id: "s1".to_string(),
            tool_call_id: "tc1".to_string(),
            tool_name: "Edit".to_string(),
            arguments: serde_json::json!({"file_path": "src/main.rs"}),
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: HookEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back.kind(), HookKind::ToolExecuteBefore);
        assert_eq!(back.session_id(), "s1");
    }

    #[test]
    fn test_outcome_serde_tag() {
        let outcome = HookOutcome::Message {
            text: "rewritten".to_string(),
        };
        let json = serde_json::to_string(&outcome).unwrap();
        assert!(json.contains("\"outcome\":\"message\""));
    }

    #[test]
    fn test_hook_kind_display() {
        assert_eq!(HookKind::MessageReceived.to_string(), "messageReceived");
        assert_eq!(
            HookKind::RenderInstructions.to_string(),
            "renderInstructions"
        );
    }

    // ── normalize_tool_args ─────────────────────────────────────────

    #[test]
    fn test_normalize_file_path_key() {
        let args = serde_json::json!({"file_path": "src/a.rs"});
        assert_eq!(
            normalize_tool_args(&args).file_path.as_deref(),
            Some("src/a.rs")
        );
    }

    #[test]
    fn test_normalize_key_priority() {
        let args = serde_json::json!({"path": "second", "file_path": "first"});
        assert_eq!(
            normalize_tool_args(&args).file_path.as_deref(),
            Some("first")
        );
    }

    #[test]
    fn test_normalize_notebook_path_fallback() {
        let args = serde_json::json!({"notebook_path": "nb.ipynb"});
        assert_eq!(
            normalize_tool_args(&args).file_path.as_deref(),
            Some("nb.ipynb")
        );
    }

    #[test]
    fn test_normalize_nested_input_wrapper() {
        let args = serde_json::json!({"input": {"path": "wrapped.ts"}});
        assert_eq!(
            normalize_tool_args(&args).file_path.as_deref(),
            Some("wrapped.ts")
        );
    }

    #[test]
    fn test_normalize_top_level_wins_over_wrapper() {
        let args = serde_json::json!({"path": "outer", "input": {"file_path": "inner"}});
        assert_eq!(
            normalize_tool_args(&args).file_path.as_deref(),
            Some("outer")
        );
    }

    #[test]
    fn test_normalize_absent_or_malformed() {
        assert!(normalize_tool_args(&serde_json::json!({})).file_path.is_none());
        assert!(
            normalize_tool_args(&serde_json::json!({"file_path": 42}))
                .file_path
                .is_none()
        );
        assert!(
            normalize_tool_args(&serde_json::json!({"file_path": ""}))
                .file_path
                .is_none()
        );
        assert!(normalize_tool_args(&serde_json::json!(null)).file_path.is_none());
    }
}
