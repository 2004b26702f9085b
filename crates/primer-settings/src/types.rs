//! Config types.
//!
//! All structs use `camelCase` serde renaming to match the JSON config file
//! on disk. Trigger maps use `BTreeMap` so iteration order is deterministic.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Where rendered skill text is injected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum InjectionMethod {
    /// Append to the model's instruction channel (system prompt).
    #[default]
    SystemPrompt,
    /// Prepend to the user's chat message.
    ChatMessage,
}

impl InjectionMethod {
    /// Parse a config value. Returns `None` for unrecognized input.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "systemPrompt" => Some(Self::SystemPrompt),
            "chatMessage" => Some(Self::ChatMessage),
            _ => None,
        }
    }
}

impl std::fmt::Display for InjectionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SystemPrompt => write!(f, "systemPrompt"),
            Self::ChatMessage => write!(f, "chatMessage"),
        }
    }
}

// Unrecognized values fall back to the default rather than failing the
// whole config (fail open).
impl<'de> Deserialize<'de> for InjectionMethod {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(Self::parse(&value).unwrap_or_else(|| {
            warn!(value = %value, "unrecognized injection method, using default");
            Self::default()
        }))
    }
}

/// A condition gating a conditional skill.
///
/// Any subset of the checks may be present; all present checks must pass.
/// An empty condition holds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConditionSpec {
    /// Path that must exist, relative to the project root.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_exists: Option<String>,
    /// Package that must appear in the project manifest's dependency maps.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dependency: Option<String>,
    /// Environment variable that must be present (any value).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env: Option<String>,
}

impl ConditionSpec {
    /// Whether the condition carries no checks at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.file_exists.is_none() && self.dependency.is_none() && self.env.is_none()
    }
}

/// A skill loaded only when its condition holds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConditionalSkill {
    /// Skill name to load.
    pub skill: String,
    /// Condition that must hold at session creation.
    pub condition: ConditionSpec,
}

/// Per-skill rendering overrides.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SkillOverride {
    /// Render the summary instead of the full content. Falls back to the
    /// global `useSummaries` flag when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_summary: Option<bool>,
}

/// Global engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineSettings {
    /// Where rendered skill text goes.
    pub injection_method: InjectionMethod,
    /// Per-session cap on estimated injected tokens. `None` disables
    /// budget enforcement.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_budget: Option<u64>,
    /// Render summaries instead of full content by default.
    pub use_summaries: bool,
    /// Apply the whitespace/comment minification transform when rendering.
    pub minify: bool,
    /// Record and persist per-session skill usage analytics.
    pub analytics: bool,
    /// Re-assert loaded skills into the summarization context on compaction.
    pub persist_after_compaction: bool,
    /// Expose the session inspection tool.
    pub debug: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            injection_method: InjectionMethod::default(),
            token_budget: None,
            use_summaries: false,
            minify: false,
            analytics: true,
            persist_after_compaction: true,
            debug: false,
        }
    }
}

/// The full config document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SkillsConfig {
    /// Skill names loaded for every session.
    pub skills: Vec<String>,
    /// Extension → skill names. Keys may be comma-separated lists.
    pub extensions: BTreeMap<String, Vec<String>>,
    /// Agent name → skill names.
    pub agents: BTreeMap<String, Vec<String>>,
    /// Glob pattern → skill names.
    pub paths: BTreeMap<String, Vec<String>>,
    /// Message keyword → skill names.
    pub keywords: BTreeMap<String, Vec<String>>,
    /// Group name → member skill names, referenced as `@name`.
    pub groups: BTreeMap<String, Vec<String>>,
    /// Skills loaded only when their condition holds.
    pub conditional: Vec<ConditionalSkill>,
    /// Per-skill rendering overrides.
    pub overrides: BTreeMap<String, SkillOverride>,
    /// Global engine settings.
    pub settings: EngineSettings,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_defaults() {
        let s = EngineSettings::default();
        assert_eq!(s.injection_method, InjectionMethod::SystemPrompt);
        assert!(s.token_budget.is_none());
        assert!(!s.use_summaries);
        assert!(!s.minify);
        assert!(s.analytics);
        assert!(s.persist_after_compaction);
        assert!(!s.debug);
    }

    #[test]
    fn settings_serde_camel_case() {
        let json = serde_json::to_value(EngineSettings::default()).unwrap();
        assert!(json.get("injectionMethod").is_some());
        assert!(json.get("useSummaries").is_some());
        assert!(json.get("persistAfterCompaction").is_some());
        // token_budget is None and omitted
        assert!(json.get("tokenBudget").is_none());
    }

    #[test]
    fn injection_method_parse() {
        assert_eq!(
            InjectionMethod::parse("systemPrompt"),
            Some(InjectionMethod::SystemPrompt)
        );
        assert_eq!(
            InjectionMethod::parse("chatMessage"),
            Some(InjectionMethod::ChatMessage)
        );
        assert_eq!(InjectionMethod::parse("carrierPigeon"), None);
    }

    #[test]
    fn injection_method_unrecognized_falls_back() {
        let settings: EngineSettings =
            serde_json::from_value(serde_json::json!({"injectionMethod": "smokeSignal"})).unwrap();
        assert_eq!(settings.injection_method, InjectionMethod::SystemPrompt);
    }

    #[test]
    fn injection_method_display_matches_wire() {
        assert_eq!(InjectionMethod::SystemPrompt.to_string(), "systemPrompt");
        assert_eq!(InjectionMethod::ChatMessage.to_string(), "chatMessage");
    }

    #[test]
    fn condition_spec_empty() {
        assert!(ConditionSpec::default().is_empty());
        let cond = ConditionSpec {
            env: Some("CI".to_string()),
            ..ConditionSpec::default()
        };
        assert!(!cond.is_empty());
    }

    #[test]
    fn config_from_partial_json() {
        let config: SkillsConfig = serde_json::from_value(serde_json::json!({
            "skills": ["base"],
            "extensions": {"ts,tsx": ["typescript"]},
            "settings": {"tokenBudget": 4000}
        }))
        .unwrap();
        assert_eq!(config.skills, vec!["base"]);
        assert_eq!(
            config.extensions.get("ts,tsx").unwrap(),
            &vec!["typescript".to_string()]
        );
        assert_eq!(config.settings.token_budget, Some(4000));
        // Untouched sections default
        assert!(config.groups.is_empty());
        assert!(config.settings.analytics);
    }

    #[test]
    fn config_conditional_shape() {
        let config: SkillsConfig = serde_json::from_value(serde_json::json!({
            "conditional": [
                {"skill": "docker", "condition": {"fileExists": "Dockerfile"}},
                {"skill": "react", "condition": {"dependency": "react", "env": "CI"}}
            ]
        }))
        .unwrap();
        assert_eq!(config.conditional.len(), 2);
        assert_eq!(
            config.conditional[0].condition.file_exists.as_deref(),
            Some("Dockerfile")
        );
        assert_eq!(
            config.conditional[1].condition.dependency.as_deref(),
            Some("react")
        );
    }

    #[test]
    fn config_overrides_shape() {
        let config: SkillsConfig = serde_json::from_value(serde_json::json!({
            "overrides": {"big-skill": {"useSummary": true}}
        }))
        .unwrap();
        assert_eq!(
            config.overrides.get("big-skill").unwrap().use_summary,
            Some(true)
        );
    }
}
