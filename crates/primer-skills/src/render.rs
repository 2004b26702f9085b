//! Skill block rendering.
//!
//! Loaded skills are rendered into one tagged block: a per-skill envelope
//! inside an outer wrapper. Per-skill overrides choose summary vs. full
//! content, falling back to the global flag; an optional minification pass
//! strips comments and collapses whitespace.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::LazyLock;

use regex::Regex;

use primer_core::constants::{SKILL_TAG, WRAPPER_TAG};
use primer_settings::{SkillOverride, SkillsConfig};

use crate::types::Skill;

static HTML_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("valid literal regex"));
static TRAILING_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]+\n").expect("valid literal regex"));
static BLANK_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid literal regex"));

/// Rendering options derived from config.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Render summaries instead of full content by default.
    pub use_summaries: bool,
    /// Apply the minification transform.
    pub minify: bool,
    /// Per-skill overrides keyed by skill name.
    pub overrides: BTreeMap<String, SkillOverride>,
}

impl RenderOptions {
    /// Build options from a loaded config.
    pub fn from_config(config: &SkillsConfig) -> Self {
        Self {
            use_summaries: config.settings.use_summaries,
            minify: config.settings.minify,
            overrides: config.overrides.clone(),
        }
    }

    /// Whether a given skill should render its summary.
    fn use_summary_for(&self, name: &str) -> bool {
        self.overrides
            .get(name)
            .and_then(|o| o.use_summary)
            .unwrap_or(self.use_summaries)
    }
}

/// Render skills into one tagged injection block.
///
/// Returns the empty string for an empty input list.
pub fn render(skills: &[Arc<Skill>], options: &RenderOptions) -> String {
    if skills.is_empty() {
        return String::new();
    }

    let mut out = String::new();
    out.push_str(&format!("<{WRAPPER_TAG}>\n"));
    for skill in skills {
        let body = if options.use_summary_for(&skill.name) {
            skill.summary.as_deref().unwrap_or(&skill.content)
        } else {
            &skill.content
        };
        let body = if options.minify {
            minify(body)
        } else {
            body.to_string()
        };
        out.push_str(&format!(
            "<{SKILL_TAG} name=\"{}\">\n{}\n</{SKILL_TAG}>\n",
            skill.name,
            body.trim_end()
        ));
    }
    out.push_str(&format!("</{WRAPPER_TAG}>"));
    out
}

/// Strip HTML comments, trailing whitespace, and blank-line runs.
fn minify(text: &str) -> String {
    let stripped = HTML_COMMENT.replace_all(text, "");
    let trimmed = TRAILING_SPACE.replace_all(&stripped, "\n");
    BLANK_RUN.replace_all(&trimmed, "\n\n").into_owned()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
