//! Skill file parser.
//!
//! Skill files carry an optional key-value header delimited by `---` lines
//! (a hand-written subset parser, no external YAML dependency) followed by
//! the markdown body. When the header has no `summary`, one is synthesized
//! from the body's first paragraph.

use primer_core::constants::{SUMMARY_ELLIPSIS, SUMMARY_MAX_CHARS};

/// Result of parsing a skill file's raw content.
#[derive(Debug, Clone, Default)]
pub struct ParsedSkill {
    /// `name` header value, if present.
    pub name: Option<String>,
    /// `description` header value, if present.
    pub description: Option<String>,
    /// `summary` header value, or one synthesized from the body.
    pub summary: Option<String>,
    /// Body content after the header.
    pub content: String,
}

/// Parse a skill file's raw content into header fields and body.
pub fn parse_skill(raw_content: &str) -> ParsedSkill {
    let (header, body) = extract_header(raw_content);

    let mut parsed = ParsedSkill {
        content: body,
        ..ParsedSkill::default()
    };

    if let Some(header) = header {
        for line in header.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            match key.trim() {
                "name" => parsed.name = Some(unquote(value)),
                "description" => parsed.description = Some(unquote(value)),
                "summary" => parsed.summary = Some(unquote(value)),
                _ => {}
            }
        }
    }

    if parsed.summary.as_ref().is_none_or(|s| s.is_empty()) {
        parsed.summary = synthesize_summary(&parsed.content);
    }

    parsed
}

/// Extract the `---`-delimited header block from content.
///
/// Returns `(header, body_after_header)`. A missing or unterminated header
/// yields the whole content as body.
fn extract_header(content: &str) -> (Option<String>, String) {
    let trimmed = content.trim_start();
    if !trimmed.starts_with("---") {
        return (None, content.to_string());
    }

    let after_first = &trimmed[3..];
    let after_first = after_first.strip_prefix('\n').unwrap_or(after_first);

    if let Some(end_idx) = after_first.find("\n---") {
        let header = after_first[..end_idx].to_string();
        let body_start = end_idx + 4; // "\n---".len()
        let body = if body_start < after_first.len() {
            let rest = &after_first[body_start..];
            rest.strip_prefix('\n').unwrap_or(rest).to_string()
        } else {
            String::new()
        };
        (Some(header), body)
    } else {
        (None, content.to_string())
    }
}

/// Remove surrounding quotes from a header value.
fn unquote(s: &str) -> String {
    let trimmed = s.trim();
    if (trimmed.starts_with('"') && trimmed.ends_with('"') && trimmed.len() >= 2)
        || (trimmed.starts_with('\'') && trimmed.ends_with('\'') && trimmed.len() >= 2)
    {
        trimmed[1..trimmed.len() - 1].to_string()
    } else {
        trimmed.to_string()
    }
}

/// Synthesize a summary from the body's first paragraph.
///
/// Skips headers, horizontal rules, and code blocks; joins the first run of
/// consecutive content lines; truncates to [`SUMMARY_MAX_CHARS`] characters
/// with an ellipsis marker, preferring to break on a whitespace boundary.
pub fn synthesize_summary(content: &str) -> Option<String> {
    let mut in_code_block = false;
    let mut paragraph: Vec<&str> = Vec::new();

    for line in content.lines() {
        let trimmed = line.trim();

        if trimmed.starts_with("```") {
            in_code_block = !in_code_block;
            continue;
        }
        if in_code_block {
            continue;
        }

        if trimmed.is_empty() {
            if paragraph.is_empty() {
                continue;
            }
            break;
        }
        if trimmed.starts_with('#') || is_horizontal_rule(trimmed) {
            if paragraph.is_empty() {
                continue;
            }
            break;
        }

        paragraph.push(trimmed);
    }

    if paragraph.is_empty() {
        return None;
    }

    Some(truncate_on_whitespace(&paragraph.join(" ")))
}

/// Truncate to [`SUMMARY_MAX_CHARS`] characters with an ellipsis marker,
/// breaking on the last whitespace inside the window when there is one.
fn truncate_on_whitespace(text: &str) -> String {
    if text.chars().count() <= SUMMARY_MAX_CHARS {
        return text.to_string();
    }

    let window: String = text.chars().take(SUMMARY_MAX_CHARS).collect();
    let cut = window
        .rfind(char::is_whitespace)
        .filter(|&idx| idx > 0)
        .unwrap_or(window.len());

    format!("{}{SUMMARY_ELLIPSIS}", window[..cut].trim_end())
}

/// Check if a line is a markdown horizontal rule.
fn is_horizontal_rule(line: &str) -> bool {
    if line.len() < 3 {
        return false;
    }
    let mut chars = line.chars();
    let first = chars.next().unwrap_or(' ');
    if first != '-' && first != '*' && first != '_' {
        return false;
    }
    line.chars().all(|c| c == first)
}
