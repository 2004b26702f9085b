//! Glob-pattern trigger matching.
//!
//! Patterns are translated to anchored regexes. Glob tokens, in priority
//! order: `**/` (any number of path segments, possibly zero), bare `**`
//! (anything including slashes), `*` (anything except slash), `?` (any
//! single non-slash character). Literal regex metacharacters are escaped
//! before the glob tokens are substituted back in. Matching is
//! case-sensitive and applies to the path as given.

use std::collections::{BTreeMap, HashSet};

use regex::Regex;
use tracing::warn;

// Placeholders survive `regex::escape` untouched, so glob tokens can be
// swapped out before escaping and substituted back after.
const GLOBSTAR_SLASH: char = '\u{1}';
const GLOBSTAR: char = '\u{2}';
const STAR: char = '\u{3}';
const QMARK: char = '\u{4}';

/// Translate a glob pattern into an anchored regex.
///
/// Returns `None` if the resulting expression fails to compile.
pub fn glob_to_regex(pattern: &str) -> Option<Regex> {
    let tokenized = pattern
        .replace("**/", &GLOBSTAR_SLASH.to_string())
        .replace("**", &GLOBSTAR.to_string())
        .replace('*', &STAR.to_string())
        .replace('?', &QMARK.to_string());

    let escaped = regex::escape(&tokenized)
        .replace(GLOBSTAR_SLASH, "(?:.*/)?")
        .replace(GLOBSTAR, ".*")
        .replace(STAR, "[^/]*")
        .replace(QMARK, "[^/]");

    match Regex::new(&format!("^{escaped}$")) {
        Ok(re) => Some(re),
        Err(e) => {
            warn!(pattern = %pattern, error = %e, "glob pattern failed to compile");
            None
        }
    }
}

/// Resolve a path against the config's pattern map.
///
/// Returns the deduplicated union of skill lists for every matching
/// pattern, preserving first-seen order.
pub fn match_path(path: &str, map: &BTreeMap<String, Vec<String>>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut matched = Vec::new();
    for (pattern, skills) in map {
        let Some(re) = glob_to_regex(pattern) else {
            continue;
        };
        if re.is_match(path) {
            for skill in skills {
                if seen.insert(skill.clone()) {
                    matched.push(skill.clone());
                }
            }
        }
    }
    matched
}
