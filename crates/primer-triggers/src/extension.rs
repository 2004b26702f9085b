//! Extension-based trigger matching.

use std::collections::{BTreeMap, HashSet};

/// Resolve an extension against the config's extension map.
///
/// Map keys may be comma-separated extension lists (`"ts,tsx"`). Matching is
/// case-insensitive and tolerates a leading dot on either side. Returns the
/// deduplicated union of matched skill lists, preserving first-seen order.
pub fn match_extension(ext: &str, map: &BTreeMap<String, Vec<String>>) -> Vec<String> {
    let needle = normalize(ext);
    if needle.is_empty() {
        return Vec::new();
    }

    let mut seen = HashSet::new();
    let mut matched = Vec::new();
    for (keys, skills) in map {
        if keys.split(',').any(|key| normalize(key) == needle) {
            for skill in skills {
                if seen.insert(skill.clone()) {
                    matched.push(skill.clone());
                }
            }
        }
    }
    matched
}

fn normalize(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: &[(&str, &[&str])]) -> BTreeMap<String, Vec<String>> {
        entries
            .iter()
            .map(|(k, v)| {
                (
                    (*k).to_string(),
                    v.iter().map(|s| (*s).to_string()).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn test_simple_match() {
        let map = map(&[("rs", &["rust"])]);
        assert_eq!(match_extension("rs", &map), vec!["rust"]);
    }

    #[test]
    fn test_comma_separated_keys() {
        let map = map(&[("ts,tsx", &["typescript"])]);
        assert_eq!(match_extension("tsx", &map), vec!["typescript"]);
        assert_eq!(match_extension("ts", &map), vec!["typescript"]);
        assert!(match_extension("t", &map).is_empty());
    }

    #[test]
    fn test_case_insensitive() {
        let map = map(&[("TS", &["typescript"])]);
        assert_eq!(match_extension("ts", &map), vec!["typescript"]);
        assert_eq!(match_extension("Ts", &map), vec!["typescript"]);
    }

    #[test]
    fn test_leading_dot_tolerated() {
        let map = map(&[(".py", &["python"])]);
        assert_eq!(match_extension("py", &map), vec!["python"]);
        assert_eq!(match_extension(".py", &map), vec!["python"]);
    }

    #[test]
    fn test_union_deduplicated_first_seen_order() {
        let map = map(&[("a,b", &["shared", "alpha"]), ("b,c", &["shared", "gamma"])]);
        assert_eq!(match_extension("b", &map), vec!["shared", "alpha", "gamma"]);
    }

    #[test]
    fn test_no_match() {
        let map = map(&[("rs", &["rust"])]);
        assert!(match_extension("go", &map).is_empty());
    }

    #[test]
    fn test_empty_extension() {
        let map = map(&[("rs", &["rust"])]);
        assert!(match_extension("", &map).is_empty());
    }
}
