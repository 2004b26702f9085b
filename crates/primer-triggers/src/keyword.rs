//! Keyword-based trigger matching.

use std::collections::{BTreeMap, HashSet};

/// Resolve a message text against the config's keyword map.
///
/// Each keyword is tested as a case-insensitive substring of the message.
/// Returns the deduplicated union of skill lists for every matching
/// keyword, preserving first-seen order.
pub fn match_keywords(text: &str, map: &BTreeMap<String, Vec<String>>) -> Vec<String> {
    let haystack = text.to_lowercase();
    let mut seen = HashSet::new();
    let mut matched = Vec::new();
    for (keyword, skills) in map {
        if keyword.is_empty() {
            continue;
        }
        if haystack.contains(&keyword.to_lowercase()) {
            for skill in skills {
                if seen.insert(skill.clone()) {
                    matched.push(skill.clone());
                }
            }
        }
    }
    matched
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
    fn test_substring_match() {
        let map = map(&[("deploy", &["deployment"])]);
        assert_eq!(
            match_keywords("please deploy to staging", &map),
            vec!["deployment"]
        );
    }

    #[test]
    fn test_case_insensitive_both_sides() {
        let map = map(&[("Docker", &["docker"])]);
        assert_eq!(match_keywords("run it in DOCKER", &map), vec!["docker"]);
    }

    #[test]
    fn test_no_match() {
        let map = map(&[("deploy", &["deployment"])]);
        assert!(match_keywords("write some tests", &map).is_empty());
    }

    #[test]
    fn test_union_dedup() {
        let map = map(&[("test", &["testing", "ci"]), ("ci", &["ci"])]);
        assert_eq!(
            match_keywords("test the ci pipeline", &map),
            vec!["ci", "testing"]
        );
    }

    #[test]
    fn test_empty_keyword_ignored() {
        let map = map(&[("", &["everything"])]);
        assert!(match_keywords("anything", &map).is_empty());
    }
}
