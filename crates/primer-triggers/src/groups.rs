//! Skill-group expansion.

use std::collections::{BTreeMap, HashSet};

use primer_core::constants::GROUP_PREFIX;

/// Expand `@group` references in a skill-name list.
///
/// Expansion is one level deep: group members are taken literally, even if
/// they look like group references themselves. An unresolvable reference
/// passes through unchanged as a literal name, so it surfaces in the
/// missing-skill report instead of vanishing. The result is deduplicated,
/// preserving first-seen order.
pub fn expand_groups(
    names: &[String],
    groups: &BTreeMap<String, Vec<String>>,
) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut expanded = Vec::new();

    let mut push = |name: &str, out: &mut Vec<String>| {
        if seen.insert(name.to_string()) {
            out.push(name.to_string());
        }
    };

    for name in names {
        match name.strip_prefix(GROUP_PREFIX) {
            Some(group_name) => match groups.get(group_name) {
                Some(members) => {
                    for member in members {
                        push(member, &mut expanded);
                    }
                }
                None => push(name, &mut expanded),
            },
            None => push(name, &mut expanded),
        }
    }

    expanded
}
