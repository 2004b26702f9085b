//! Token-budgeted skill loading.
//!
//! The allocator turns candidate skill names into loaded skills: groups are
//! expanded, the store is consulted, and — when a budget is configured —
//! the list is greedily truncated so the session's running token total
//! never exceeds the cap. Enforcement is prefix-greedy: the first skill
//! that would exceed the cap is dropped along with everything after it in
//! that call. No reordering, no partial inclusion, no backtracking.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use primer_core::TriggerType;
use primer_settings::SkillsConfig;
use primer_skills::{Skill, SkillStore};
use primer_triggers::expand_groups;

use crate::analytics::AnalyticsStore;

/// Result of a budgeted load.
#[derive(Debug, Clone, Default)]
pub struct BudgetOutcome {
    /// Skills kept within the budget, in listed order.
    pub skills: Vec<Arc<Skill>>,
    /// Sum of the kept skills' token counts.
    pub tokens: u64,
    /// Requested names with no skill on disk.
    pub missing: Vec<String>,
}

/// Loads skills against the configured token budget and records analytics.
pub struct BudgetAllocator {
    store: Arc<SkillStore>,
    analytics: Arc<AnalyticsStore>,
    groups: BTreeMap<String, Vec<String>>,
    budget: Option<u64>,
}

impl BudgetAllocator {
    /// Create an allocator for a config.
    pub fn new(
        store: Arc<SkillStore>,
        analytics: Arc<AnalyticsStore>,
        config: &SkillsConfig,
    ) -> Self {
        Self {
            store,
            analytics,
            groups: config.groups.clone(),
            budget: config.settings.token_budget,
        }
    }

    /// The configured token budget, if any.
    pub fn budget(&self) -> Option<u64> {
        self.budget
    }

    /// Expand groups, load skills, and truncate to the budget.
    ///
    /// Every skill actually kept is recorded in analytics under the
    /// supplied trigger type.
    pub fn load_with_budget(
        &self,
        session_id: &str,
        names: &[String],
        tokens_already_used: u64,
        trigger: TriggerType,
    ) -> BudgetOutcome {
        let expanded = expand_groups(names, &self.groups);
        let (loaded, missing) = self.store.load_many(&expanded);

        let mut kept = Vec::new();
        let mut tokens = 0u64;
        for skill in loaded {
            if let Some(cap) = self.budget {
                if tokens_already_used + tokens + skill.tokens > cap {
                    debug!(
                        session_id = %session_id,
                        skill = %skill.name,
                        cap,
                        used = tokens_already_used + tokens,
                        "budget exhausted, dropping remainder"
                    );
                    break;
                }
            }
            tokens += skill.tokens;
            kept.push(skill);
        }

        for skill in &kept {
            self.analytics.record(session_id, &skill.name, trigger);
        }

        BudgetOutcome {
            skills: kept,
            tokens,
            missing,
        }
    }
}

impl std::fmt::Debug for BudgetAllocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BudgetAllocator")
            .field("budget", &self.budget)
            .field("groups", &self.groups.len())
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    /// Write a skill whose body costs exactly `tokens` tokens.
    fn write_skill(dir: &Path, name: &str, tokens: u64) {
        std::fs::create_dir_all(dir).unwrap();
        let body = "x".repeat(usize::try_from(tokens * 4).unwrap());
        std::fs::write(dir.join(format!("{name}.md")), body).unwrap();
    }

    fn allocator(
        dir: &Path,
        budget: Option<u64>,
        groups: &[(&str, &[&str])],
    ) -> (BudgetAllocator, Arc<AnalyticsStore>) {
        let store = Arc::new(SkillStore::with_dirs(vec![dir.to_path_buf()]));
        let analytics = Arc::new(AnalyticsStore::new(dir.join("analytics.json"), true));
        let mut config = SkillsConfig::default();
        config.settings.token_budget = budget;
        for (name, members) in groups {
            let _ = config.groups.insert(
                (*name).to_string(),
                members.iter().map(|m| (*m).to_string()).collect(),
            );
        }
        (
            BudgetAllocator::new(store, Arc::clone(&analytics), &config),
            analytics,
        )
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_no_budget_keeps_everything() {
        let tmp = tempfile::tempdir().unwrap();
        write_skill(tmp.path(), "a", 100);
        write_skill(tmp.path(), "b", 200);
        let (alloc, _) = allocator(tmp.path(), None, &[]);

        let outcome = alloc.load_with_budget("s1", &names(&["a", "b"]), 0, TriggerType::Keyword);
        assert_eq!(outcome.skills.len(), 2);
        assert_eq!(outcome.tokens, 300);
        assert!(outcome.missing.is_empty());
    }

    #[test]
    fn test_greedy_prefix_law() {
        let tmp = tempfile::tempdir().unwrap();
        write_skill(tmp.path(), "big", 80);
        write_skill(tmp.path(), "huge", 50);
        write_skill(tmp.path(), "tiny", 5);
        let (alloc, _) = allocator(tmp.path(), Some(100), &[]);

        // "huge" exceeds the remaining budget; "tiny" would fit but is
        // dropped too — no backtracking past the first overflow.
        let outcome = alloc.load_with_budget(
            "s1",
            &names(&["big", "huge", "tiny"]),
            0,
            TriggerType::Keyword,
        );
        let kept: Vec<&str> = outcome.skills.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(kept, vec!["big"]);
        assert_eq!(outcome.tokens, 80);
    }

    #[test]
    fn test_budget_accounts_for_tokens_already_used() {
        let tmp = tempfile::tempdir().unwrap();
        write_skill(tmp.path(), "a", 60);
        let (alloc, _) = allocator(tmp.path(), Some(100), &[]);

        let outcome = alloc.load_with_budget("s1", &names(&["a"]), 50, TriggerType::Keyword);
        assert!(outcome.skills.is_empty());
        assert_eq!(outcome.tokens, 0);
    }

    #[test]
    fn test_exact_fit_is_kept() {
        let tmp = tempfile::tempdir().unwrap();
        write_skill(tmp.path(), "a", 100);
        let (alloc, _) = allocator(tmp.path(), Some(100), &[]);

        let outcome = alloc.load_with_budget("s1", &names(&["a"]), 0, TriggerType::Keyword);
        assert_eq!(outcome.skills.len(), 1);
        assert_eq!(outcome.tokens, 100);
    }

    #[test]
    fn test_groups_expanded_before_loading() {
        let tmp = tempfile::tempdir().unwrap();
        write_skill(tmp.path(), "a", 10);
        write_skill(tmp.path(), "b", 10);
        let (alloc, _) = allocator(tmp.path(), None, &[("web", &["a", "b"])]);

        let outcome = alloc.load_with_budget("s1", &names(&["@web"]), 0, TriggerType::Agent);
        let kept: Vec<&str> = outcome.skills.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(kept, vec!["a", "b"]);
    }

    #[test]
    fn test_missing_names_reported() {
        let tmp = tempfile::tempdir().unwrap();
        write_skill(tmp.path(), "real", 10);
        let (alloc, _) = allocator(tmp.path(), None, &[]);

        let outcome =
            alloc.load_with_budget("s1", &names(&["real", "ghost"]), 0, TriggerType::Keyword);
        assert_eq!(outcome.skills.len(), 1);
        assert_eq!(outcome.missing, vec!["ghost"]);
    }

    #[test]
    fn test_kept_skills_recorded_in_analytics() {
        let tmp = tempfile::tempdir().unwrap();
        write_skill(tmp.path(), "kept", 10);
        write_skill(tmp.path(), "dropped", 1000);
        let (alloc, analytics) = allocator(tmp.path(), Some(50), &[]);

        let _ = alloc.load_with_budget(
            "s1",
            &names(&["kept", "dropped"]),
            0,
            TriggerType::Extension,
        );
        let session = analytics.session("s1").unwrap();
        assert!(session.skill_usage.contains_key("kept"));
        assert!(!session.skill_usage.contains_key("dropped"));
        assert_eq!(
            session.skill_usage.get("kept").unwrap().trigger_type,
            TriggerType::Extension
        );
    }

    #[test]
    fn test_empty_names() {
        let tmp = tempfile::tempdir().unwrap();
        let (alloc, _) = allocator(tmp.path(), Some(10), &[]);
        let outcome = alloc.load_with_budget("s1", &[], 0, TriggerType::Keyword);
        assert!(outcome.skills.is_empty());
        assert_eq!(outcome.tokens, 0);
        assert!(outcome.missing.is_empty());
    }
}
