//! Conditional-skill evaluation.
//!
//! A condition may carry any subset of {file-exists, package-dependency,
//! env-var} checks. All present checks must pass; an empty condition holds.
//! The dependency check fails closed: a missing or unparsable manifest
//! evaluates to false.

use std::path::Path;

use serde_json::Value;
use tracing::debug;

use primer_core::constants::PACKAGE_MANIFEST;
use primer_settings::ConditionSpec;

const DEPENDENCY_KEYS: &[&str] = &["dependencies", "devDependencies", "peerDependencies"];

/// Evaluate a condition against a project root.
pub fn evaluate_condition(condition: &ConditionSpec, project_dir: &Path) -> bool {
    if let Some(file) = &condition.file_exists {
        if !project_dir.join(file).exists() {
            return false;
        }
    }

    if let Some(dependency) = &condition.dependency {
        if !has_dependency(project_dir, dependency) {
            return false;
        }
    }

    if let Some(var) = &condition.env {
        // Presence, not truthiness: an empty value still counts.
        if std::env::var_os(var).is_none() {
            return false;
        }
    }

    true
}

/// Whether the project manifest lists a package in any dependency map.
fn has_dependency(project_dir: &Path, name: &str) -> bool {
    let manifest_path = project_dir.join(PACKAGE_MANIFEST);
    let content = match std::fs::read_to_string(&manifest_path) {
        Ok(content) => content,
        Err(e) => {
            debug!(path = %manifest_path.display(), error = %e, "manifest unreadable, condition fails closed");
            return false;
        }
    };
    let manifest: Value = match serde_json::from_str(&content) {
        Ok(manifest) => manifest,
        Err(e) => {
            debug!(path = %manifest_path.display(), error = %e, "manifest unparsable, condition fails closed");
            return false;
        }
    };

    DEPENDENCY_KEYS.iter().any(|key| {
        manifest
            .get(key)
            .and_then(Value::as_object)
            .is_some_and(|deps| deps.contains_key(name))
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn cond() -> ConditionSpec {
        ConditionSpec::default()
    }

    #[test]
    fn test_empty_condition_holds() {
        let tmp = TempDir::new().unwrap();
        assert!(evaluate_condition(&cond(), tmp.path()));
    }

    #[test]
    fn test_file_exists_present() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("Dockerfile"), "FROM scratch").unwrap();
        let condition = ConditionSpec {
            file_exists: Some("Dockerfile".to_string()),
            ..cond()
        };
        assert!(evaluate_condition(&condition, tmp.path()));
    }

    #[test]
    fn test_file_exists_absent() {
        let tmp = TempDir::new().unwrap();
        let condition = ConditionSpec {
            file_exists: Some("Dockerfile".to_string()),
            ..cond()
        };
        assert!(!evaluate_condition(&condition, tmp.path()));
    }

    #[test]
    fn test_file_exists_nested_path() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join(".github/workflows")).unwrap();
        fs::write(tmp.path().join(".github/workflows/ci.yml"), "on: push").unwrap();
        let condition = ConditionSpec {
            file_exists: Some(".github/workflows/ci.yml".to_string()),
            ..cond()
        };
        assert!(evaluate_condition(&condition, tmp.path()));
    }

    #[test]
    fn test_dependency_direct() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("package.json"),
            r#"{"dependencies": {"react": "^18.0.0"}}"#,
        )
        .unwrap();
        let condition = ConditionSpec {
            dependency: Some("react".to_string()),
            ..cond()
        };
        assert!(evaluate_condition(&condition, tmp.path()));
    }

    #[test]
    fn test_dependency_dev_and_peer() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("package.json"),
            r#"{"devDependencies": {"vitest": "^1"}, "peerDependencies": {"react": "*"}}"#,
        )
        .unwrap();
        for dep in ["vitest", "react"] {
            let condition = ConditionSpec {
                dependency: Some(dep.to_string()),
                ..cond()
            };
            assert!(evaluate_condition(&condition, tmp.path()), "failed for {dep}");
        }
    }

    #[test]
    fn test_dependency_absent() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("package.json"), r#"{"dependencies": {}}"#).unwrap();
        let condition = ConditionSpec {
            dependency: Some("react".to_string()),
            ..cond()
        };
        assert!(!evaluate_condition(&condition, tmp.path()));
    }

    #[test]
    fn test_dependency_missing_manifest_fails_closed() {
        let tmp = TempDir::new().unwrap();
        let condition = ConditionSpec {
            dependency: Some("react".to_string()),
            ..cond()
        };
        assert!(!evaluate_condition(&condition, tmp.path()));
    }

    #[test]
    fn test_dependency_malformed_manifest_fails_closed() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("package.json"), "not json at all").unwrap();
        let condition = ConditionSpec {
            dependency: Some("react".to_string()),
            ..cond()
        };
        assert!(!evaluate_condition(&condition, tmp.path()));
    }

    #[test]
    fn test_env_present() {
        let tmp = TempDir::new().unwrap();
        // PATH is set in any sane test environment.
        let condition = ConditionSpec {
            env: Some("PATH".to_string()),
            ..cond()
        };
        assert!(evaluate_condition(&condition, tmp.path()));
    }

    #[test]
    fn test_env_absent() {
        let tmp = TempDir::new().unwrap();
        let condition = ConditionSpec {
            env: Some("PRIMER_SURELY_UNSET_TEST_VAR".to_string()),
            ..cond()
        };
        assert!(!evaluate_condition(&condition, tmp.path()));
    }

    #[test]
    fn test_all_checks_must_pass() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("Dockerfile"), "FROM scratch").unwrap();
        let condition = ConditionSpec {
            file_exists: Some("Dockerfile".to_string()),
            env: Some("PRIMER_SURELY_UNSET_TEST_VAR".to_string()),
            ..cond()
        };
        assert!(!evaluate_condition(&condition, tmp.path()));
    }
}
