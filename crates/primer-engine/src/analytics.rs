//! Per-session skill usage analytics.
//!
//! Records which skills were loaded, how often, and what first triggered
//! them. The backing JSON file is rewritten in full on every flush; a
//! failed write is logged and never propagated.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use chrono::Utc;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use primer_core::TriggerType;

use crate::errors::EngineError;

/// Usage record for one skill within a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillUsage {
    /// Skill name (repeated for self-describing JSON).
    pub skill_name: String,
    /// Number of times a trigger loaded this skill.
    pub load_count: u64,
    /// Trigger type of the first load.
    pub trigger_type: TriggerType,
    /// RFC 3339 timestamp of the first load.
    pub first_loaded: String,
    /// RFC 3339 timestamp of the most recent load.
    pub last_loaded: String,
}

/// All skill usage for one session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionAnalytics {
    /// Session this record belongs to.
    pub session_id: String,
    /// Usage keyed by skill name.
    pub skill_usage: BTreeMap<String, SkillUsage>,
}

/// In-memory analytics with JSON-file persistence.
pub struct AnalyticsStore {
    path: PathBuf,
    enabled: bool,
    records: Mutex<HashMap<String, SessionAnalytics>>,
}

impl AnalyticsStore {
    /// Create a store writing to the given path. A disabled store records
    /// and writes nothing.
    pub fn new(path: PathBuf, enabled: bool) -> Self {
        Self {
            path,
            enabled,
            records: Mutex::new(HashMap::new()),
        }
    }

    /// Whether analytics collection is enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Record one skill load for a session.
    pub fn record(&self, session_id: &str, skill_name: &str, trigger: TriggerType) {
        if !self.enabled {
            return;
        }
        let now = Utc::now().to_rfc3339();
        let mut records = self.records.lock();
        let session = records
            .entry(session_id.to_string())
            .or_insert_with(|| SessionAnalytics {
                session_id: session_id.to_string(),
                skill_usage: BTreeMap::new(),
            });
        match session.skill_usage.get_mut(skill_name) {
            Some(usage) => {
                usage.load_count += 1;
                usage.last_loaded = now;
            }
            None => {
                let _ = session.skill_usage.insert(
                    skill_name.to_string(),
                    SkillUsage {
                        skill_name: skill_name.to_string(),
                        load_count: 1,
                        trigger_type: trigger,
                        first_loaded: now.clone(),
                        last_loaded: now,
                    },
                );
            }
        }
    }

    /// Snapshot of one session's record, if any.
    pub fn session(&self, session_id: &str) -> Option<SessionAnalytics> {
        self.records.lock().get(session_id).cloned()
    }

    /// Drop a session's record from memory. Returns whether one existed.
    pub fn remove_session(&self, session_id: &str) -> bool {
        self.records.lock().remove(session_id).is_some()
    }

    /// Rewrite the analytics file in full.
    ///
    /// Write failures are logged, not surfaced.
    pub async fn flush(&self) {
        if !self.enabled {
            return;
        }
        if let Err(e) = self.write_file().await {
            warn!(path = %self.path.display(), error = %e, "analytics write failed");
        }
    }

    async fn write_file(&self) -> Result<(), EngineError> {
        // Serialize under the lock, write after releasing it.
        let payload = {
            let records = self.records.lock();
            let by_session: BTreeMap<&String, &SessionAnalytics> = records.iter().collect();
            serde_json::to_vec_pretty(&by_session)?
        };
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, payload).await?;
        debug!(path = %self.path.display(), "analytics flushed");
        Ok(())
    }
}

impl std::fmt::Debug for AnalyticsStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalyticsStore")
            .field("path", &self.path)
            .field("enabled", &self.enabled)
            .field("sessions", &self.records.lock().len())
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
