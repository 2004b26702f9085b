//! Per-session state.
//!
//! One [`SessionStore`] owns every piece of per-session mutable state: the
//! loaded-skill set, the pending injection queue, the tool-call path map,
//! and the injected flag. It is constructed once per engine instance and
//! passed by reference into every handler — no module-level globals.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use primer_core::constants::TOOL_PATH_CAPACITY;
use primer_skills::Skill;

/// Skills and token total a new session is seeded with.
#[derive(Debug, Clone, Default)]
pub struct SeededState {
    /// Always-load plus satisfied conditional skills.
    pub skills: Vec<Arc<Skill>>,
    /// Sum of their token counts.
    pub tokens: u64,
}

#[derive(Debug)]
struct SessionState {
    /// Loaded skill names in insertion order. Grows monotonically within
    /// a session.
    loaded: Vec<String>,
    /// Names the session was seeded with, for first-injection rendering.
    seed_names: Vec<String>,
    /// Total estimated tokens of loaded skills. Monotonic.
    tokens_used: u64,
    /// Whether the initial block has been injected since the last
    /// compaction.
    initial_injected: bool,
}

/// Store of all per-session state, keyed by opaque session id.
#[derive(Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<String, SessionState>>,
    pending: Mutex<HashMap<String, Vec<Arc<Skill>>>>,
    tool_paths: Mutex<HashMap<String, VecDeque<(String, String)>>>,
}

impl SessionStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether state exists for a session.
    pub fn exists(&self, session_id: &str) -> bool {
        self.sessions.lock().contains_key(session_id)
    }

    /// Ensure state exists for a session, seeding it on first reference.
    ///
    /// Returns `true` if the state was created by this call.
    pub fn ensure(&self, session_id: &str, seed: impl FnOnce() -> SeededState) -> bool {
        let mut sessions = self.sessions.lock();
        if sessions.contains_key(session_id) {
            return false;
        }
        let seeded = seed();
        let names: Vec<String> = seeded.skills.iter().map(|s| s.name.clone()).collect();
        debug!(session_id = %session_id, seeds = names.len(), tokens = seeded.tokens, "session state created");
        let _ = sessions.insert(
            session_id.to_string(),
            SessionState {
                loaded: names.clone(),
                seed_names: names,
                tokens_used: seeded.tokens,
                initial_injected: false,
            },
        );
        true
    }

    /// Loaded skill names for a session, in insertion order.
    pub fn loaded_names(&self, session_id: &str) -> Vec<String> {
        self.sessions
            .lock()
            .get(session_id)
            .map(|s| s.loaded.clone())
            .unwrap_or_default()
    }

    /// Seed skill names recorded at session creation.
    pub fn seed_names(&self, session_id: &str) -> Vec<String> {
        self.sessions
            .lock()
            .get(session_id)
            .map(|s| s.seed_names.clone())
            .unwrap_or_default()
    }

    /// Total estimated tokens of the session's loaded skills.
    pub fn tokens_used(&self, session_id: &str) -> u64 {
        self.sessions
            .lock()
            .get(session_id)
            .map_or(0, |s| s.tokens_used)
    }

    /// Whether the initial block has been injected for a session.
    pub fn is_initial_injected(&self, session_id: &str) -> bool {
        self.sessions
            .lock()
            .get(session_id)
            .is_some_and(|s| s.initial_injected)
    }

    /// Mark the initial block as injected.
    pub fn mark_initial_injected(&self, session_id: &str) {
        if let Some(state) = self.sessions.lock().get_mut(session_id) {
            state.initial_injected = true;
        }
    }

    /// Reset the injected flag (after compaction, so skills are freshly
    /// re-rendered). The loaded set is retained.
    pub fn reset_initial_injected(&self, session_id: &str) {
        if let Some(state) = self.sessions.lock().get_mut(session_id) {
            state.initial_injected = false;
        }
    }

    /// Queue skills for a session.
    ///
    /// Names already in the loaded set are filtered out; the remainder are
    /// added to the loaded set, counted against the token total, and
    /// appended to the pending queue. No-op if nothing is new. Returns the
    /// skills that were actually queued.
    pub fn queue_skills(&self, session_id: &str, skills: Vec<Arc<Skill>>) -> Vec<Arc<Skill>> {
        let mut sessions = self.sessions.lock();
        let Some(state) = sessions.get_mut(session_id) else {
            return Vec::new();
        };

        let mut fresh = Vec::new();
        for skill in skills {
            if state.loaded.iter().any(|name| *name == skill.name) {
                continue;
            }
            state.loaded.push(skill.name.clone());
            state.tokens_used += skill.tokens;
            fresh.push(skill);
        }
        drop(sessions);

        if fresh.is_empty() {
            return fresh;
        }

        debug!(session_id = %session_id, queued = fresh.len(), "skills queued");
        self.pending
            .lock()
            .entry(session_id.to_string())
            .or_default()
            .extend(fresh.iter().map(Arc::clone));
        fresh
    }

    /// Skills awaiting the next render opportunity. Does not clear the
    /// queue — callers inspect, render, then call
    /// [`clear_pending`](Self::clear_pending).
    pub fn pending_skills(&self, session_id: &str) -> Vec<Arc<Skill>> {
        self.pending
            .lock()
            .get(session_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Clear the pending queue after its contents were rendered.
    pub fn clear_pending(&self, session_id: &str) {
        let _ = self.pending.lock().remove(session_id);
    }

    /// Remember the file path a tool call is touching.
    ///
    /// The per-session map is bounded: once at capacity, the oldest entry
    /// is evicted, so calls whose "after" event never arrives cannot grow
    /// the map without bound.
    pub fn remember_tool_path(&self, session_id: &str, tool_call_id: &str, path: String) {
        let mut tool_paths = self.tool_paths.lock();
        let entries = tool_paths.entry(session_id.to_string()).or_default();
        if entries.len() >= TOOL_PATH_CAPACITY {
            let _ = entries.pop_front();
        }
        entries.push_back((tool_call_id.to_string(), path));
    }

    /// Take (and forget) the remembered path for a tool call.
    pub fn take_tool_path(&self, session_id: &str, tool_call_id: &str) -> Option<String> {
        let mut tool_paths = self.tool_paths.lock();
        let entries = tool_paths.get_mut(session_id)?;
        let idx = entries.iter().position(|(id, _)| id == tool_call_id)?;
        entries.remove(idx).map(|(_, path)| path)
    }

    /// Remove all state for a session.
    pub fn cleanup(&self, session_id: &str) {
        let _ = self.sessions.lock().remove(session_id);
        let _ = self.pending.lock().remove(session_id);
        let _ = self.tool_paths.lock().remove(session_id);
        debug!(session_id = %session_id, "session state removed");
    }

    /// Number of sessions with live state.
    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    /// Whether no session has live state.
    pub fn is_empty(&self) -> bool {
        self.sessions.lock().is_empty()
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("sessions", &self.len())
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
