//! Injection orchestration.
//!
//! [`InjectionEngine`] wires host lifecycle events to trigger resolution,
//! budgeted loading, session state, and rendering. One engine instance is
//! constructed per plugin instantiation; config is resolved once at
//! construction and read-only afterwards.
//!
//! Per-session lifecycle: uninitialized → (first access) active → (first
//! injection) initial-injected → (compaction) active again with the loaded
//! set retained → (deletion) terminal.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info, warn};

use primer_core::TriggerType;
use primer_core::constants::{ANALYTICS_FILE, FILE_TOOL_NAMES, MESSAGE_SEPARATOR};
use primer_settings::{InjectionMethod, SkillsConfig, load_config};
use primer_skills::{RenderOptions, Skill, SkillStore, render};
use primer_triggers::{
    evaluate_condition, expand_groups, match_extension, match_keywords, match_path,
};

use crate::analytics::AnalyticsStore;
use crate::budget::BudgetAllocator;
use crate::events::{HookEvent, HookKind, HookOutcome, normalize_tool_args};
use crate::session::{SeededState, SessionStore};

/// The session event kind that triggers teardown.
const SESSION_DELETED: &str = "deleted";

/// The hook surface the host drives.
///
/// The handler set is fixed per engine instance and never raises: every
/// fallible operation inside degrades to [`HookOutcome::Unchanged`].
#[async_trait]
pub trait HookSurface: Send + Sync {
    /// The hooks this instance exposes, computed once at construction.
    fn active_hooks(&self) -> &[HookKind];

    /// Handle one lifecycle event. The host awaits completion before
    /// proceeding; all engine I/O finishes before this returns.
    async fn handle(&self, event: HookEvent) -> HookOutcome;
}

/// Snapshot of a session for the inspection tool.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionReport {
    /// Session the report describes.
    pub session_id: String,
    /// Every skill currently in the loaded set.
    pub skills: Vec<Skill>,
    /// Total estimated tokens of loaded skills.
    pub tokens_used: u64,
    /// Whether the initial block has been injected since the last
    /// compaction.
    pub initial_injected: bool,
}

/// The injection engine: config, stores, and lifecycle handlers.
pub struct InjectionEngine {
    config: SkillsConfig,
    project_dir: PathBuf,
    store: Arc<SkillStore>,
    analytics: Arc<AnalyticsStore>,
    allocator: BudgetAllocator,
    sessions: SessionStore,
    render_options: RenderOptions,
    active_hooks: Vec<HookKind>,
    missing: Vec<String>,
}

impl InjectionEngine {
    /// Create an engine for a project, resolving config from disk.
    pub fn new(project_dir: &Path) -> Self {
        let config = load_config(project_dir);
        Self::with_config(config, project_dir)
    }

    /// Create an engine with an explicit config.
    pub fn with_config(config: SkillsConfig, project_dir: &Path) -> Self {
        let store = SkillStore::new(project_dir);
        Self::with_store(config, project_dir, store)
    }

    /// Create an engine with an explicit config and skill store (for
    /// embedding and tests).
    pub fn with_store(config: SkillsConfig, project_dir: &Path, store: SkillStore) -> Self {
        let store = Arc::new(store);
        let analytics = Arc::new(AnalyticsStore::new(
            project_dir.join(ANALYTICS_FILE),
            config.settings.analytics,
        ));
        let allocator = BudgetAllocator::new(Arc::clone(&store), Arc::clone(&analytics), &config);

        let mut active_hooks = vec![
            HookKind::MessageReceived,
            HookKind::ToolExecuteBefore,
            HookKind::ToolExecuteAfter,
            HookKind::ContextCompacting,
            HookKind::SessionEvent,
        ];
        if config.settings.injection_method == InjectionMethod::SystemPrompt {
            active_hooks.push(HookKind::RenderInstructions);
        }

        let missing = resolve_missing(&config, &store);
        if !missing.is_empty() {
            warn!(missing = ?missing, "configured skills not found on disk");
        }

        info!(
            method = %config.settings.injection_method,
            budget = ?config.settings.token_budget,
            hooks = active_hooks.len(),
            "injection engine initialized"
        );

        Self {
            render_options: RenderOptions::from_config(&config),
            config,
            project_dir: project_dir.to_path_buf(),
            store,
            analytics,
            allocator,
            sessions: SessionStore::new(),
            active_hooks,
            missing,
        }
    }

    /// The loaded config.
    pub fn config(&self) -> &SkillsConfig {
        &self.config
    }

    /// The session store.
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// The analytics store.
    pub fn analytics(&self) -> &AnalyticsStore {
        &self.analytics
    }

    /// The budget allocator.
    pub fn allocator(&self) -> &BudgetAllocator {
        &self.allocator
    }

    /// Configured skill names with no file on disk, sorted.
    pub fn missing_skills(&self) -> &[String] {
        &self.missing
    }

    /// Whether the inspection tool is exposed to the host.
    pub fn inspection_enabled(&self) -> bool {
        self.config.settings.debug
    }

    /// Inspection tool: loaded skills and token usage for a session.
    ///
    /// Returns `None` for a session with no state; inspection never
    /// materializes one.
    pub fn inspect(&self, session_id: &str) -> Option<SessionReport> {
        if !self.sessions.exists(session_id) {
            return None;
        }
        let (skills, _) = self.store.load_many(&self.sessions.loaded_names(session_id));
        Some(SessionReport {
            session_id: session_id.to_string(),
            skills: skills.iter().map(|s| (**s).clone()).collect(),
            tokens_used: self.sessions.tokens_used(session_id),
            initial_injected: self.sessions.is_initial_injected(session_id),
        })
    }

    /// Every skill currently in a session's loaded set, reconstructed
    /// through the shared cache.
    pub fn loaded_skills(&self, session_id: &str) -> Vec<Arc<Skill>> {
        self.store
            .load_many(&self.sessions.loaded_names(session_id))
            .0
    }

    /// Dispatch one lifecycle event to its handler.
    pub async fn dispatch(&self, event: HookEvent) -> HookOutcome {
        debug!(hook = %event.kind(), session_id = %event.session_id(), "hook event");
        match event {
            HookEvent::MessageReceived {
                session_id,
                text,
                agent,
            } => self.on_message(&session_id, &text, agent.as_deref()).await,
            HookEvent::ToolExecuteBefore {
                session_id,
                tool_call_id,
                tool_name,
                arguments,
            } => self.on_tool_before(&session_id, &tool_call_id, &tool_name, &arguments),
            HookEvent::ToolExecuteAfter {
                session_id,
                tool_call_id,
                ..
            } => self.on_tool_after(&session_id, &tool_call_id).await,
            HookEvent::ContextCompacting { session_id } => self.on_compaction(&session_id).await,
            HookEvent::SessionEvent {
                session_id,
                event_type,
            } => self.on_session_event(&session_id, &event_type).await,
            HookEvent::RenderInstructions {
                session_id,
                instructions,
            } => {
                self.on_render_instructions(&session_id, instructions)
                    .await
            }
        }
    }

    // ── Handlers ────────────────────────────────────────────────────────────

    /// Message received: resolve agent and keyword triggers, then (for the
    /// chat-message method) prepend the initial and pending blocks.
    async fn on_message(&self, session_id: &str, text: &str, agent: Option<&str>) -> HookOutcome {
        let mut dirty = self.ensure_session(session_id);

        let agent_matches: Vec<String> = agent
            .and_then(|name| self.config.agents.get(name))
            .cloned()
            .unwrap_or_default();
        let keyword_matches = match_keywords(text, &self.config.keywords);

        for (matches, trigger) in [
            (agent_matches, TriggerType::Agent),
            (keyword_matches, TriggerType::Keyword),
        ] {
            dirty |= self.resolve_and_queue(session_id, &matches, trigger);
        }

        let outcome = if self.config.settings.injection_method == InjectionMethod::ChatMessage {
            self.rewrite_message(session_id, text)
        } else {
            HookOutcome::Unchanged
        };

        if dirty {
            self.analytics.flush().await;
        }
        outcome
    }

    /// Instruction render: append one block containing the union of seed,
    /// loaded, and pending skills; consume the queue.
    async fn on_render_instructions(
        &self,
        session_id: &str,
        mut instructions: Vec<String>,
    ) -> HookOutcome {
        if self.config.settings.injection_method != InjectionMethod::SystemPrompt {
            return HookOutcome::Unchanged;
        }
        let dirty = self.ensure_session(session_id);

        let mut seen = HashSet::new();
        let mut names = Vec::new();
        let pending_names: Vec<String> = self
            .sessions
            .pending_skills(session_id)
            .iter()
            .map(|s| s.name.clone())
            .collect();
        for name in self
            .sessions
            .seed_names(session_id)
            .into_iter()
            .chain(self.sessions.loaded_names(session_id))
            .chain(pending_names)
        {
            if seen.insert(name.clone()) {
                names.push(name);
            }
        }
        self.sessions.clear_pending(session_id);

        let outcome = if names.is_empty() {
            HookOutcome::Unchanged
        } else {
            let (skills, _) = self.store.load_many(&names);
            let block = render(&skills, &self.render_options);
            if block.is_empty() {
                HookOutcome::Unchanged
            } else {
                self.sessions.mark_initial_injected(session_id);
                instructions.push(block);
                HookOutcome::Instructions { instructions }
            }
        };

        if dirty {
            self.analytics.flush().await;
        }
        outcome
    }

    /// Tool about to execute: remember the file path for file-touching
    /// tools, keyed by tool-call id.
    fn on_tool_before(
        &self,
        session_id: &str,
        tool_call_id: &str,
        tool_name: &str,
        arguments: &serde_json::Value,
    ) -> HookOutcome {
        if !FILE_TOOL_NAMES.contains(&tool_name) {
            return HookOutcome::Unchanged;
        }
        if let Some(path) = normalize_tool_args(arguments).file_path {
            self.sessions
                .remember_tool_path(session_id, tool_call_id, path);
        }
        HookOutcome::Unchanged
    }

    /// Tool finished: consume the remembered path and resolve extension
    /// and path-pattern triggers.
    async fn on_tool_after(&self, session_id: &str, tool_call_id: &str) -> HookOutcome {
        let mut dirty = self.ensure_session(session_id);

        if let Some(path) = self.sessions.take_tool_path(session_id, tool_call_id) {
            let extension_matches = Path::new(&path)
                .extension()
                .and_then(|e| e.to_str())
                .map(|ext| match_extension(&ext.to_lowercase(), &self.config.extensions))
                .unwrap_or_default();
            let path_matches = match_path(&path, &self.config.paths);

            for (matches, trigger) in [
                (extension_matches, TriggerType::Extension),
                (path_matches, TriggerType::PathPattern),
            ] {
                dirty |= self.resolve_and_queue(session_id, &matches, trigger);
            }
        }

        if dirty {
            self.analytics.flush().await;
        }
        HookOutcome::Unchanged
    }

    /// Context compacting: re-assert every loaded skill into the
    /// summarization context and reset the injected flag.
    async fn on_compaction(&self, session_id: &str) -> HookOutcome {
        if !self.config.settings.persist_after_compaction {
            return HookOutcome::Unchanged;
        }
        let _ = self.ensure_session(session_id);

        let names = self.sessions.loaded_names(session_id);
        if names.is_empty() {
            return HookOutcome::Unchanged;
        }

        let (skills, _) = self.store.load_many(&names);
        let block = render(&skills, &self.render_options);
        self.sessions.reset_initial_injected(session_id);
        self.analytics.flush().await;

        if block.is_empty() {
            HookOutcome::Unchanged
        } else {
            debug!(session_id = %session_id, skills = skills.len(), "skills persisted through compaction");
            HookOutcome::ContextEntry { entry: block }
        }
    }

    /// Session event: tear the session down on deletion.
    async fn on_session_event(&self, session_id: &str, event_type: &str) -> HookOutcome {
        if event_type != SESSION_DELETED {
            return HookOutcome::Unchanged;
        }
        self.sessions.cleanup(session_id);
        let _ = self.analytics.remove_session(session_id);
        self.analytics.flush().await;
        HookOutcome::Unchanged
    }

    // ── Internals ───────────────────────────────────────────────────────────

    /// Materialize session state on first reference, seeded with the
    /// always-load and satisfied conditional skills. Returns `true` if the
    /// state was created by this call.
    fn ensure_session(&self, session_id: &str) -> bool {
        if self.sessions.exists(session_id) {
            return false;
        }

        let always =
            self.allocator
                .load_with_budget(session_id, &self.config.skills, 0, TriggerType::AlwaysLoad);
        let satisfied: Vec<String> = self
            .config
            .conditional
            .iter()
            .filter(|c| evaluate_condition(&c.condition, &self.project_dir))
            .map(|c| c.skill.clone())
            .collect();
        let conditional = self.allocator.load_with_budget(
            session_id,
            &satisfied,
            always.tokens,
            TriggerType::Conditional,
        );

        let mut seen = HashSet::new();
        let mut skills = Vec::new();
        let mut tokens = 0u64;
        for skill in always.skills.into_iter().chain(conditional.skills) {
            if seen.insert(skill.name.clone()) {
                tokens += skill.tokens;
                skills.push(skill);
            }
        }

        self.sessions
            .ensure(session_id, || SeededState { skills, tokens })
    }

    /// Load candidate names through the allocator and queue what survives.
    /// Returns `true` if analytics were mutated.
    fn resolve_and_queue(
        &self,
        session_id: &str,
        matches: &[String],
        trigger: TriggerType,
    ) -> bool {
        if matches.is_empty() {
            return false;
        }
        let used = self.sessions.tokens_used(session_id);
        let outcome = self
            .allocator
            .load_with_budget(session_id, matches, used, trigger);
        if outcome.skills.is_empty() {
            return false;
        }
        let _ = self.sessions.queue_skills(session_id, outcome.skills);
        true
    }

    /// Chat-message injection: initial block on first injection, then the
    /// pending block, then the original text, joined by the separator.
    fn rewrite_message(&self, session_id: &str, text: &str) -> HookOutcome {
        let mut blocks = Vec::new();

        if !self.sessions.is_initial_injected(session_id) {
            let (seeds, _) = self.store.load_many(&self.sessions.seed_names(session_id));
            let block = render(&seeds, &self.render_options);
            if !block.is_empty() {
                blocks.push(block);
            }
            self.sessions.mark_initial_injected(session_id);
        }

        let pending = self.sessions.pending_skills(session_id);
        if !pending.is_empty() {
            let block = render(&pending, &self.render_options);
            self.sessions.clear_pending(session_id);
            if !block.is_empty() {
                blocks.push(block);
            }
        }

        if blocks.is_empty() {
            return HookOutcome::Unchanged;
        }
        blocks.push(text.to_string());
        HookOutcome::Message {
            text: blocks.join(MESSAGE_SEPARATOR),
        }
    }
}

#[async_trait]
impl HookSurface for InjectionEngine {
    fn active_hooks(&self) -> &[HookKind] {
        &self.active_hooks
    }

    async fn handle(&self, event: HookEvent) -> HookOutcome {
        self.dispatch(event).await
    }
}

impl std::fmt::Debug for InjectionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InjectionEngine")
            .field("project_dir", &self.project_dir)
            .field("active_hooks", &self.active_hooks)
            .field("missing", &self.missing)
            .finish()
    }
}

/// Every skill name the config references that has no file on disk.
///
/// Group references are expanded first, so an unresolved `@name` surfaces
/// here as a literal missing name.
fn resolve_missing(config: &SkillsConfig, store: &SkillStore) -> Vec<String> {
    let mut referenced: Vec<String> = Vec::new();
    referenced.extend(config.skills.iter().cloned());
    referenced.extend(config.conditional.iter().map(|c| c.skill.clone()));
    for map in [
        &config.extensions,
        &config.agents,
        &config.paths,
        &config.keywords,
    ] {
        for skills in map.values() {
            referenced.extend(skills.iter().cloned());
        }
    }
    for members in config.groups.values() {
        referenced.extend(members.iter().cloned());
    }

    let expanded = expand_groups(&referenced, &config.groups);
    let (_, mut missing) = store.load_many(&expanded);
    missing.sort();
    missing.dedup();
    missing
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
