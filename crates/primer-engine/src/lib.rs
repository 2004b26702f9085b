//! # primer-engine
//!
//! The injection engine: per-session state, token budgeting, usage
//! analytics, and the orchestrator that wires host lifecycle events to
//! trigger resolution and skill rendering.
//!
//! The host drives the engine through a fixed event union: one
//! [`HookEvent`] in, one [`HookOutcome`] out, via
//! [`HookSurface::handle`]. Handlers never raise past that boundary —
//! every fallible operation degrades to an absent/empty/unchanged result.

#![deny(unsafe_code)]

pub mod analytics;
pub mod budget;
pub mod engine;
pub mod errors;
pub mod events;
pub mod session;

pub use analytics::{AnalyticsStore, SessionAnalytics, SkillUsage};
pub use budget::{BudgetAllocator, BudgetOutcome};
pub use engine::{HookSurface, InjectionEngine, SessionReport};
pub use errors::EngineError;
pub use events::{HookEvent, HookKind, HookOutcome, NormalizedToolArgs, normalize_tool_args};
pub use session::{SeededState, SessionStore};
