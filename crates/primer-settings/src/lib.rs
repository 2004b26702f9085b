//! # primer-settings
//!
//! Config types and loading for the Primer skill-injection engine.
//!
//! The config is a single JSON document discovered at a project-local path,
//! a project-root fallback, or a global fallback (first found wins). Loading
//! fails open: a missing or malformed file yields defaults, and partial
//! configs deep-merge over compiled defaults.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{config_paths, load_config, load_config_from_path};
pub use types::{
    ConditionSpec, ConditionalSkill, EngineSettings, InjectionMethod, SkillOverride, SkillsConfig,
};
