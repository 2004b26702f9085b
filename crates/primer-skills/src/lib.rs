//! # primer-skills
//!
//! Skill loading, caching, and rendering.
//!
//! Skills are markdown files with an optional `---`-delimited key-value
//! header (name, description, summary) followed by free-form body content.
//! The store resolves a skill name against an ordered search path (project
//! directories first, then global fallbacks under the user's home), caches
//! by name, and renders loaded skills into a tagged injection block.

#![deny(unsafe_code)]

pub mod errors;
pub mod parser;
pub mod render;
pub mod store;
pub mod types;

pub use errors::SkillError;
pub use render::{RenderOptions, render};
pub use store::SkillStore;
pub use types::Skill;
