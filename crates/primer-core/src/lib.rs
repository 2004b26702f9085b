//! # primer-core
//!
//! Foundation types and constants for the Primer skill-injection engine.
//!
//! This crate provides the shared vocabulary the other Primer crates depend
//! on: search-path and envelope constants, the [`TriggerType`] taxonomy used
//! by analytics, and token estimation.

#![deny(unsafe_code)]

pub mod constants;
pub mod tokens;
pub mod trigger;

pub use tokens::estimate_tokens;
pub use trigger::TriggerType;
