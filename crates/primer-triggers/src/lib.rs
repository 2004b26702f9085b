//! # primer-triggers
//!
//! Pure trigger resolution for the Primer engine.
//!
//! Maps an extension, file path, or keyword to candidate skill names,
//! expands `@group` references, and evaluates conditional-skill conditions.
//! Every function here is side-effect free apart from the filesystem and
//! environment probes the condition checks require.

#![deny(unsafe_code)]

pub mod condition;
pub mod extension;
pub mod glob;
pub mod groups;
pub mod keyword;

pub use condition::evaluate_condition;
pub use extension::match_extension;
pub use glob::{glob_to_regex, match_path};
pub use groups::expand_groups;
pub use keyword::match_keywords;
