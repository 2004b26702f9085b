//! Shared constants: search paths, file contracts, and envelope markers.

/// Project-local skill directories, highest priority first.
pub const PROJECT_SKILLS_DIRS: &[&str] = &[".primer/skills", ".agent/skills"];

/// Global skill directories relative to the user's home, searched after the
/// project directories.
pub const GLOBAL_SKILLS_DIRS: &[&str] = &[".primer/skills", ".config/primer/skills"];

/// Filename used by the directory-per-skill layout (`<name>/SKILL.md`).
pub const SKILL_MD_FILENAME: &str = "SKILL.md";

/// Skill files larger than this are treated as absent.
pub const MAX_SKILL_FILE_SIZE: u64 = 1024 * 1024;

/// Project-local config paths relative to the project root, highest
/// priority first.
pub const PROJECT_CONFIG_PATHS: &[&str] = &[".primer/config.json", "primer.config.json"];

/// Global config path relative to the user's home.
pub const GLOBAL_CONFIG_PATH: &str = ".primer/config.json";

/// Analytics file path relative to the project root.
pub const ANALYTICS_FILE: &str = ".primer/analytics.json";

/// Manifest consulted by the package-dependency condition check.
pub const PACKAGE_MANIFEST: &str = "package.json";

/// Approximate characters per token for estimation.
pub const CHARS_PER_TOKEN: u64 = 4;

/// Maximum length of a synthesized skill summary, in characters.
pub const SUMMARY_MAX_CHARS: usize = 200;

/// Marker appended to a truncated synthesized summary.
pub const SUMMARY_ELLIPSIS: &str = "…";

/// Outer wrapper tag for a rendered block of skills.
pub const WRAPPER_TAG: &str = "injected-skills";

/// Per-skill envelope tag inside the wrapper.
pub const SKILL_TAG: &str = "skill";

/// Separator joining injected blocks and the original chat message.
pub const MESSAGE_SEPARATOR: &str = "\n\n---\n\n";

/// Prefix marking a skill-group reference in config lists.
pub const GROUP_PREFIX: char = '@';

/// Tools whose arguments carry a file path worth resolving triggers for.
pub const FILE_TOOL_NAMES: &[&str] = &["Read", "Write", "Edit", "MultiEdit"];

/// Argument keys checked for a file path, in priority order.
pub const FILE_PATH_ARG_KEYS: &[&str] = &["file_path", "path", "notebook_path"];

/// Maximum remembered tool-call paths per session; oldest entries are
/// evicted first.
pub const TOOL_PATH_CAPACITY: usize = 64;
