//! Skill store.
//!
//! Resolves skill names against an ordered search path and caches loaded
//! skills by name. The cache is process-wide for the owning engine instance
//! and independent of sessions.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, warn};

use primer_core::constants::{
    GLOBAL_SKILLS_DIRS, MAX_SKILL_FILE_SIZE, PROJECT_SKILLS_DIRS, SKILL_MD_FILENAME,
};
use primer_core::estimate_tokens;

use crate::errors::SkillError;
use crate::parser::parse_skill;
use crate::types::Skill;

/// Caching skill loader over an ordered directory search path.
pub struct SkillStore {
    search_dirs: Vec<PathBuf>,
    cache: Mutex<HashMap<String, Arc<Skill>>>,
}

impl SkillStore {
    /// Create a store with the default search path for a project:
    /// project-local directories first, then global fallbacks under the
    /// user's home.
    pub fn new(project_dir: &Path) -> Self {
        let mut dirs: Vec<PathBuf> = PROJECT_SKILLS_DIRS
            .iter()
            .map(|d| project_dir.join(d))
            .collect();
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
        dirs.extend(GLOBAL_SKILLS_DIRS.iter().map(|d| Path::new(&home).join(d)));
        Self::with_dirs(dirs)
    }

    /// Create a store with an explicit search path (for embedding and tests).
    pub fn with_dirs(search_dirs: Vec<PathBuf>) -> Self {
        Self {
            search_dirs,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// The directories searched, highest priority first.
    pub fn search_dirs(&self) -> &[PathBuf] {
        &self.search_dirs
    }

    /// Load a skill by name.
    ///
    /// The first existing file across the search path wins; each directory
    /// is probed for `<name>.md` then `<name>/SKILL.md`. Returns `None` if
    /// nothing is found or the chosen file cannot be read.
    pub fn load(&self, name: &str) -> Option<Arc<Skill>> {
        if let Some(skill) = self.cache.lock().get(name) {
            return Some(Arc::clone(skill));
        }

        let path = self.resolve(name)?;
        let raw = match read_skill_file(&path) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(name = %name, path = %path.display(), error = %e, "failed to read skill file");
                return None;
            }
        };

        let parsed = parse_skill(&raw);
        let skill = Arc::new(Skill {
            name: name.to_string(),
            description: parsed.description.unwrap_or_default(),
            summary: parsed.summary,
            tokens: estimate_tokens(&parsed.content),
            content: parsed.content,
            path: path.to_string_lossy().into_owned(),
        });

        debug!(name = %name, path = %path.display(), tokens = skill.tokens, "loaded skill");
        let _ = self
            .cache
            .lock()
            .insert(name.to_string(), Arc::clone(&skill));
        Some(skill)
    }

    /// Load multiple skills, preserving input order.
    ///
    /// Returns `(found, missing)` — missing names are reported, not errors.
    pub fn load_many(&self, names: &[String]) -> (Vec<Arc<Skill>>, Vec<String>) {
        let mut found = Vec::new();
        let mut missing = Vec::new();
        for name in names {
            match self.load(name) {
                Some(skill) => found.push(skill),
                None => missing.push(name.clone()),
            }
        }
        (found, missing)
    }

    /// List every discoverable skill name across the search path,
    /// sorted and deduplicated.
    pub fn available(&self) -> Vec<String> {
        let mut names = BTreeSet::new();
        for dir in &self.search_dirs {
            let Ok(entries) = std::fs::read_dir(dir) else {
                continue;
            };
            for entry in entries.flatten() {
                let path = entry.path();
                if path.is_file() {
                    if path.extension().is_some_and(|e| e == "md") {
                        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                            let _ = names.insert(stem.to_string());
                        }
                    }
                } else if path.is_dir() && path.join(SKILL_MD_FILENAME).is_file() {
                    if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                        let _ = names.insert(name.to_string());
                    }
                }
            }
        }
        names.into_iter().collect()
    }

    /// First existing candidate file for a skill name, in search order.
    fn resolve(&self, name: &str) -> Option<PathBuf> {
        for dir in &self.search_dirs {
            let flat = dir.join(format!("{name}.md"));
            if flat.is_file() {
                return Some(flat);
            }
            let nested = dir.join(name).join(SKILL_MD_FILENAME);
            if nested.is_file() {
                return Some(nested);
            }
        }
        None
    }
}

impl std::fmt::Debug for SkillStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SkillStore")
            .field("search_dirs", &self.search_dirs)
            .field("cached", &self.cache.lock().len())
            .finish()
    }
}

/// Read a skill file, enforcing the size guard.
fn read_skill_file(path: &Path) -> Result<String, SkillError> {
    let metadata = std::fs::metadata(path)?;
    let size = metadata.len();
    if size > MAX_SKILL_FILE_SIZE {
        return Err(SkillError::FileTooLarge {
            path: path.to_string_lossy().into_owned(),
            size,
            max: MAX_SKILL_FILE_SIZE,
        });
    }
    Ok(std::fs::read_to_string(path)?)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
