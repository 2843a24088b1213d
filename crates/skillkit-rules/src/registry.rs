//! Skills registry for discovering skill directories
//!
//! - Phase 1: Scan directories and load manifest metadata only
//! - Phase 2: Load full SKILL.md content on demand

use anyhow::Result;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::skill::{Skill, SKILL_FILE};

/// How deep below a configured directory to look for SKILL.md
const MAX_SCAN_DEPTH: usize = 4;

/// Skills registry managing all discovered skills
pub struct SkillsRegistry {
    /// All discovered skills (metadata only initially)
    skills: HashMap<String, Skill>,
    /// Skills directories to scan
    directories: Vec<PathBuf>,
    /// Directory names never descended into
    exclude: Vec<String>,
}

impl SkillsRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            skills: HashMap::new(),
            directories: Vec::new(),
            exclude: vec!["node_modules".into(), ".git".into(), "target".into()],
        }
    }

    /// Add a skills directory to scan
    pub fn add_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.directories.push(dir.into());
        self
    }

    /// Replace the list of excluded directory names
    pub fn with_exclude(mut self, exclude: Vec<String>) -> Self {
        self.exclude = exclude;
        self
    }

    /// Scan all configured directories and discover skills
    ///
    /// Missing directories, unreadable paths and invalid skills are logged
    /// and skipped.
    pub fn discover(&mut self) {
        info!(
            "Starting skills discovery in {} directories",
            self.directories.len()
        );

        let directories = self.directories.clone();

        for dir in &directories {
            if !dir.exists() {
                debug!("Skills directory does not exist: {}", dir.display());
                continue;
            }

            if !dir.is_dir() {
                warn!("Skills path is not a directory: {}", dir.display());
                continue;
            }

            self.scan_directory(dir);
        }

        info!("Discovered {} skills", self.skills.len());
    }

    /// Scan a single directory: either a skill itself or a tree containing skills
    fn scan_directory(&mut self, dir: &Path) {
        let exclude = &self.exclude;
        let candidates: Vec<PathBuf> = WalkDir::new(dir)
            .max_depth(MAX_SCAN_DEPTH)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                entry.depth() == 0
                    || !entry
                        .file_name()
                        .to_str()
                        .is_some_and(|name| exclude.iter().any(|ex| ex == name))
            })
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("Skipping unreadable path during discovery: {}", e);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_dir() && entry.path().join(SKILL_FILE).is_file())
            .map(|entry| entry.into_path())
            .collect();

        for path in candidates {
            match Skill::metadata_from_dir(&path) {
                Ok(skill) => {
                    let name = skill.name().to_string();
                    if let Some(existing) = self.skills.get(&name) {
                        warn!(
                            "Duplicate skill '{}' at {} (keeping {})",
                            name,
                            path.display(),
                            existing.path.display()
                        );
                        continue;
                    }
                    debug!("Discovered skill: {} at {}", name, path.display());
                    self.skills.insert(name, skill);
                }
                Err(e) => {
                    debug!("Skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    /// Get a skill by name (returns metadata only if not yet loaded)
    pub fn get(&self, name: &str) -> Option<&Skill> {
        self.skills.get(name)
    }

    /// Load full content for a specific skill
    pub fn load_skill(&mut self, name: &str) -> Result<&Skill> {
        let skill = self
            .skills
            .get_mut(name)
            .ok_or_else(|| anyhow::anyhow!("Skill '{}' not found", name))?;

        skill.load_content()?;
        Ok(skill)
    }

    /// All skills sorted by name
    pub fn skills(&self) -> Vec<&Skill> {
        let mut sorted: Vec<_> = self.skills.values().collect();
        sorted.sort_by(|a, b| a.name().cmp(b.name()));
        sorted
    }

    /// Get number of skills
    pub fn len(&self) -> usize {
        self.skills.len()
    }

    /// Check if registry is empty
    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }

    /// One `- name: description` line per skill, sorted by name
    pub fn generate_skills_list(&self) -> String {
        if self.skills.is_empty() {
            return "No skills available".to_string();
        }

        self.skills()
            .iter()
            .map(|skill| skill.to_summary())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for SkillsRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_new() {
        let registry = SkillsRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn test_generate_skills_list_empty() {
        let registry = SkillsRegistry::new();
        assert_eq!(registry.generate_skills_list(), "No skills available");
    }

    #[test]
    fn test_missing_directory_is_ignored() {
        let mut registry = SkillsRegistry::new().add_directory("/definitely/not/here");
        registry.discover();
        assert!(registry.is_empty());
    }
}
