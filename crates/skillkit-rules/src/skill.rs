//! Skill manifest definition and parsing
//!
//! Each skill is a folder containing SKILL.md with YAML frontmatter, and
//! optionally a `rules/` folder of rule files compiled into AGENTS.md.

use anyhow::{anyhow, Context, Result};
use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::frontmatter::split_frontmatter;

/// Manifest file name inside a skill directory
pub const SKILL_FILE: &str = "SKILL.md";

/// Maximum recommended name length
const MAX_NAME_LENGTH: usize = 64;
/// Maximum recommended description length
const MAX_DESCRIPTION_LENGTH: usize = 1024;

/// Skill metadata extracted from YAML frontmatter
#[derive(Debug, Clone, Deserialize)]
pub struct SkillMetadata {
    /// Skill name (lowercase letters/numbers/hyphens only)
    pub name: String,
    /// Skill description, used as the abstract of the compiled guide
    pub description: String,
    /// License identifier
    #[serde(default)]
    pub license: Option<String>,
    /// Free-form metadata (`version`, `title`, `organization`, `note`)
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_yaml::Value>,
}

impl SkillMetadata {
    /// Metadata value rendered as a string; scalars only
    pub fn metadata_str(&self, key: &str) -> Option<String> {
        match self.metadata.get(key)? {
            serde_yaml::Value::String(s) => Some(s.clone()),
            serde_yaml::Value::Number(n) => Some(n.to_string()),
            serde_yaml::Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}

/// A skill with metadata and content
#[derive(Debug, Clone)]
pub struct Skill {
    /// Skill metadata
    pub metadata: SkillMetadata,
    /// Full path to skill directory
    pub path: PathBuf,
    /// Full SKILL.md content (loaded on demand)
    pub content: Option<String>,
}

impl Skill {
    /// Load skill from a directory, keeping the full SKILL.md content
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let mut skill = Self::metadata_from_dir(dir)?;
        skill.load_content()?;
        Ok(skill)
    }

    /// Load only metadata from a directory
    pub fn metadata_from_dir(dir: &Path) -> Result<Self> {
        let skill_file = dir.join(SKILL_FILE);

        if !skill_file.exists() {
            return Err(anyhow!("{} not found in {}", SKILL_FILE, dir.display()));
        }

        let content = fs::read_to_string(&skill_file)
            .with_context(|| format!("Failed to read {}", skill_file.display()))?;

        let metadata = parse_skill_content(&content)
            .with_context(|| format!("Failed to parse skill from {}", skill_file.display()))?;

        validate_metadata(&metadata)?;

        Ok(Self {
            metadata,
            path: dir.to_path_buf(),
            content: None,
        })
    }

    /// Load full content if not already loaded
    pub fn load_content(&mut self) -> Result<()> {
        if self.content.is_some() {
            return Ok(());
        }

        let skill_file = self.path.join(SKILL_FILE);
        let content = fs::read_to_string(&skill_file)
            .with_context(|| format!("Failed to read {}", skill_file.display()))?;

        self.content = Some(content);
        Ok(())
    }

    /// Skill name from the manifest
    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// Skill description from the manifest
    pub fn description(&self) -> &str {
        &self.metadata.description
    }

    /// `metadata.version` if declared
    pub fn version(&self) -> Option<String> {
        self.metadata.metadata_str("version")
    }

    /// Guide title: `metadata.title`, else the name title-cased on `-`
    pub fn title(&self) -> String {
        self.metadata
            .metadata_str("title")
            .unwrap_or_else(|| title_case(&self.metadata.name))
    }

    /// Concise one-line summary: "- {name}: {description}"
    pub fn to_summary(&self) -> String {
        format!("- {}: {}", self.metadata.name, self.metadata.description)
    }
}

fn title_case(name: &str) -> String {
    name.split('-')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse SKILL.md content to extract frontmatter metadata
fn parse_skill_content(content: &str) -> Result<SkillMetadata> {
    let frontmatter =
        split_frontmatter(content)?.ok_or_else(|| anyhow!("No valid YAML frontmatter found"))?;

    let metadata: SkillMetadata = serde_yaml::from_str(frontmatter.yaml)
        .with_context(|| "Failed to parse YAML frontmatter")?;

    Ok(metadata)
}

/// Validate skill metadata
fn validate_metadata(metadata: &SkillMetadata) -> Result<()> {
    if metadata.name.is_empty() {
        return Err(anyhow!("Skill name cannot be empty"));
    }

    if metadata.name.len() > MAX_NAME_LENGTH {
        warn!(
            "Skill name '{}' exceeds {} characters (was {})",
            metadata.name,
            MAX_NAME_LENGTH,
            metadata.name.len()
        );
    }

    // Name should be lowercase letters, numbers, and hyphens only
    let name_re = Regex::new(r"^[a-z0-9-]+$")
        .map_err(|e| anyhow!("Failed to compile name validation regex: {}", e))?;

    if !name_re.is_match(&metadata.name) {
        return Err(anyhow!(
            "Skill name '{}' must contain only lowercase letters, numbers, and hyphens",
            metadata.name
        ));
    }

    if metadata.description.trim().is_empty() {
        return Err(anyhow!("Skill description cannot be empty"));
    }

    if metadata.description.len() > MAX_DESCRIPTION_LENGTH {
        warn!(
            "Skill '{}' description exceeds {} characters (was {})",
            metadata.name,
            MAX_DESCRIPTION_LENGTH,
            metadata.description.len()
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_skill_content() {
        let content = r#"---
name: frontend-react
description: React performance rules. Use when writing or reviewing React components.
license: MIT
metadata:
  version: "1.2.0"
  organization: React
---

# Frontend React

Read AGENTS.md before writing components.
"#;

        let metadata = parse_skill_content(content).unwrap();
        assert_eq!(metadata.name, "frontend-react");
        assert_eq!(metadata.license.as_deref(), Some("MIT"));
        assert_eq!(metadata.metadata_str("version").as_deref(), Some("1.2.0"));
        assert_eq!(metadata.metadata_str("organization").as_deref(), Some("React"));
        assert_eq!(metadata.metadata_str("title"), None);
    }

    #[test]
    fn test_numeric_version_is_stringified() {
        let content = "---\nname: a\ndescription: b\nmetadata:\n  version: 1.5\n---\n";
        let metadata = parse_skill_content(content).unwrap();
        assert_eq!(metadata.metadata_str("version").as_deref(), Some("1.5"));
    }

    #[test]
    fn test_validate_metadata() {
        let valid = SkillMetadata {
            name: "valid-skill-name".to_string(),
            description: "A valid description".to_string(),
            license: None,
            metadata: BTreeMap::new(),
        };
        assert!(validate_metadata(&valid).is_ok());

        let invalid_name = SkillMetadata {
            name: "Invalid_Name".to_string(),
            ..valid.clone()
        };
        assert!(validate_metadata(&invalid_name).is_err());

        let blank_description = SkillMetadata {
            description: "  ".to_string(),
            ..valid
        };
        assert!(validate_metadata(&blank_description).is_err());
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("frontend-react"), "Frontend React");
        assert_eq!(title_case("a--b"), "A B");
    }
}
