//! Compile a skill's rule files into a single AGENTS.md guide

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::rule::{load_rules, RuleFile};
use crate::sections::{Section, Sections, SECTIONS_FILE};
use crate::skill::Skill;

const DEFAULT_VERSION: &str = "1.0.0";
const DEFAULT_NOTE: &str =
    "This document is for agents and LLMs when maintaining, generating, or refactoring codebases.";

/// Where rules live and where the guide goes, relative to a skill directory
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Rules directory, relative to the skill
    pub rules_dir: PathBuf,
    /// Guide file, relative to the skill
    pub output: PathBuf,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            rules_dir: PathBuf::from("rules"),
            output: PathBuf::from("AGENTS.md"),
        }
    }
}

/// A compiled guide and what went into it
#[derive(Debug, Clone)]
pub struct CompiledGuide {
    /// Rendered markdown
    pub content: String,
    /// Sections that received at least one rule
    pub sections: usize,
    /// Rules placed in the guide
    pub rules: usize,
    /// Rule files whose prefix matches no section
    pub skipped: Vec<PathBuf>,
}

/// Result of building one skill
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildOutcome {
    /// Guide written (new or changed)
    Written,
    /// Guide on disk already matches
    Unchanged,
    /// Check mode: guide on disk is missing or out of date
    Stale,
}

/// Render the guide from already-loaded parts
pub fn compile_guide(skill: &Skill, sections: &Sections, rules: &[RuleFile]) -> CompiledGuide {
    let mut by_prefix: BTreeMap<&str, Vec<&RuleFile>> = BTreeMap::new();
    let mut skipped = Vec::new();

    for rule in rules {
        match rule.prefix.as_deref() {
            Some(prefix) if sections.find(prefix).is_some() => {
                by_prefix.entry(prefix).or_default().push(rule);
            }
            _ => {
                warn!(
                    "Rule {} matches no declared section, skipping",
                    rule.path.display()
                );
                skipped.push(rule.path.clone());
            }
        }
    }
    for group in by_prefix.values_mut() {
        group.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));
    }

    let populated: Vec<(&Section, &Vec<&RuleFile>)> = sections
        .iter()
        .filter_map(|section| {
            by_prefix
                .get(section.prefix.as_str())
                .map(|group| (section, group))
        })
        .collect();

    let mut out: Vec<String> = Vec::new();
    render_header(&mut out, skill);

    out.push("## Table of Contents".into());
    out.push(String::new());
    for (section, group) in &populated {
        out.push(format!(
            "{}. [{}](#{}) \u{2014} **{}**",
            section.number,
            section.title,
            section.anchor(),
            section.impact
        ));
        for (idx, rule) in group.iter().enumerate() {
            out.push(format!("   - {}.{} {}", section.number, idx + 1, rule.heading));
        }
        out.push(String::new());
    }
    out.push("---".into());
    out.push(String::new());

    for (section, group) in &populated {
        out.push(format!("## {}. {}", section.number, section.title));
        out.push(String::new());
        for (idx, rule) in group.iter().enumerate() {
            out.push(format!("### {}.{} {}", section.number, idx + 1, rule.heading));
            out.push(String::new());
            out.push(rule.body.clone());
            out.push(String::new());
        }
        out.push(String::new());
    }

    let rule_count = populated.iter().map(|(_, group)| group.len()).sum();
    debug!(
        "Compiled {} rules across {} sections for {}",
        rule_count,
        populated.len(),
        skill.name()
    );

    CompiledGuide {
        content: out.join("\n"),
        sections: populated.len(),
        rules: rule_count,
        skipped,
    }
}

fn render_header(out: &mut Vec<String>, skill: &Skill) {
    let meta = &skill.metadata;

    out.push(format!("# {}", skill.title()));
    out.push(String::new());
    out.push(format!(
        "**Version {}**",
        skill.version().unwrap_or_else(|| DEFAULT_VERSION.to_string())
    ));
    if let Some(organization) = meta.metadata_str("organization") {
        out.push(organization);
    }
    out.push(String::new());

    out.push("> **Note:**".into());
    let note = meta
        .metadata_str("note")
        .unwrap_or_else(|| DEFAULT_NOTE.to_string());
    for line in note.trim().lines() {
        out.push(format!("> {}", line.trim_end()));
    }
    out.push(String::new());
    out.push("---".into());
    out.push(String::new());

    out.push("## Abstract".into());
    out.push(String::new());
    out.push(skill.description().trim().to_string());
    out.push(String::new());
    out.push("---".into());
    out.push(String::new());
}

/// Load a skill directory and compile its guide
pub fn compile_skill_dir(dir: &Path, options: &BuildOptions) -> Result<(Skill, CompiledGuide)> {
    let skill = Skill::metadata_from_dir(dir)?;
    let rules_dir = dir.join(&options.rules_dir);
    let sections = Sections::load(&rules_dir.join(SECTIONS_FILE))
        .with_context(|| format!("Invalid sections index for skill '{}'", skill.name()))?;
    let rules = load_rules(&rules_dir)?;
    let guide = compile_guide(&skill, &sections, &rules);
    Ok((skill, guide))
}

/// Compile and write (or, with `check`, verify) a skill's guide
pub fn build_skill(dir: &Path, options: &BuildOptions, check: bool) -> Result<BuildOutcome> {
    let (skill, guide) = compile_skill_dir(dir, options)?;
    let output = dir.join(&options.output);

    let existing = match fs::read_to_string(&output) {
        Ok(content) => Some(content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read {}", output.display()));
        }
    };

    if existing.as_deref() == Some(guide.content.as_str()) {
        debug!("{} is up to date", output.display());
        return Ok(BuildOutcome::Unchanged);
    }

    if check {
        warn!("{} is out of date", output.display());
        return Ok(BuildOutcome::Stale);
    }

    fs::write(&output, &guide.content)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    info!(
        "Wrote {} ({} rules, {} sections) for skill '{}'",
        output.display(),
        guide.rules,
        guide.sections,
        skill.name()
    );
    Ok(BuildOutcome::Written)
}
