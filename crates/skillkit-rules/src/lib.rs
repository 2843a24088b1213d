//! `SkillKit` Rules
//!
//! Tooling for skill directories: a `SKILL.md` manifest plus a `rules/`
//! folder of one-practice-per-file markdown documents.
//!
//! ## Features
//!
//! - YAML frontmatter parsing for skill manifests and rule files
//! - `_sections.md` index: ordered categories with impact tiers
//! - Compilation of all rules, in section order, into a single `AGENTS.md`
//! - Content lint: required frontmatter keys, orphan and empty sections,
//!   unterminated or untagged code fences
//! - Discovery of skills below configured directories

#![deny(unsafe_code, dead_code, unused_imports, unused_variables, missing_docs)]

pub mod compile;
pub mod frontmatter;
pub mod lint;
pub mod registry;
pub mod rule;
pub mod sections;
pub mod skill;

pub use compile::{
    build_skill, compile_guide, compile_skill_dir, BuildOptions, BuildOutcome, CompiledGuide,
};
pub use lint::lint_skill;
pub use registry::SkillsRegistry;
pub use rule::{load_rules, RuleFile, RuleFrontmatter};
pub use sections::{Section, Sections, SectionsError};
pub use skill::Skill;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{BuildOptions, RuleFile, Sections, Skill, SkillsRegistry};
}
