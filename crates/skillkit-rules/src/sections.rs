//! The `_sections.md` index: ordered categories of rules
//!
//! ```markdown
//! ## 1. Bundle Size Optimization (bundle)
//!
//! **Impact:** CRITICAL
//! **Description:** Reducing initial bundle size improves TTI and LCP.
//! ```

use regex::Regex;
use skillkit_quotes::{LineKind, MarkdownScanner};
use skillkit_types::{Impact, ImpactParseError};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::warn;

/// Index file name inside a rules directory
pub const SECTIONS_FILE: &str = "_sections.md";

/// Errors raised while reading a sections index
#[derive(Debug, Error)]
pub enum SectionsError {
    /// Index could not be read
    #[error("Failed to read {path}: {source}")]
    Io {
        /// Index path
        path: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// A section heading has no `(prefix)`
    #[error("line {line}: section heading '{heading}' has no (prefix)")]
    MissingPrefix {
        /// Line of the heading
        line: usize,
        /// Heading text without the `##`
        heading: String,
    },

    /// Two sections share a prefix
    #[error("line {line}: duplicate section prefix '{prefix}'")]
    DuplicatePrefix {
        /// Line of the second declaration
        line: usize,
        /// Repeated prefix
        prefix: String,
    },

    /// Impact line names an unknown tier
    #[error("line {line}: {source}")]
    InvalidImpact {
        /// Line of the impact declaration
        line: usize,
        /// Parse failure
        #[source]
        source: ImpactParseError,
    },

    /// No section headings at all
    #[error("no sections declared")]
    Empty,

    /// Built-in pattern failed to compile
    #[error("Failed to compile regex: {0}")]
    Regex(#[from] regex::Error),
}

/// One declared section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// 1-based declaration position
    pub number: usize,
    /// Heading text without number or prefix
    pub title: String,
    /// Rule file prefix grouped under this section
    pub prefix: String,
    /// Declared tier; `MEDIUM` when absent
    pub impact: Impact,
    /// `**Description:**` text, if any
    pub description: Option<String>,
    /// 1-based line of the heading
    pub line: usize,
}

impl Section {
    /// Markdown anchor of the section heading in the compiled guide
    pub fn anchor(&self) -> String {
        format!("{}-{}", self.number, self.title.to_lowercase().replace(' ', "-"))
    }
}

/// Sections in declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sections {
    sections: Vec<Section>,
}

impl Sections {
    /// Read and parse an index file
    pub fn load(path: &Path) -> Result<Self, SectionsError> {
        let content = fs::read_to_string(path).map_err(|source| SectionsError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&content)
    }

    /// Parse index content
    ///
    /// Only prose lines count, so headings shown inside fenced examples are
    /// not sections.
    pub fn parse(content: &str) -> Result<Self, SectionsError> {
        let heading_re = Regex::new(r"^##\s+(?:\d+\.\s*)?(.+?)\s*\(([A-Za-z0-9_-]+)\)\s*$")?;
        let impact_re = Regex::new(r"^\*\*Impact:?\*\*:?\s*(.+?)\s*$")?;
        let description_re = Regex::new(r"^\*\*Description:?\*\*:?\s*(.*?)\s*$")?;

        let mut sections: Vec<Section> = Vec::new();
        let mut impacts: Vec<Option<Impact>> = Vec::new();

        for scanned in MarkdownScanner::new(content) {
            if !matches!(scanned.kind, LineKind::Prose(_)) {
                continue;
            }
            let line_no = scanned.number;
            let line = scanned.text.trim_end();

            if line.starts_with("## ") {
                let captures =
                    heading_re
                        .captures(line)
                        .ok_or_else(|| SectionsError::MissingPrefix {
                            line: line_no,
                            heading: line.trim_start_matches('#').trim().to_string(),
                        })?;
                let title = captures[1].to_string();
                let prefix = captures[2].to_string();

                if sections.iter().any(|s| s.prefix == prefix) {
                    return Err(SectionsError::DuplicatePrefix {
                        line: line_no,
                        prefix,
                    });
                }

                sections.push(Section {
                    number: sections.len() + 1,
                    title,
                    prefix,
                    impact: Impact::Medium,
                    description: None,
                    line: line_no,
                });
                impacts.push(None);
                continue;
            }

            let (Some(current), Some(impact)) = (sections.last_mut(), impacts.last_mut()) else {
                continue;
            };

            if let Some(captures) = impact_re.captures(line) {
                let tier = captures[1]
                    .parse::<Impact>()
                    .map_err(|source| SectionsError::InvalidImpact {
                        line: line_no,
                        source,
                    })?;
                current.impact = tier;
                *impact = Some(tier);
            } else if let Some(captures) = description_re.captures(line) {
                let text = captures[1].to_string();
                if !text.is_empty() {
                    current.description = Some(text);
                }
            }
        }

        if sections.is_empty() {
            return Err(SectionsError::Empty);
        }

        for (section, impact) in sections.iter().zip(&impacts) {
            if impact.is_none() {
                warn!(
                    "Section '{}' declares no impact, defaulting to {}",
                    section.title, section.impact
                );
            }
        }

        Ok(Self { sections })
    }

    /// Section grouping rules with this prefix
    pub fn find(&self, prefix: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.prefix == prefix)
    }

    /// Sections in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter()
    }

    /// Number of declared sections
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// True when nothing is declared
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}
