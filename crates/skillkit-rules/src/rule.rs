//! Rule files: one best practice per markdown file

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer};
use skillkit_types::{Impact, ImpactParseError};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::frontmatter::split_frontmatter;

/// Rule file frontmatter
///
/// Every key is optional at parse time so partially written rules can still
/// be compiled; the lint reports what is missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleFrontmatter {
    /// Rule title
    #[serde(default)]
    pub title: Option<String>,
    /// Raw tier text; see [`RuleFile::impact`]
    #[serde(default)]
    pub impact: Option<String>,
    /// Short statement of the gain, e.g. "2-10x faster"
    #[serde(default)]
    pub impact_description: Option<String>,
    /// Either `tags: a, b` or a YAML sequence
    #[serde(default, deserialize_with = "deserialize_tags")]
    pub tags: Vec<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTags {
    List(Vec<String>),
    Csv(String),
}

fn deserialize_tags<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let raw = Option::<RawTags>::deserialize(deserializer)?;
    let tags = match raw {
        None => Vec::new(),
        Some(RawTags::List(list)) => list,
        Some(RawTags::Csv(csv)) => csv.split(',').map(str::to_string).collect(),
    };
    Ok(tags
        .into_iter()
        .map(|tag| tag.trim().to_string())
        .filter(|tag| !tag.is_empty())
        .collect())
}

/// What was found at the top of a rule file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrontmatterState {
    /// Parsed successfully
    Present,
    /// No `---` block at the top
    Missing,
    /// YAML present but unparseable; holds the parser message
    Invalid(String),
}

/// A parsed rule file
#[derive(Debug, Clone)]
pub struct RuleFile {
    /// Path the rule was read from
    pub path: PathBuf,
    /// File stem, e.g. `bundle-dynamic-imports`
    pub id: String,
    /// Text before the first `-` of the stem, e.g. `bundle`
    pub prefix: Option<String>,
    /// Parsed keys; defaults when missing or invalid
    pub frontmatter: RuleFrontmatter,
    /// Whether the frontmatter was present and parseable
    pub frontmatter_state: FrontmatterState,
    /// First `## ` heading of the body, else the frontmatter title
    pub heading: String,
    /// Body without the heading line, trimmed
    pub body: String,
    /// Everything after the frontmatter, untouched
    pub raw_body: String,
    /// 1-based line where `raw_body` starts in the file
    pub body_line: usize,
}

impl RuleFile {
    /// Read and parse a rule file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(path, &content)
    }

    /// Parse rule file content; `path` supplies identity only
    pub fn parse(path: &Path, content: &str) -> Result<Self> {
        let id = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        let prefix = id.split_once('-').map(|(prefix, _)| prefix.to_string());

        let (frontmatter, state, raw_body, body_line) = match split_frontmatter(content)? {
            Some(fm) => match serde_yaml::from_str::<Option<RuleFrontmatter>>(fm.yaml) {
                Ok(parsed) => (
                    parsed.unwrap_or_default(),
                    FrontmatterState::Present,
                    fm.body,
                    fm.body_line,
                ),
                Err(e) => (
                    RuleFrontmatter::default(),
                    FrontmatterState::Invalid(e.to_string()),
                    fm.body,
                    fm.body_line,
                ),
            },
            None => (RuleFrontmatter::default(), FrontmatterState::Missing, content, 1),
        };

        let (heading, body) = split_heading(raw_body);
        let heading = heading
            .or_else(|| frontmatter.title.clone())
            .unwrap_or_else(|| id.clone());

        debug!("Parsed rule {} ({:?})", id, state);

        Ok(Self {
            path: path.to_path_buf(),
            id,
            prefix,
            frontmatter,
            frontmatter_state: state,
            heading,
            body,
            raw_body: raw_body.to_string(),
            body_line,
        })
    }

    /// Parsed impact tier, if the frontmatter declares one
    pub fn impact(&self) -> Option<Result<Impact, ImpactParseError>> {
        self.frontmatter.impact.as_deref().map(str::parse)
    }
}

/// Pull the first `## ` line out of a body
fn split_heading(body: &str) -> (Option<String>, String) {
    let mut heading = None;
    let mut rest = Vec::new();
    for line in body.split('\n') {
        if heading.is_none() {
            if let Some(text) = line.strip_prefix("## ") {
                heading = Some(text.trim().to_string());
                continue;
            }
        }
        rest.push(line);
    }
    (heading, rest.join("\n").trim().to_string())
}

/// Whether a file in a rules directory is a rule (`_sections.md` and
/// `_template.md` style files are not)
pub fn is_rule_file(path: &Path) -> bool {
    let is_md = path.extension().is_some_and(|ext| ext == "md");
    let hidden = path
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with('_'));
    is_md && !hidden
}

/// Load every rule in `dir`, sorted by file name
pub fn load_rules(dir: &Path) -> Result<Vec<RuleFile>> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("Failed to read directory {}", dir.display()))?;

    let mut paths = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.is_file() && is_rule_file(&path) {
            paths.push(path);
        }
    }
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    paths.iter().map(|path| RuleFile::load(path)).collect()
}
