//! Audit or fix every markdown file under a repository root

use anyhow::{anyhow, Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::audit::{audit_str, QuoteHit, QuoteReport};
use crate::fix::fix_prose_quotes;

/// Generated compilations are never rewritten by the fixer
const GENERATED_FILE: &str = "AGENTS.md";

/// Settings for a workspace audit
#[derive(Debug, Clone)]
pub struct QuoteAuditOptions {
    /// Directory names skipped while walking
    pub exclude: Vec<String>,
    /// Globs (relative to the root) whose violations are intentional
    pub intentional: Vec<String>,
    /// Globs (relative to the root) whose "Avoid:" example lines keep straight quotes
    pub avoid_examples: Vec<String>,
    /// Prose hits listed per file before truncation
    pub max_prose_reports: usize,
    /// Code hits listed per file before truncation
    pub max_code_reports: usize,
}

impl Default for QuoteAuditOptions {
    fn default() -> Self {
        Self {
            exclude: vec!["node_modules".into(), ".git".into(), "target".into()],
            intentional: vec![
                "**/docs-fancy-quotes.md".into(),
                "**/frontend-general/**/AGENTS.md".into(),
            ],
            avoid_examples: vec!["**/docs-fancy-quotes.md".into()],
            max_prose_reports: 20,
            max_code_reports: 10,
        }
    }
}

/// Violations found in one file
#[derive(Debug, Clone)]
pub struct FileViolations {
    /// Path relative to the root
    pub path: PathBuf,
    /// What was found
    pub report: QuoteReport,
}

/// Outcome of auditing a workspace
#[derive(Debug, Clone, Default)]
pub struct AuditSummary {
    /// Markdown files read
    pub files_checked: usize,
    /// Files with unintentional violations
    pub violations: Vec<FileViolations>,
    /// Files that could not be read, with the reason
    pub errors: Vec<(PathBuf, String)>,
}

impl AuditSummary {
    /// True when no file has violations
    pub fn is_ok(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Outcome of fixing a workspace
#[derive(Debug, Clone, Default)]
pub struct FixSummary {
    /// Files rewritten, relative to the root
    pub fixed: Vec<PathBuf>,
    /// Files skipped, with the reason
    pub errors: Vec<(PathBuf, String)>,
}

/// Quote auditor over a repository root
pub struct QuoteAuditor {
    root: PathBuf,
    options: QuoteAuditOptions,
    intentional: GlobSet,
    avoid_examples: GlobSet,
}

impl QuoteAuditor {
    /// Compile the option globs; fails on an invalid pattern
    pub fn new(root: impl Into<PathBuf>, options: QuoteAuditOptions) -> Result<Self> {
        let intentional = build_globset(&options.intentional)?;
        let avoid_examples = build_globset(&options.avoid_examples)?;
        Ok(Self {
            root: root.into(),
            options,
            intentional,
            avoid_examples,
        })
    }

    /// Options in effect
    pub fn options(&self) -> &QuoteAuditOptions {
        &self.options
    }

    /// All `*.md` files under the root, sorted, paths relative to the root
    pub fn markdown_files(&self) -> Vec<PathBuf> {
        let exclude = &self.options.exclude;
        let mut files: Vec<PathBuf> = WalkDir::new(&self.root)
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
                    warn!("Skipping unreadable path: {}", e);
                    None
                }
            })
            .filter(|entry| {
                entry.file_type().is_file()
                    && entry.path().extension().is_some_and(|ext| ext == "md")
            })
            .filter_map(|entry| {
                entry
                    .path()
                    .strip_prefix(&self.root)
                    .ok()
                    .map(Path::to_path_buf)
            })
            .collect();
        files.sort();
        files
    }

    /// Audit every markdown file
    pub fn audit(&self) -> AuditSummary {
        let mut summary = AuditSummary::default();

        for rel in self.markdown_files() {
            let path = self.root.join(&rel);
            let content = match fs::read_to_string(&path) {
                Ok(content) => content,
                Err(e) => {
                    summary.errors.push((rel, e.to_string()));
                    continue;
                }
            };
            summary.files_checked += 1;

            let report = audit_str(&content);
            if report.is_ok() {
                continue;
            }
            if self.intentional.is_match(&rel) {
                debug!("Ignoring intentional quotes in {}", rel.display());
                continue;
            }
            summary.violations.push(FileViolations { path: rel, report });
        }

        info!(
            "Audited {} markdown files, {} with violations",
            summary.files_checked,
            summary.violations.len()
        );
        summary
    }

    /// Rewrite prose quotes in place, skipping generated compilations
    pub fn fix(&self) -> FixSummary {
        let mut summary = FixSummary::default();

        for rel in self.markdown_files() {
            if rel.file_name().is_some_and(|name| name == GENERATED_FILE) {
                continue;
            }
            let path = self.root.join(&rel);
            match self.fix_file(&path, &rel) {
                Ok(true) => summary.fixed.push(rel),
                Ok(false) => {}
                Err(e) => summary.errors.push((rel, format!("{e:#}"))),
            }
        }

        info!("Fixed {} markdown files", summary.fixed.len());
        summary
    }

    fn fix_file(&self, path: &Path, rel: &Path) -> Result<bool> {
        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
        let keep_avoid = self.avoid_examples.is_match(rel);
        let fixed = fix_prose_quotes(&content, keep_avoid)?;
        if fixed == content {
            return Ok(false);
        }
        fs::write(path, fixed).with_context(|| format!("Failed to write {}", path.display()))?;
        debug!("Rewrote quotes in {}", rel.display());
        Ok(true)
    }

    /// Human-readable audit report
    pub fn render_report(&self, summary: &AuditSummary) -> String {
        if summary.is_ok() {
            return "All .md files are faithful to the fancy-quotes rule.\n".to_string();
        }

        let mut out = String::from("Files with potential violations of docs-fancy-quotes:\n\n");
        for file in &summary.violations {
            let _ = writeln!(out, "  {}", file.path.display());
            render_hits(
                &mut out,
                "Prose: straight",
                &file.report.straight_in_prose,
                self.options.max_prose_reports,
            );
            render_hits(
                &mut out,
                "Code:  fancy",
                &file.report.fancy_in_code,
                self.options.max_code_reports,
            );
            out.push('\n');
        }
        out
    }
}

fn render_hits(out: &mut String, label: &str, hits: &[QuoteHit], limit: usize) {
    for hit in hits.iter().take(limit) {
        let _ = writeln!(out, "    {label} {hit}");
    }
    if hits.len() > limit {
        let _ = writeln!(out, "    ... and {} more", hits.len() - limit);
    }
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| anyhow!("Invalid glob '{}': {}", pattern, e))?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| anyhow!("Failed to build glob set: {}", e))
}
