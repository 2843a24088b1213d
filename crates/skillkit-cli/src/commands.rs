use crate::config::Config;
use anyhow::Result;
use skillkit_plugins::{bump_version, check_marketplace};
use skillkit_quotes::QuoteAuditor;
use skillkit_rules::{build_skill, lint_skill, BuildOutcome, SkillsRegistry};
use skillkit_types::{has_errors, Finding, Severity};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info};

/// Command runner bound to a configuration and repository root
pub struct App {
    config: Config,
    root: PathBuf,
}

impl App {
    pub fn new(config: Config, root_override: Option<&Path>) -> Self {
        let root = config.root(root_override);
        Self { config, root }
    }

    /// Path relative to the root for display
    fn rel<'a>(&self, path: &'a Path) -> &'a Path {
        path.strip_prefix(&self.root).unwrap_or(path)
    }

    fn registry(&self) -> SkillsRegistry {
        let mut registry =
            SkillsRegistry::new().with_exclude(self.config.workspace.exclude.clone());
        for dir in &self.config.workspace.skill_dirs {
            registry = registry.add_directory(self.root.join(dir));
        }
        registry.discover();
        registry
    }

    /// Explicit skill directories, or every discovered skill with a rules directory
    fn skill_dirs(&self, explicit: &[PathBuf]) -> Vec<PathBuf> {
        if !explicit.is_empty() {
            return explicit.to_vec();
        }
        let rules_dir = &self.config.build.rules_dir;
        self.registry()
            .skills()
            .into_iter()
            .map(|skill| skill.path.clone())
            .filter(|path| path.join(rules_dir).is_dir())
            .collect()
    }

    pub fn build(&self, skills: &[PathBuf], check: bool) -> Result<ExitCode> {
        let options = self.config.build_options();
        let dirs = self.skill_dirs(skills);
        if dirs.is_empty() {
            println!("No skills with a {} directory found.", options.rules_dir.display());
            return Ok(ExitCode::SUCCESS);
        }

        let mut failed = false;
        for dir in &dirs {
            let output = dir.join(&options.output);
            match build_skill(dir, &options, check) {
                Ok(BuildOutcome::Written) => println!("Wrote {}", self.rel(&output).display()),
                Ok(BuildOutcome::Unchanged) => {
                    println!("Up to date: {}", self.rel(&output).display());
                }
                Ok(BuildOutcome::Stale) => {
                    println!("Out of date: {}", self.rel(&output).display());
                    failed = true;
                }
                Err(e) => {
                    error!("Build failed for {}: {:#}", dir.display(), e);
                    eprintln!("{}: {:#}", self.rel(dir).display(), e);
                    failed = true;
                }
            }
        }

        if check && failed {
            println!("\nRun `skillkit build` to regenerate.");
        }
        Ok(exit_code(failed))
    }

    pub fn lint(&self, skills: &[PathBuf]) -> Result<ExitCode> {
        let options = self.config.build_options();
        let dirs: Vec<PathBuf> = if skills.is_empty() {
            self.registry()
                .skills()
                .into_iter()
                .map(|skill| skill.path.clone())
                .collect()
        } else {
            skills.to_vec()
        };

        let mut findings = Vec::new();
        for dir in &dirs {
            findings.extend(lint_skill(dir, &options));
        }
        info!("Linted {} skills", dirs.len());

        Ok(self.report_findings(&findings))
    }

    pub fn audit_quotes(&self) -> Result<ExitCode> {
        let auditor = QuoteAuditor::new(&self.root, self.config.quote_options())?;
        let summary = auditor.audit();

        for (rel, reason) in &summary.errors {
            eprintln!("{}: ERROR {}", rel.display(), reason);
        }
        print!("{}", auditor.render_report(&summary));

        Ok(exit_code(!summary.is_ok()))
    }

    pub fn fix_quotes(&self) -> Result<ExitCode> {
        let auditor = QuoteAuditor::new(&self.root, self.config.quote_options())?;
        let summary = auditor.fix();

        for (rel, reason) in &summary.errors {
            eprintln!("{}: skip ({})", rel.display(), reason);
        }
        for rel in &summary.fixed {
            println!("Fixed: {}", rel.display());
        }
        println!(
            "\nFixed {} file(s). Regenerate {} with `skillkit build`.",
            summary.fixed.len(),
            self.config.build.output.display()
        );

        Ok(ExitCode::SUCCESS)
    }

    pub fn bump_version(&self, plugin: &str, version: &str) -> Result<ExitCode> {
        let report = bump_version(&self.root, &self.config.plugin_layout(), plugin, version)?;

        println!(
            "Updated {}: {:?} -> {:?}",
            self.rel(&report.plugin.path).display(),
            report.plugin.old.as_deref().unwrap_or(""),
            report.plugin.new
        );
        match &report.marketplace {
            Some(change) => println!(
                "Updated marketplace entry for {}: {:?} -> {:?}",
                plugin,
                change.old.as_deref().unwrap_or(""),
                change.new
            ),
            None => eprintln!(
                "Warning: no plugin named {:?} in {}",
                plugin,
                self.config.workspace.marketplace.display()
            ),
        }

        Ok(ExitCode::SUCCESS)
    }

    pub fn check_plugins(&self) -> Result<ExitCode> {
        let findings = check_marketplace(&self.root, &self.config.plugin_layout())?;
        Ok(self.report_findings(&findings))
    }

    pub fn list_skills(&self) -> Result<ExitCode> {
        println!("{}", self.registry().generate_skills_list());
        Ok(ExitCode::SUCCESS)
    }

    pub fn show_skill(&self, name: &str) -> Result<ExitCode> {
        let mut registry = self.registry();
        let skill = registry.load_skill(name)?;
        print!("{}", skill.content.as_deref().unwrap_or_default());
        Ok(ExitCode::SUCCESS)
    }

    pub fn show_config(&self) -> Result<ExitCode> {
        print!("{}", self.config.to_toml()?);
        Ok(ExitCode::SUCCESS)
    }

    /// Print findings with root-relative paths and a summary line
    fn report_findings(&self, findings: &[Finding]) -> ExitCode {
        for finding in findings {
            let display = Finding {
                path: self.rel(&finding.path).to_path_buf(),
                ..finding.clone()
            };
            println!("{display}");
        }

        let errors = findings
            .iter()
            .filter(|f| f.severity == Severity::Error)
            .count();
        let warnings = findings.len() - errors;
        if findings.is_empty() {
            println!("No problems found.");
        } else {
            println!("\n{errors} error(s), {warnings} warning(s)");
        }

        exit_code(has_errors(findings))
    }
}

fn exit_code(failed: bool) -> ExitCode {
    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
