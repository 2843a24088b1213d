//! SkillKit - maintenance CLI for skill repositories
//!
//! ## Commands
//!
//! - `build`: compile each skill's rule files into AGENTS.md
//! - `lint`: validate manifests, section indexes, rule frontmatter and code fences
//! - `audit-quotes`: check (or `--fix`) typographic quotes in markdown prose
//! - `bump-version`: set a plugin's version in plugin.json and marketplace.json
//! - `plugins check`: compare the marketplace catalog with plugin folders
//! - `skills list|show`: discovered skills
//! - `config show`: effective configuration

mod commands;
mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use commands::App;
use config::Config;

#[derive(Parser)]
#[command(name = "skillkit")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Build, lint and audit markdown skill repositories", long_about = None)]
struct Cli {
    /// Repository root (default: workspace.root from config)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Configuration file (default: ./skillkit.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile rules/*.md into AGENTS.md for each skill
    Build {
        /// Skill directory to build (repeatable; default: all discovered skills)
        #[arg(long = "skill")]
        skills: Vec<PathBuf>,

        /// Fail instead of writing when AGENTS.md is out of date
        #[arg(long)]
        check: bool,
    },

    /// Validate skill manifests, section indexes and rule files
    Lint {
        /// Skill directory to lint (repeatable; default: all discovered skills)
        #[arg(long = "skill")]
        skills: Vec<PathBuf>,
    },

    /// Audit markdown files for typographic quotes in prose
    AuditQuotes {
        /// Rewrite straight quotes in prose instead of reporting
        #[arg(long)]
        fix: bool,
    },

    /// Set a plugin's version in plugin.json and marketplace.json
    BumpVersion {
        /// Plugin name (folder under the plugins directory)
        plugin: String,

        /// New version, e.g. 1.1.0
        version: String,
    },

    /// Plugin marketplace maintenance
    Plugins {
        #[command(subcommand)]
        action: PluginsAction,
    },

    /// Discovered skills
    Skills {
        #[command(subcommand)]
        action: SkillsAction,
    },

    /// Configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum PluginsAction {
    /// Compare marketplace.json with plugin folders
    Check,
}

#[derive(Subcommand)]
enum SkillsAction {
    /// List discovered skills
    List,
    /// Print a skill's SKILL.md
    Show {
        /// Skill name
        name: String,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config.as_deref())?;

    let level = if cli.verbose {
        "debug"
    } else {
        config.logging.level.as_str()
    };
    skillkit_logging::init_logging(level, cli.json || config.logging.json)?;

    let app = App::new(config, cli.root.as_deref());

    match cli.command {
        Commands::Build { skills, check } => app.build(&skills, check),
        Commands::Lint { skills } => app.lint(&skills),
        Commands::AuditQuotes { fix } => {
            if fix {
                app.fix_quotes()
            } else {
                app.audit_quotes()
            }
        }
        Commands::BumpVersion { plugin, version } => app.bump_version(&plugin, &version),
        Commands::Plugins {
            action: PluginsAction::Check,
        } => app.check_plugins(),
        Commands::Skills { action } => match action {
            SkillsAction::List => app.list_skills(),
            SkillsAction::Show { name } => app.show_skill(&name),
        },
        Commands::Config {
            action: ConfigAction::Show,
        } => app.show_config(),
    }
}
