use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use skillkit_plugins::PluginLayout;
use skillkit_quotes::QuoteAuditOptions;
use skillkit_rules::BuildOptions;

/// Built-in defaults, the lowest configuration layer
const DEFAULT_CONFIG: &str = r#"
[logging]
level = "warn"  # trace, debug, info, warn, error
json = false

[workspace]
root = "."
plugins_dir = "plugins"
marketplace = ".claude-plugin/marketplace.json"
plugin_manifest = ".claude-plugin/plugin.json"
skill_dirs = ["plugins"]
exclude = ["node_modules", ".git", "target"]

[build]
rules_dir = "rules"
output = "AGENTS.md"

[quotes]
intentional = ["**/docs-fancy-quotes.md", "**/frontend-general/**/AGENTS.md"]
avoid_examples = ["**/docs-fancy-quotes.md"]
max_prose_reports = 20
max_code_reports = 10
"#;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct WorkspaceConfig {
    pub root: PathBuf,
    pub plugins_dir: PathBuf,
    pub marketplace: PathBuf,
    pub plugin_manifest: PathBuf,
    /// Directories searched for skills, relative to the root
    pub skill_dirs: Vec<PathBuf>,
    /// Directory names never walked into
    pub exclude: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BuildConfig {
    pub rules_dir: PathBuf,
    pub output: PathBuf,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct QuotesConfig {
    pub intentional: Vec<String>,
    pub avoid_examples: Vec<String>,
    pub max_prose_reports: usize,
    pub max_code_reports: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    pub logging: LoggingConfig,
    pub workspace: WorkspaceConfig,
    pub build: BuildConfig,
    pub quotes: QuotesConfig,
}

impl Config {
    /// Get the global config path: ~/.skillkit/skillkit.toml
    fn global_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".skillkit").join("skillkit.toml"))
    }

    /// Load configuration with layered approach:
    /// 1. Built-in defaults
    /// 2. Global config: ~/.skillkit/skillkit.toml (optional)
    /// 3. Explicit `--config` file, else ./skillkit.toml (optional)
    /// 4. Environment variables (SKILLKIT__SECTION__KEY)
    /// 5. SKILLKIT_LOG convenience override for the log level
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        // Load .env file from current directory
        dotenvy::dotenv().ok();

        let mut config_builder = config::Config::builder().add_source(config::File::from_str(
            DEFAULT_CONFIG,
            config::FileFormat::Toml,
        ));

        if let Some(global) = Self::global_config_path() {
            config_builder = config_builder.add_source(config::File::from(global).required(false));
        }

        config_builder = match explicit {
            Some(path) => config_builder.add_source(config::File::from(path).required(true)),
            None => config_builder.add_source(config::File::with_name("skillkit").required(false)),
        };

        config_builder = config_builder
            .add_source(config::Environment::with_prefix("SKILLKIT").separator("__"));

        if let Ok(level) = env::var("SKILLKIT_LOG") {
            config_builder = config_builder.set_override("logging.level", level)?;
        }

        let config = config_builder
            .build()
            .context("Failed to load configuration")?;

        let config: Self = config
            .try_deserialize()
            .context("Invalid configuration")?;
        Ok(config)
    }

    /// Repository root: `--root` if given, else the configured one
    pub fn root(&self, override_root: Option<&Path>) -> PathBuf {
        override_root
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.workspace.root.clone())
    }

    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            rules_dir: self.build.rules_dir.clone(),
            output: self.build.output.clone(),
        }
    }

    pub fn quote_options(&self) -> QuoteAuditOptions {
        QuoteAuditOptions {
            exclude: self.workspace.exclude.clone(),
            intentional: self.quotes.intentional.clone(),
            avoid_examples: self.quotes.avoid_examples.clone(),
            max_prose_reports: self.quotes.max_prose_reports,
            max_code_reports: self.quotes.max_code_reports,
        }
    }

    pub fn plugin_layout(&self) -> PluginLayout {
        PluginLayout {
            plugins_dir: self.workspace.plugins_dir.clone(),
            marketplace: self.workspace.marketplace.clone(),
            manifest: self.workspace.plugin_manifest.clone(),
        }
    }

    /// Effective configuration as TOML
    pub fn to_toml(&self) -> anyhow::Result<String> {
        toml::to_string_pretty(self).context("Failed to render configuration")
    }
}
