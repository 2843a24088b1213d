//! Plugin and marketplace manifest types and file access

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{PluginError, Result};

/// Where manifests live, relative to the repository root
#[derive(Debug, Clone)]
pub struct PluginLayout {
    /// Directory holding one folder per plugin
    pub plugins_dir: PathBuf,
    /// Marketplace catalog
    pub marketplace: PathBuf,
    /// Plugin manifest, relative to a plugin folder
    pub manifest: PathBuf,
}

impl Default for PluginLayout {
    fn default() -> Self {
        Self {
            plugins_dir: PathBuf::from("plugins"),
            marketplace: PathBuf::from(".claude-plugin/marketplace.json"),
            manifest: PathBuf::from(".claude-plugin/plugin.json"),
        }
    }
}

impl PluginLayout {
    /// Manifest path of a plugin under the plugins directory
    #[must_use]
    pub fn plugin_manifest(&self, root: &Path, name: &str) -> PathBuf {
        root.join(&self.plugins_dir).join(name).join(&self.manifest)
    }

    /// Marketplace path
    #[must_use]
    pub fn marketplace_path(&self, root: &Path) -> PathBuf {
        root.join(&self.marketplace)
    }
}

/// `plugin.json`
#[derive(Debug, Clone, Deserialize)]
pub struct PluginManifest {
    /// Plugin name
    pub name: String,
    /// One-line description
    #[serde(default)]
    pub description: Option<String>,
    /// Semantic version
    #[serde(default)]
    pub version: Option<String>,
    /// License identifier
    #[serde(default)]
    pub license: Option<String>,
    /// Search keywords
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// `marketplace.json`
#[derive(Debug, Clone, Deserialize)]
pub struct Marketplace {
    /// Catalog name
    #[serde(default)]
    pub name: Option<String>,
    /// Listed plugins
    #[serde(default)]
    pub plugins: Vec<MarketplaceEntry>,
}

/// One plugin listed in the marketplace
#[derive(Debug, Clone, Deserialize)]
pub struct MarketplaceEntry {
    /// Plugin name
    pub name: String,
    /// Where the plugin lives: a repo-relative path or a remote descriptor
    #[serde(default)]
    pub source: Option<Value>,
    /// Listed version
    #[serde(default)]
    pub version: Option<String>,
    /// One-line description
    #[serde(default)]
    pub description: Option<String>,
}

impl MarketplaceEntry {
    /// Repo-relative source directory, when `source` is a local path
    #[must_use]
    pub fn local_source(&self) -> Option<PathBuf> {
        let source = self.source.as_ref()?.as_str()?;
        let trimmed = source.strip_prefix("./").unwrap_or(source);
        Some(PathBuf::from(trimmed))
    }
}

/// Read a file as an untyped JSON document
pub fn read_json(path: &Path) -> Result<Value> {
    if !path.exists() {
        return Err(PluginError::NotFound(path.to_path_buf()));
    }
    let content = fs::read_to_string(path).map_err(|source| PluginError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| PluginError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Read a file into a typed manifest
pub fn read_typed<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let value = read_json(path)?;
    serde_json::from_value(value).map_err(|source| PluginError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Render a JSON document with 2-space indentation and a trailing newline
///
/// Key order is preserved as read. `path` only labels errors.
pub fn render_json(path: &Path, value: &Value) -> Result<String> {
    let mut content = serde_json::to_string_pretty(value).map_err(|source| PluginError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    content.push('\n');
    Ok(content)
}

/// Write already rendered content
pub fn write_file(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content).map_err(|source| PluginError::Io {
        path: path.to_path_buf(),
        source,
    })
}
