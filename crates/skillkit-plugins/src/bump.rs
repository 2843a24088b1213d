//! Bump a plugin's version in `plugin.json` and `marketplace.json`

use regex::Regex;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::{PluginError, Result};
use crate::manifest::{read_json, render_json, write_file, PluginLayout};

/// A version rewrite in one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionChange {
    /// Rewritten file
    pub path: PathBuf,
    /// Previous value, if any
    pub old: Option<String>,
    /// New value
    pub new: String,
}

/// What a bump changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BumpReport {
    /// Plugin manifest change
    pub plugin: VersionChange,
    /// Marketplace entry change; `None` when the marketplace does not list the plugin
    pub marketplace: Option<VersionChange>,
}

/// Validate `MAJOR.MINOR.PATCH[-PRERELEASE]`
pub fn validate_version(version: &str) -> Result<()> {
    let version_re = Regex::new(r"^\d+\.\d+\.\d+(?:-[0-9A-Za-z.-]+)?$")
        .map_err(|e| PluginError::InvalidVersion(format!("{version} ({e})")))?;
    if version_re.is_match(version) {
        Ok(())
    } else {
        Err(PluginError::InvalidVersion(version.to_string()))
    }
}

fn validate_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name != "."
        && name != ".."
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if valid {
        Ok(())
    } else {
        Err(PluginError::InvalidName(name.to_string()))
    }
}

/// Set `name`'s version to `version` in both manifests
///
/// Both files are read, validated and rendered before either is written.
pub fn bump_version(
    root: &Path,
    layout: &PluginLayout,
    name: &str,
    version: &str,
) -> Result<BumpReport> {
    let version = version.trim();
    validate_name(name)?;
    validate_version(version)?;

    let plugin_path = layout.plugin_manifest(root, name);
    let marketplace_path = layout.marketplace_path(root);

    let mut plugin = read_json(&plugin_path)?;
    let mut marketplace = read_json(&marketplace_path)?;

    let plugin_obj = plugin
        .as_object_mut()
        .ok_or_else(|| PluginError::InvalidManifest {
            path: plugin_path.clone(),
            reason: "top level is not an object".into(),
        })?;
    let old = plugin_obj
        .insert("version".into(), Value::String(version.to_string()))
        .and_then(|v| v.as_str().map(str::to_string));

    let entries = match marketplace.get_mut("plugins") {
        None => None,
        Some(Value::Array(entries)) => Some(entries),
        Some(_) => {
            return Err(PluginError::InvalidManifest {
                path: marketplace_path,
                reason: "\"plugins\" is not an array".into(),
            });
        }
    };

    let marketplace_old = entries.and_then(|entries| {
        entries
            .iter_mut()
            .filter_map(Value::as_object_mut)
            .find(|entry| entry.get("name").and_then(Value::as_str) == Some(name))
            .map(|entry| {
                entry
                    .insert("version".into(), Value::String(version.to_string()))
                    .and_then(|v| v.as_str().map(str::to_string))
            })
    });

    let plugin_content = render_json(&plugin_path, &plugin)?;
    let marketplace_content = match marketplace_old {
        Some(_) => Some(render_json(&marketplace_path, &marketplace)?),
        None => None,
    };

    write_file(&plugin_path, &plugin_content)?;
    if let Some(content) = &marketplace_content {
        write_file(&marketplace_path, content)?;
    }
    info!(
        "Updated {}: {:?} -> {:?}",
        plugin_path.display(),
        old.as_deref().unwrap_or(""),
        version
    );

    let marketplace_change = match marketplace_old {
        Some(previous) => {
            info!(
                "Updated marketplace entry for {}: {:?} -> {:?}",
                name,
                previous.as_deref().unwrap_or(""),
                version
            );
            Some(VersionChange {
                path: marketplace_path.clone(),
                old: previous,
                new: version.to_string(),
            })
        }
        None => {
            warn!("No plugin named {:?} in {}", name, marketplace_path.display());
            None
        }
    };

    Ok(BumpReport {
        plugin: VersionChange {
            path: plugin_path,
            old,
            new: version.to_string(),
        },
        marketplace: marketplace_change,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_version() {
        assert!(validate_version("1.1.0").is_ok());
        assert!(validate_version("2.0.0-beta.1").is_ok());
        assert!(validate_version("1.1").is_err());
        assert!(validate_version("v1.0.0").is_err());
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("frontend-general").is_ok());
        assert!(validate_name("..").is_err());
        assert!(validate_name("a/b").is_err());
        assert!(validate_name("").is_err());
    }
}
