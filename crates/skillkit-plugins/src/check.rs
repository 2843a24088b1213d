//! Consistency check between the marketplace catalog and plugin folders

use skillkit_types::Finding;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::Result;
use crate::manifest::{read_typed, Marketplace, MarketplaceEntry, PluginLayout, PluginManifest};

/// Repo-relative plugin directory an entry points at; `None` for remote sources
fn plugin_dir(entry: &MarketplaceEntry, layout: &PluginLayout) -> Option<PathBuf> {
    match entry.local_source() {
        Some(source) => Some(source),
        None if entry.source.is_some() => None,
        None => Some(layout.plugins_dir.join(&entry.name)),
    }
}

/// Check every marketplace entry against the plugin it points to
///
/// Findings carry repo-relative paths. Only an unreadable marketplace is an
/// `Err`; everything else is reported as a finding.
pub fn check_marketplace(root: &Path, layout: &PluginLayout) -> Result<Vec<Finding>> {
    let marketplace_path = layout.marketplace_path(root);
    let marketplace: Marketplace = read_typed(&marketplace_path)?;
    let marketplace_rel = layout.marketplace.as_path();

    let mut findings = Vec::new();
    let mut seen = HashSet::new();

    for entry in &marketplace.plugins {
        if !seen.insert(entry.name.as_str()) {
            findings.push(Finding::error(
                marketplace_rel,
                "PLUGIN_DUPLICATE",
                format!("plugin '{}' is listed more than once", entry.name),
            ));
            continue;
        }

        let Some(plugin_dir) = plugin_dir(entry, layout) else {
            debug!("Plugin '{}' has a remote source, skipping", entry.name);
            continue;
        };
        if !root.join(&plugin_dir).is_dir() {
            findings.push(Finding::error(
                marketplace_rel,
                "PLUGIN_SOURCE_MISSING",
                format!(
                    "plugin '{}' source {} does not exist",
                    entry.name,
                    plugin_dir.display()
                ),
            ));
            continue;
        }

        let manifest_rel = plugin_dir.join(&layout.manifest);
        let manifest: PluginManifest = match read_typed(&root.join(&manifest_rel)) {
            Ok(manifest) => manifest,
            Err(e) => {
                findings.push(Finding::error(
                    &manifest_rel,
                    "PLUGIN_MANIFEST_MISSING",
                    format!("plugin '{}': {e}", entry.name),
                ));
                continue;
            }
        };

        if manifest.name != entry.name {
            findings.push(Finding::error(
                &manifest_rel,
                "PLUGIN_NAME_MISMATCH",
                format!(
                    "manifest name '{}' differs from marketplace name '{}'",
                    manifest.name, entry.name
                ),
            ));
        }

        if manifest.version != entry.version {
            findings.push(Finding::error(
                &manifest_rel,
                "PLUGIN_VERSION_MISMATCH",
                format!(
                    "plugin '{}' is {} but the marketplace lists {}",
                    entry.name,
                    manifest.version.as_deref().unwrap_or("unversioned"),
                    entry.version.as_deref().unwrap_or("no version")
                ),
            ));
        }
    }

    let listed: HashSet<PathBuf> = marketplace
        .plugins
        .iter()
        .filter_map(|entry| plugin_dir(entry, layout))
        .collect();
    if let Ok(dirs) = fs::read_dir(root.join(&layout.plugins_dir)) {
        let mut unlisted: Vec<String> = dirs
            .filter_map(std::result::Result::ok)
            .filter(|entry| entry.path().join(&layout.manifest).is_file())
            .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
            .filter(|name| !listed.contains(&layout.plugins_dir.join(name)))
            .collect();
        unlisted.sort();
        for name in unlisted {
            findings.push(Finding::warning(
                layout.plugins_dir.join(&name),
                "PLUGIN_UNLISTED",
                format!("plugin directory '{name}' is not listed in the marketplace"),
            ));
        }
    }

    Ok(findings)
}
