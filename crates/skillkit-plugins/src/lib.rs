//! `SkillKit` plugin manifests
//!
//! Skills ship as plugins: each plugin folder carries a `plugin.json`, and a
//! repository-level `marketplace.json` catalogs them. This crate keeps the
//! two in step.
//!
//! ## Features
//!
//! - Version bump across `plugin.json` and the marketplace entry
//! - Key order and unknown fields preserved on rewrite
//! - Consistency check: missing sources, version drift, unlisted plugins

#![deny(unsafe_code, missing_docs)]

pub mod bump;
pub mod check;
pub mod error;
pub mod manifest;

pub use bump::{bump_version, BumpReport, VersionChange};
pub use check::check_marketplace;
pub use error::PluginError;
pub use manifest::{Marketplace, MarketplaceEntry, PluginLayout, PluginManifest};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{bump_version, check_marketplace, PluginError, PluginLayout};
}
