//! Configuration.
//!
//! Handles loading, validating, and merging `tilde-wiki.toml` config files.
//! Stock defaults describe a single shared wiki on a tilde server. Two files
//! are layered on top, each only naming the keys it wants to change:
//!
//! ```text
//! stock defaults
//!   └── /etc/tilde-wiki.toml      server admin: site name, shared paths
//!         └── ./tilde-wiki.toml   user (or --config): preview paths, taste
//! ```
//!
//! Tables are merged key by key, so a user file setting only
//! `paths.preview` keeps the admin's `paths.publish`.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [site]
//! name = "tilde.town"               # Root domain of the wiki
//!
//! [paths]
//! publish = "/var/www/tilde.town/wiki"   # Where `publish` compiles to
//! preview = "~/public_html/wiki"         # Where `preview` compiles to
//! repository = "/wiki"                   # Shared wiki repository
//! local_repository = "~/wiki"            # Your clone of the repository
//!
//! [compile]
//! unknown_extensions = "passthrough"     # or "reject"
//! toc_order = "sorted"                   # or "traversal"
//! toc_title = "table of contents"
//! ```
//!
//! A leading `~` in any path is expanded to the current user's home.
//!
//! Unknown keys are rejected to catch typos early.

use crate::source::ExtensionPolicy;
use crate::toc::TocOrder;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "tilde-wiki.toml";

/// Server-wide config, layered under the user's file.
pub const SYSTEM_CONFIG_FILE: &str = "/etc/tilde-wiki.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WikiConfig {
    pub site: SiteConfig,
    pub paths: PathsConfig,
    pub compile: CompileConfig,
}

impl WikiConfig {
    /// Validate config values are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.site.name.trim().is_empty() {
            return Err(ConfigError::Validation("site.name must not be empty".into()));
        }
        let paths = [
            ("paths.publish", &self.paths.publish),
            ("paths.preview", &self.paths.preview),
            ("paths.repository", &self.paths.repository),
            ("paths.local_repository", &self.paths.local_repository),
        ];
        for (key, value) in paths {
            if value.trim().is_empty() {
                return Err(ConfigError::Validation(format!("{key} must not be empty")));
            }
        }
        if self.compile.toc_title.trim().is_empty() {
            return Err(ConfigError::Validation(
                "compile.toc_title must not be empty".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Root domain of the wiki.
    pub name: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: "tilde.town".to_string(),
        }
    }
}

/// Filesystem locations, stored as written and expanded on access.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    pub publish: String,
    pub preview: String,
    pub repository: String,
    pub local_repository: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            publish: "/var/www/tilde.town/wiki".to_string(),
            preview: "~/public_html/wiki".to_string(),
            repository: "/wiki".to_string(),
            local_repository: "~/wiki".to_string(),
        }
    }
}

impl PathsConfig {
    pub fn publish_dir(&self) -> PathBuf {
        expand(&self.publish)
    }

    pub fn preview_dir(&self) -> PathBuf {
        expand(&self.preview)
    }

    pub fn repository_dir(&self) -> PathBuf {
        expand(&self.repository)
    }

    pub fn local_repository_dir(&self) -> PathBuf {
        expand(&self.local_repository)
    }
}

fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}

/// Settings handed to the compiler.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompileConfig {
    /// What to do with article files that are neither `.md` nor `.txt`.
    pub unknown_extensions: ExtensionPolicy,
    /// Order of the table of contents.
    pub toc_order: TocOrder,
    /// Title of the table of contents page.
    pub toc_title: String,
}

impl Default for CompileConfig {
    fn default() -> Self {
        Self {
            unknown_extensions: ExtensionPolicy::default(),
            toc_order: TocOrder::default(),
            toc_title: "table of contents".to_string(),
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged on top of.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(WikiConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge each existing file in `layers` over the stock defaults, in order,
/// then deserialize and validate. Absent files are skipped.
pub fn load_layered_config(layers: &[&Path]) -> Result<WikiConfig, ConfigError> {
    let mut merged = stock_defaults_value();
    for layer in layers {
        if let Some(overlay) = load_raw_config(layer)? {
            merged = merge_toml(merged, overlay);
        }
    }
    let config: WikiConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the system config and then the user's file at `path`.
pub fn load_config(path: &Path) -> Result<WikiConfig, ConfigError> {
    load_layered_config(&[Path::new(SYSTEM_CONFIG_FILE), path])
}

/// Returns a fully-commented stock config file.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# tilde-wiki configuration
# ========================
#
# Every key is optional. Remove anything you do not want to change; the
# values below are the built-in defaults.

[site]
# Root domain of the wiki.
name = "tilde.town"

[paths]
# System level path the shared wiki is published to.
publish = "/var/www/tilde.town/wiki"

# Local path your wiki preview is compiled to.
preview = "~/public_html/wiki"

# Path to the shared wiki repository.
repository = "/wiki"

# Path to your clone of the wiki repository.
local_repository = "~/wiki"

[compile]
# What to do with article files that are neither .md nor .txt:
#   "passthrough" - copy their content into the page as raw HTML
#   "reject"      - fail unless the file is .html or .htm
unknown_extensions = "passthrough"

# Table of contents ordering:
#   "sorted"    - by directory, then by page path
#   "traversal" - in the order the article tree was walked
toc_order = "sorted"

# Title of the table of contents page.
toc_title = "table of contents"
"##
}
