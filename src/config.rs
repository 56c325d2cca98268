//! Site configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. The file lives in
//! the data root next to `categories.yaml` and is optional: stock defaults
//! apply when it is missing, and a present file only needs the keys it wants
//! to change.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [site]
//! title = "App Catalog"
//! description = "A curated catalog of apps"
//!
//! [paths]
//! categories = "categories.yaml"  # Relative to the data root
//! authors = "authors"
//! apps = "apps"
//! splash = "splash"
//!
//! [icons]
//! "github.com" = "fa-brands fa-github"
//! "gitlab.com" = "fa-brands fa-gitlab"
//! "home" = "fa-solid fa-home"
//! "homepage" = "fa-solid fa-home"
//! "*.itch.io" = "fa-brands fa-itch-io"
//! ```
//!
//! ## Icon Overrides
//!
//! `[icons]` is merged key by key onto the stock table, so a config file can
//! add a host without repeating the defaults. Setting an entry to `""`
//! removes it.
//!
//! Unknown keys are rejected to catch typos early.

use crate::icons::{self, IconResolver};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Site metadata shown in page titles and headers.
    pub site: SiteInfo,
    /// Input locations, relative to the data root.
    pub paths: PathsConfig,
    /// Link name / host → icon class. Merged onto the stock table.
    pub icons: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteInfo {
    pub title: String,
    pub description: String,
}

impl Default for SiteInfo {
    fn default() -> Self {
        Self {
            title: "App Catalog".to_string(),
            description: "A curated catalog of apps".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    /// Nested `group → slug → {name, icon?}` mapping.
    pub categories: String,
    /// One `<id>.yaml` per author.
    pub authors: String,
    /// One `<author>.<app>.yaml` per app.
    pub apps: String,
    /// Optional `<author>.<app>.png` splash images.
    pub splash: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            categories: "categories.yaml".to_string(),
            authors: "authors".to_string(),
            apps: "apps".to_string(),
            splash: "splash".to_string(),
        }
    }
}

/// Input paths resolved against a data root.
#[derive(Debug, Clone)]
pub struct DataPaths {
    pub categories: PathBuf,
    pub authors: PathBuf,
    pub apps: PathBuf,
    pub splash: PathBuf,
}

impl PathsConfig {
    pub fn resolve(&self, root: &Path) -> DataPaths {
        DataPaths {
            categories: root.join(&self.categories),
            authors: root.join(&self.authors),
            apps: root.join(&self.apps),
            splash: root.join(&self.splash),
        }
    }
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.site.title.trim().is_empty() {
            return Err(ConfigError::Validation(
                "site.title must not be empty".into(),
            ));
        }
        let paths = [
            ("paths.categories", &self.paths.categories),
            ("paths.authors", &self.paths.authors),
            ("paths.apps", &self.paths.apps),
            ("paths.splash", &self.paths.splash),
        ];
        for (key, value) in paths {
            if value.trim().is_empty() {
                return Err(ConfigError::Validation(format!("{key} must not be empty")));
            }
        }
        self.icon_resolver()?;
        Ok(())
    }

    /// The effective icon table: entries set to `""` are dropped.
    pub fn icon_table(&self) -> BTreeMap<String, String> {
        self.icons
            .iter()
            .filter(|(_, icon)| !icon.is_empty())
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub fn icon_resolver(&self) -> Result<IconResolver, ConfigError> {
        IconResolver::new(&self.icon_table())
            .map_err(|e| ConfigError::Validation(format!("icons: invalid host pattern: {e}")))
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Stock defaults as a `toml::Value::Table`, the base layer for merging.
///
/// The icon table is part of the stock layer (not `SiteConfig::default()`),
/// so a config deserialized on its own holds only the user's icon entries.
pub fn stock_defaults_value() -> toml::Value {
    let mut value =
        toml::Value::try_from(SiteConfig::default()).expect("default config must serialize");
    if let toml::Value::Table(table) = &mut value {
        let icons = icons::default_table()
            .into_iter()
            .map(|(k, v)| (k, toml::Value::String(v)))
            .collect();
        table.insert("icons".to_string(), toml::Value::Table(icons));
    }
    value
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

/// Load `config.toml` from the data root as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(root: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = root.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the data root, over stock defaults.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    resolve_config(stock_defaults_value(), load_raw_config(root)?)
}

/// Returns a fully-commented stock `config.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Catalog Configuration
# =====================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Site
# ---------------------------------------------------------------------------
[site]
# Shown in the header and in every page title.
title = "App Catalog"

# Shown under the title on the index page.
description = "A curated catalog of apps"

# ---------------------------------------------------------------------------
# Input paths (relative to the data directory)
# ---------------------------------------------------------------------------
[paths]
# Nested mapping: group slug -> category slug -> {name, icon}.
categories = "categories.yaml"

# One <author_id>.yaml file per author.
authors = "authors"

# One <author_id>.<app_id>.yaml file per app.
apps = "apps"

# Optional <author_id>.<app_id>.png splash images.
splash = "splash"

# ---------------------------------------------------------------------------
# Link icons
# ---------------------------------------------------------------------------
# Keys are link names ("home") or URL hosts ("github.com"). Hosts may use
# glob wildcards ("*.itch.io"). Entries here are merged onto the defaults;
# set an entry to "" to remove it.
[icons]
"github.com" = "fa-brands fa-github"
"gitlab.com" = "fa-brands fa-gitlab"
"home" = "fa-solid fa-home"
"homepage" = "fa-solid fa-home"
"*.itch.io" = "fa-brands fa-itch-io"
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_has_site_info() {
        let config = SiteConfig::default();
        assert_eq!(config.site.title, "App Catalog");
        assert_eq!(config.paths.categories, "categories.yaml");
        assert_eq!(config.paths.apps, "apps");
    }

    #[test]
    fn parse_partial_config() {
        let config: SiteConfig = toml::from_str("[site]\ntitle = \"Games\"\n").unwrap();
        assert_eq!(config.site.title, "Games");
        assert_eq!(config.site.description, "A curated catalog of apps");
        assert_eq!(config.paths.authors, "authors");
    }

    // =========================================================================
    // load_config tests
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();

        assert_eq!(config.site.title, "App Catalog");
        assert_eq!(config.icon_table(), icons::default_table());
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            r#"
[site]
title = "Firefly Apps"

[paths]
apps = "catalog/apps"
"#,
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.site.title, "Firefly Apps");
        assert_eq!(config.paths.apps, "catalog/apps");
        assert_eq!(config.paths.authors, "authors");
    }

    #[test]
    fn icons_merge_onto_defaults() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            r#"
[icons]
"codeberg.org" = "fa-solid fa-code"
"#,
        )
        .unwrap();

        let table = load_config(tmp.path()).unwrap().icon_table();
        assert_eq!(table["codeberg.org"], "fa-solid fa-code");
        assert_eq!(table["github.com"], "fa-brands fa-github");
    }

    #[test]
    fn empty_icon_removes_default() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            "[icons]\n\"homepage\" = \"\"\n",
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();
        assert!(!config.icon_table().contains_key("homepage"));
        assert!(config.icon_table().contains_key("home"));
    }

    #[test]
    fn icon_override_replaces_default() {
        let base = stock_defaults_value();
        let overlay: toml::Value = toml::from_str("[icons]\n\"home\" = \"fa-house\"\n").unwrap();
        let config = resolve_config(base, Some(overlay)).unwrap();
        assert_eq!(config.icon_table()["home"], "fa-house");
    }

    #[test]
    fn invalid_icon_pattern_rejected() {
        let base = stock_defaults_value();
        let overlay: toml::Value = toml::from_str("[icons]\n\"[bad\" = \"fa-x\"\n").unwrap();
        let result = resolve_config(base, Some(overlay));
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn paths_resolve_against_root() {
        let paths = PathsConfig::default().resolve(Path::new("/data"));
        assert_eq!(paths.categories, Path::new("/data/categories.yaml"));
        assert_eq!(paths.splash, Path::new("/data/splash"));
    }

    // =========================================================================
    // merge_toml tests
    // =========================================================================

    #[test]
    fn merge_toml_scalar_override() {
        let base: toml::Value = toml::from_str("a = 1").unwrap();
        let overlay: toml::Value = toml::from_str("a = 2").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["a"].as_integer(), Some(2));
    }

    #[test]
    fn merge_toml_preserves_base_keys() {
        let base: toml::Value = toml::from_str("[t]\na = 1\nb = 2").unwrap();
        let overlay: toml::Value = toml::from_str("[t]\nb = 3").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["t"]["a"].as_integer(), Some(1));
        assert_eq!(merged["t"]["b"].as_integer(), Some(3));
    }

    // =========================================================================
    // Validation tests
    // =========================================================================

    #[test]
    fn unknown_key_rejected() {
        let result: Result<SiteConfig, _> = toml::from_str("[site]\ntitel = \"x\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn unknown_section_rejected() {
        let result: Result<SiteConfig, _> = toml::from_str("[theme]\ncolor = \"red\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn unknown_key_rejected_via_load_config() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "[paths]\nimages = \"x\"\n").unwrap();
        assert!(matches!(
            load_config(tmp.path()),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn empty_title_rejected() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "[site]\ntitle = \" \"\n").unwrap();
        assert!(matches!(
            load_config(tmp.path()),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn empty_path_rejected() {
        let mut config = SiteConfig::default();
        config.paths.apps = String::new();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn validate_default_config_passes() {
        assert!(SiteConfig::default().validate().is_ok());
    }

    // =========================================================================
    // Stock config tests
    // =========================================================================

    #[test]
    fn stock_config_toml_is_valid_toml() {
        let _: toml::Value = toml::from_str(stock_config_toml()).unwrap();
    }

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let config: SiteConfig = toml::from_str(stock_config_toml()).unwrap();
        let defaults = resolve_config(stock_defaults_value(), None).unwrap();
        assert_eq!(config.site.title, defaults.site.title);
        assert_eq!(config.site.description, defaults.site.description);
        assert_eq!(config.paths.categories, defaults.paths.categories);
        assert_eq!(config.paths.splash, defaults.paths.splash);
        assert_eq!(config.icon_table(), defaults.icon_table());
    }
}
