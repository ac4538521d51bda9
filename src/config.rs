//! Site configuration module.
//!
//! Handles loading, validating, and merging configuration. Three layers are
//! merged, later layers overriding earlier ones key by key:
//!
//! ```text
//! stock defaults                 ← built into the binary
//! src/template/config.toml       ← shipped by the installed template
//! genysite.toml                  ← project config (project root)
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! dist = "docs"          # Output directory, relative to the project root
//! homepage = ""          # Base URL ("https://example.org/site") or path ("/site")
//! index = "index"        # Page (path without extension) served at the site root
//! react = false          # true = client-rendered app instead of static HTML
//! priority = ["index", "guide"]   # Sibling ordering, highest priority first
//! index_html = "template/index.html"  # Custom app shell (client app, relative to src/)
//! App = "app/App.js"     # Custom routing shell (client app, relative to project root)
//!
//! [names]                # Display names keyed by page path without extension
//! index = "Home"
//! "guide/intro" = "Introduction"
//!
//! [data]                 # Arbitrary values available in every template
//! title = "My Site"
//!
//! [bundler]              # Client app bundler command, run inside the staging dir
//! command = "npx"
//! args = ["--yes", "esbuild", "app_index.js", "--bundle", "--outfile={dist}/bundle.js"]
//! output = "bundle.js"
//! ```
//!
//! Unknown top-level keys are rejected to catch typos early; `data` and
//! `names` accept anything.

use crate::naming;
use crate::types::Strategy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path};
use thiserror::Error;

/// Project config file name, looked up in the project root.
pub const CONFIG_FILE: &str = "genysite.toml";

/// Template config file name, looked up in `src/template`.
pub const TEMPLATE_CONFIG_FILE: &str = "config.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration.
///
/// All fields have defaults. Config files need only specify the values they
/// want to override.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Output directory, relative to the project root.
    pub dist: String,
    /// Base URL or base path that `link` and `assets` resolve against.
    pub homepage: String,
    /// Sibling ordering, highest priority first. Unset means lexical order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Vec<String>>,
    /// Display name overrides keyed by page path without extension.
    pub names: BTreeMap<String, String>,
    /// Page key (path without extension) whose output collapses to the root.
    pub index: String,
    /// Build a client-rendered app instead of static HTML pages.
    pub react: bool,
    /// User values merged into every template context.
    pub data: toml::Table,
    /// Custom `index.html` shell template for the client app, relative to `src/`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_html: Option<String>,
    /// Custom routing shell for the client app, relative to the project root.
    #[serde(rename = "App", alias = "app", skip_serializing_if = "Option::is_none")]
    pub app: Option<String>,
    /// External bundler used by the client app strategy.
    pub bundler: BundlerConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            dist: "docs".to_string(),
            homepage: String::new(),
            priority: None,
            names: BTreeMap::new(),
            index: "index".to_string(),
            react: false,
            data: toml::Table::new(),
            index_html: None,
            app: None,
            bundler: BundlerConfig::default(),
        }
    }
}

impl SiteConfig {
    pub fn strategy(&self) -> Strategy {
        Strategy::from_flag(self.react)
    }

    /// Priority list, empty when none is configured.
    pub fn priority(&self) -> &[String] {
        self.priority.as_deref().unwrap_or(&[])
    }

    /// Display name overrides with their keys normalized, so `"/guide/"`
    /// and `"guide"` address the same entry.
    pub fn display_names(&self) -> BTreeMap<String, &str> {
        self.names
            .iter()
            .map(|(key, name)| (naming::normalize_key(key), name.as_str()))
            .collect()
    }

    /// Validate config values are usable for a build.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let dist = Path::new(&self.dist);
        let mut normal = dist.components().filter(|c| !matches!(c, Component::CurDir));
        match normal.next() {
            None => {
                return Err(ConfigError::Validation(
                    "dist must name a directory inside the project".into(),
                ));
            }
            Some(Component::Normal(first)) if first == "src" => {
                return Err(ConfigError::Validation(
                    "dist must not point into the src directory".into(),
                ));
            }
            Some(_) => {}
        }
        if dist
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_)))
        {
            return Err(ConfigError::Validation(
                "dist must be a relative path inside the project".into(),
            ));
        }
        if self.index.trim_matches('/').is_empty() {
            return Err(ConfigError::Validation("index must not be empty".into()));
        }
        if self.bundler.command.trim().is_empty() {
            return Err(ConfigError::Validation(
                "bundler.command must not be empty".into(),
            ));
        }
        if self.bundler.output.trim().is_empty() {
            return Err(ConfigError::Validation(
                "bundler.output must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// External bundler invocation for the client app strategy.
///
/// Runs with the staging directory as its working directory. `{staging}` and
/// `{dist}` in arguments are replaced with absolute paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BundlerConfig {
    /// Program to run.
    pub command: String,
    /// Arguments, with `{staging}` / `{dist}` placeholders.
    pub args: Vec<String>,
    /// Bundle file name inside `dist`, referenced by the app shell.
    pub output: String,
}

impl Default for BundlerConfig {
    fn default() -> Self {
        Self {
            command: "npx".to_string(),
            args: [
                "--yes",
                "esbuild",
                "app_index.js",
                "--bundle",
                "--minify",
                "--loader:.js=jsx",
                "--jsx=automatic",
                "--outfile={dist}/bundle.js",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            output: "bundle.js".to_string(),
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer that template and project configs are merged onto.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
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

/// Load a TOML file as a raw value.
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

/// Rename a top-level `app` key to `App` so both spellings override each
/// other across layers. A layer carrying both is left alone and fails
/// deserialization as a duplicate field.
fn canonical_layer(layer: toml::Value) -> toml::Value {
    match layer {
        toml::Value::Table(mut table) if !table.contains_key("App") => {
            if let Some(app) = table.remove("app") {
                table.insert("App".to_string(), app);
            }
            toml::Value::Table(table)
        }
        other => other,
    }
}

/// Merge layers in order onto the stock defaults, then deserialize and validate.
pub fn resolve_config(layers: impl IntoIterator<Item = toml::Value>) -> Result<SiteConfig, ConfigError> {
    let merged = layers
        .into_iter()
        .map(canonical_layer)
        .fold(stock_defaults_value(), merge_toml);
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the merged configuration for a project.
///
/// `src/template/config.toml` (if any) is merged under `genysite.toml` (if
/// any); both are optional.
pub fn load_config(project_root: &Path) -> Result<SiteConfig, ConfigError> {
    let template_layer =
        load_raw_config(&project_root.join("src/template").join(TEMPLATE_CONFIG_FILE))?;
    let project_layer = load_raw_config(&project_root.join(CONFIG_FILE))?;
    if template_layer.is_some() {
        tracing::debug!("merging template config under project config");
    }
    resolve_config(template_layer.into_iter().chain(project_layer))
}

/// Returns a fully-commented stock `genysite.toml` with all keys explained.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# genysite configuration
# ======================
# All settings are optional. Values shown below are the defaults.
#
# A template installed in src/template may ship its own config.toml; this
# file is merged on top of it, key by key.

# Output directory, relative to the project root. Deleted and recreated on
# every build.
dist = "docs"

# Base that the `link` and `assets` template filters resolve against.
# Either an absolute URL ("https://example.org/site") or a path ("/site").
homepage = ""

# Page served at the site root, as its path under src/pages without extension.
index = "index"

# Build a client-rendered app (true) instead of one HTML file per page (false).
react = false

# Sibling ordering in the page tree, highest priority first. Entries not
# listed follow, alphabetically. Uncomment to enable.
# priority = ["index", "guide"]

# Custom index.html shell for the client app, relative to src/.
# index_html = "template/index.html"

# Custom routing shell for the client app, relative to the project root.
# App = "app/App.js"

# ---------------------------------------------------------------------------
# Display names, keyed by page path without extension
# ---------------------------------------------------------------------------
[names]
# index = "Home"
# "guide/intro" = "Introduction"

# ---------------------------------------------------------------------------
# Values available in every template
# ---------------------------------------------------------------------------
[data]
# title = "My Site"

# ---------------------------------------------------------------------------
# Client app bundler, run inside the staging directory.
# {staging} and {dist} are replaced with absolute paths.
# ---------------------------------------------------------------------------
[bundler]
command = "npx"
args = ["--yes", "esbuild", "app_index.js", "--bundle", "--minify", "--loader:.js=jsx", "--jsx=automatic", "--outfile={dist}/bundle.js"]
output = "bundle.js"
"##
}
