//! Refactoring settings.
//!
//! Settings come from several places, merged in this order (later wins):
//!
//!   1. Built-in defaults.
//!   2. The `autoload.psr-4` section of `composer.json`.
//!   3. The user config file (`<config dir>/phpsync/config.toml`).
//!   4. The project config file (`<workspace>/.phpsync.toml`).
//!   5. LSP `initializationOptions`.
//!   6. LSP `workspace/configuration` for the `phpRefactor` section.
//!
//! Nothing is cached: callers resolve a fresh [`RefactorConfig`] every time
//! they need one.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// The client-side settings section.
pub const CONFIG_SECTION: &str = "phpRefactor";

/// Project-level config file name, looked up in the workspace root.
pub const PROJECT_CONFIG_FILE: &str = ".phpsync.toml";

/// Effective settings for one decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefactorConfig {
    /// Skip confirmation prompts.
    pub auto_update: bool,
    /// Rewrite namespaces when a file changes directory.
    pub update_namespaces: bool,
    /// Show a summary after each refactor.
    pub show_notifications: bool,
    /// Append `Controller`, `Request`, ... suffixes in framework directories.
    pub enable_framework_conventions: bool,
    pub root_namespace: String,
    /// Directory name that maps onto `root_namespace`.
    pub source_directory: String,
}

impl Default for RefactorConfig {
    fn default() -> Self {
        Self {
            auto_update: false,
            update_namespaces: true,
            show_notifications: true,
            enable_framework_conventions: true,
            root_namespace: "App".to_string(),
            source_directory: "app".to_string(),
        }
    }
}

/// A partial set of settings from one source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfigLayer {
    pub auto_update: Option<bool>,
    pub update_namespaces: Option<bool>,
    pub show_notifications: Option<bool>,
    #[serde(alias = "enableLaravelConventions")]
    pub enable_framework_conventions: Option<bool>,
    pub root_namespace: Option<String>,
    #[serde(alias = "srcDirectory")]
    pub source_directory: Option<String>,
}

impl ConfigLayer {
    /// Parse a JSON settings object. Accepts both a bare object and one
    /// nested under the `phpRefactor` key. `null` yields an empty layer.
    pub fn from_json(value: &serde_json::Value) -> Option<ConfigLayer> {
        if value.is_null() {
            return Some(ConfigLayer::default());
        }
        let section = value.get(CONFIG_SECTION).unwrap_or(value);
        match serde_json::from_value(section.clone()) {
            Ok(layer) => Some(layer),
            Err(err) => {
                tracing::warn!("ignoring malformed {CONFIG_SECTION} settings: {err}");
                None
            }
        }
    }

    /// Read a TOML config file. Missing or malformed files yield `None`.
    pub fn from_toml_file(path: &Path) -> Option<ConfigLayer> {
        let content = std::fs::read_to_string(path).ok()?;
        match toml::from_str(&content) {
            Ok(layer) => Some(layer),
            Err(err) => {
                tracing::warn!("ignoring malformed config file {}: {err}", path.display());
                None
            }
        }
    }
}

impl RefactorConfig {
    /// Merge `layers` over the defaults, in order.
    pub fn from_layers<'a, I>(layers: I) -> Self
    where
        I: IntoIterator<Item = &'a ConfigLayer>,
    {
        let mut config = RefactorConfig::default();
        for layer in layers {
            config.apply(layer);
        }
        config
    }

    fn apply(&mut self, layer: &ConfigLayer) {
        if let Some(v) = layer.auto_update {
            self.auto_update = v;
        }
        if let Some(v) = layer.update_namespaces {
            self.update_namespaces = v;
        }
        if let Some(v) = layer.show_notifications {
            self.show_notifications = v;
        }
        if let Some(v) = layer.enable_framework_conventions {
            self.enable_framework_conventions = v;
        }
        if let Some(v) = &layer.root_namespace {
            self.root_namespace = v.clone();
        }
        if let Some(v) = &layer.source_directory {
            self.source_directory = v.clone();
        }
    }
}

/// Location of the per-user config file, if a home directory is known.
pub fn user_config_path() -> Option<PathBuf> {
    use etcetera::BaseStrategy;

    let strategy = etcetera::choose_base_strategy().ok()?;
    Some(strategy.config_dir().join("phpsync").join("config.toml"))
}

/// The file-based layers for a workspace: composer, user file, project file.
pub fn file_layers(workspace_root: Option<&Path>) -> Vec<ConfigLayer> {
    let mut layers = Vec::new();

    if let Some(root) = workspace_root
        && let Some(layer) = crate::composer::source_root_layer(root)
    {
        layers.push(layer);
    }

    if let Some(layer) = user_config_path().and_then(|p| ConfigLayer::from_toml_file(&p)) {
        layers.push(layer);
    }

    if let Some(root) = workspace_root
        && let Some(layer) = ConfigLayer::from_toml_file(&root.join(PROJECT_CONFIG_FILE))
    {
        layers.push(layer);
    }

    layers
}
