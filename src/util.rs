/// Utility functions for the PHPSync server.
///
/// This module contains helper methods for URI/path conversion, open
/// document bookkeeping, logging and settings resolution.
use std::path::{Path, PathBuf};

use tower_lsp::lsp_types::*;

use crate::Backend;
use crate::config::{self, CONFIG_SECTION, ConfigLayer, RefactorConfig};
use crate::error::{RefactorError, Result};

impl Backend {
    /// Convert a file path to a `file://` URI.
    pub(crate) fn path_to_uri(path: &Path) -> Result<Url> {
        Url::from_file_path(path).map_err(|()| RefactorError::InvalidPath(path.to_path_buf()))
    }

    /// Convert a `file://` URI to a path. Other schemes yield `None`.
    pub(crate) fn uri_to_path(uri: &Url) -> Option<PathBuf> {
        uri.to_file_path().ok()
    }

    /// Public helper for tests: the tracked text of an open document.
    pub fn get_open_file(&self, uri: &str) -> Option<String> {
        self.open_files.lock().get(uri).cloned()
    }

    /// The document the manual command acts on when none is given.
    pub fn get_last_active(&self) -> Option<Url> {
        self.last_active.lock().clone()
    }

    pub(crate) fn store_open_file(&self, uri: &Url, text: String) {
        self.open_files.lock().insert(uri.to_string(), text);
        *self.last_active.lock() = Some(uri.clone());
    }

    pub(crate) fn forget_open_file(&self, uri: &Url) {
        self.open_files.lock().remove(uri.as_str());
    }

    /// Open-buffer text for `path`, if the editor has it open.
    pub(crate) fn open_text_for(&self, path: &Path) -> Option<String> {
        let uri = Url::from_file_path(path).ok()?;
        self.get_open_file(uri.as_str())
    }

    pub(crate) fn set_init_options(&self, options: Option<&serde_json::Value>) {
        *self.init_options.lock() = options.and_then(ConfigLayer::from_json);
    }

    pub(crate) async fn log(&self, typ: MessageType, message: String) {
        if let Some(client) = &self.client {
            client.log_message(typ, message).await;
        }
    }

    /// Resolve settings from every layer, most specific last.
    pub(crate) async fn resolve_config(&self) -> RefactorConfig {
        let root = self.workspace_root();
        let mut layers = config::file_layers(root.as_deref());

        if let Some(layer) = self.init_options.lock().clone() {
            layers.push(layer);
        }

        if let Some(client) = &self.client {
            let item = ConfigurationItem {
                scope_uri: None,
                section: Some(CONFIG_SECTION.to_string()),
            };
            match client.configuration(vec![item]).await {
                Ok(values) => {
                    if let Some(layer) = values.first().and_then(ConfigLayer::from_json) {
                        layers.push(layer);
                    }
                }
                Err(err) => tracing::debug!("workspace/configuration unavailable: {err}"),
            }
        }

        RefactorConfig::from_layers(&layers)
    }
}
