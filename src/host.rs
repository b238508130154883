/// The editor-facing side of a refactor.
///
/// The orchestrator only ever talks to the editor through this trait. The
/// language server implements it over an LSP client (or straight against
/// the disk when running headless); tests implement it in memory.
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tower_lsp::lsp_types::{MessageActionItem, MessageType, WorkspaceEdit};

use crate::Backend;
use crate::config::RefactorConfig;
use crate::error::{RefactorError, Result};
use crate::rewrite::{LineEdit, apply_line_edits};
use crate::workspace;

#[tower_lsp::async_trait]
pub trait RefactorHost: Send + Sync {
    /// Current settings. Called at every decision point; never cached.
    async fn configuration(&self) -> RefactorConfig;

    /// Every PHP file in the workspace, dependency directories excluded.
    ///
    /// Fails with [`RefactorError::NoWorkspace`] when no workspace root is
    /// known, since references could not be found.
    async fn php_files(&self) -> Result<Vec<PathBuf>>;

    /// Full text of a file, preferring unsaved editor content.
    async fn read_file(&self, path: &Path) -> Result<String>;

    /// Apply whole-line edits to one file as a single batch.
    async fn apply_edits(&self, path: &Path, edits: &[LineEdit]) -> Result<()>;

    /// Ask a yes/no question. Anything but an explicit yes is `false`.
    async fn confirm(&self, message: &str) -> bool;

    /// Show a message to the user.
    async fn notify(&self, level: MessageType, message: &str);
}

#[tower_lsp::async_trait]
impl RefactorHost for Backend {
    async fn configuration(&self) -> RefactorConfig {
        self.resolve_config().await
    }

    async fn php_files(&self) -> Result<Vec<PathBuf>> {
        let root = self.workspace_root().ok_or(RefactorError::NoWorkspace)?;
        let scan_root = root.clone();
        tokio::task::spawn_blocking(move || workspace::php_files(&scan_root))
            .await
            .map_err(|err| RefactorError::Io {
                path: root,
                source: std::io::Error::other(err),
            })
    }

    async fn read_file(&self, path: &Path) -> Result<String> {
        if let Some(text) = self.open_text_for(path) {
            return Ok(text);
        }
        tokio::fs::read_to_string(path)
            .await
            .map_err(|source| RefactorError::Io {
                path: path.to_path_buf(),
                source,
            })
    }

    async fn apply_edits(&self, path: &Path, edits: &[LineEdit]) -> Result<()> {
        if edits.is_empty() {
            return Ok(());
        }

        let Some(client) = &self.client else {
            // Headless: rewrite the file on disk.
            let content = self.read_file(path).await?;
            let updated = apply_line_edits(&content, edits);
            return tokio::fs::write(path, updated)
                .await
                .map_err(|source| RefactorError::Io {
                    path: path.to_path_buf(),
                    source,
                });
        };

        let uri = Self::path_to_uri(path)?;
        let text_edits = edits.iter().map(LineEdit::to_text_edit).collect();
        let response = client
            .apply_edit(WorkspaceEdit::new(HashMap::from([(uri, text_edits)])))
            .await?;

        if response.applied {
            Ok(())
        } else {
            Err(RefactorError::EditRejected {
                path: path.to_path_buf(),
                reason: response
                    .failure_reason
                    .unwrap_or_else(|| "no reason given".to_string()),
            })
        }
    }

    async fn confirm(&self, message: &str) -> bool {
        let Some(client) = &self.client else {
            tracing::info!("{message} [{}]", if self.assume_yes { "yes" } else { "no" });
            return self.assume_yes;
        };

        let actions = ["Yes", "No"]
            .into_iter()
            .map(|title| MessageActionItem {
                title: title.to_string(),
                properties: HashMap::new(),
            })
            .collect();

        match client
            .show_message_request(MessageType::INFO, message, Some(actions))
            .await
        {
            Ok(Some(choice)) => choice.title == "Yes",
            Ok(None) => false,
            Err(err) => {
                tracing::warn!("confirmation request failed: {err}");
                false
            }
        }
    }

    async fn notify(&self, level: MessageType, message: &str) {
        match &self.client {
            Some(client) => client.show_message(level, message).await,
            None if level == MessageType::ERROR => tracing::error!("{message}"),
            None if level == MessageType::WARNING => tracing::warn!("{message}"),
            None => tracing::info!("{message}"),
        }
    }
}
