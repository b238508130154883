/// LSP server trait implementation.
///
/// This module contains the `impl LanguageServer for Backend` block,
/// which handles all LSP protocol messages (initialize, didOpen, didChange,
/// didClose, didChangeWatchedFiles, executeCommand).
use serde_json::Value;
use tokio::task::JoinHandle;
use tower_lsp::LanguageServer;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;

use crate::host::RefactorHost;
use crate::types::Outcome;
use crate::workspace::is_php_file;
use crate::{Backend, UPDATE_COMMAND};

const WATCHER_REGISTRATION_ID: &str = "phpsync-php-files";

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        // Prefer rootUri, fall back to the first workspace folder.
        let workspace_root = params
            .root_uri
            .as_ref()
            .and_then(Self::uri_to_path)
            .or_else(|| {
                params
                    .workspace_folders
                    .as_ref()
                    .and_then(|folders| folders.first())
                    .and_then(|folder| Self::uri_to_path(&folder.uri))
            });

        if let Some(root) = workspace_root {
            *self.workspace_root.lock() = Some(root);
        }
        self.set_init_options(params.initialization_options.as_ref());

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::FULL,
                )),
                execute_command_provider: Some(ExecuteCommandOptions {
                    commands: vec![UPDATE_COMMAND.to_string()],
                    work_done_progress_options: WorkDoneProgressOptions {
                        work_done_progress: None,
                    },
                }),
                ..ServerCapabilities::default()
            },
            server_info: Some(ServerInfo {
                name: self.name.clone(),
                version: Some(self.version.clone()),
            }),
            offset_encoding: None,
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        if let Some(client) = &self.client {
            let options = DidChangeWatchedFilesRegistrationOptions {
                watchers: vec![FileSystemWatcher {
                    glob_pattern: GlobPattern::String("**/*.php".to_string()),
                    kind: Some(WatchKind::Create | WatchKind::Delete),
                }],
            };
            let registration = Registration {
                id: WATCHER_REGISTRATION_ID.to_string(),
                method: "workspace/didChangeWatchedFiles".to_string(),
                register_options: serde_json::to_value(options).ok(),
            };
            if let Err(err) = client.register_capability(vec![registration]).await {
                tracing::warn!("could not register file watcher: {err}");
            }
        }

        let root = self
            .workspace_root()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<none>".to_string());
        tracing::info!("{} {} ready, workspace {root}", self.name, self.version);
        self.log(
            MessageType::INFO,
            format!("{} {} initialized", self.name, self.version),
        )
        .await;
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let doc = params.text_document;
        tracing::debug!("opened {}", doc.uri);
        self.log(MessageType::LOG, format!("opened {}", doc.uri)).await;
        self.store_open_file(&doc.uri, doc.text);
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        // Full sync: the last change carries the whole document.
        if let Some(change) = params.content_changes.into_iter().last() {
            self.store_open_file(&params.text_document.uri, change.text);
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        self.forget_open_file(&params.text_document.uri);
    }

    async fn did_change_watched_files(&self, params: DidChangeWatchedFilesParams) {
        // Handled in the background so the notification loop keeps draining
        // while a rename waits on its settle delay or a confirmation.
        drop(self.dispatch_file_events(params.changes));
    }

    async fn execute_command(&self, params: ExecuteCommandParams) -> Result<Option<Value>> {
        if params.command != UPDATE_COMMAND {
            tracing::debug!("ignoring unknown command {}", params.command);
            return Ok(None);
        }

        let uri = params
            .arguments
            .first()
            .and_then(Value::as_str)
            .and_then(|s| Url::parse(s).ok())
            .or_else(|| self.get_last_active());

        let path = uri
            .as_ref()
            .and_then(Self::uri_to_path)
            .filter(|p| is_php_file(p));

        let Some(path) = path else {
            self.notify(MessageType::WARNING, "Please open a PHP file to refactor.")
                .await;
            return Ok(None);
        };

        let outcome = self.refactorer.refactor_file(self, &path).await;
        Ok(serde_json::to_value(outcome_label(&outcome)).ok())
    }
}

impl Backend {
    /// Route watched-file events to the orchestrator.
    ///
    /// Deletions are recorded synchronously, in event order, so that a
    /// creation in the same batch can pair with them. Each creation is
    /// handled on its own task; the handles are returned for callers that
    /// want to wait on the outcome.
    pub fn dispatch_file_events(&self, changes: Vec<FileEvent>) -> Vec<JoinHandle<Outcome>> {
        let mut handles = Vec::new();

        for event in changes {
            let Some(path) = Self::uri_to_path(&event.uri).filter(|p| is_php_file(p)) else {
                continue;
            };

            if event.typ == FileChangeType::DELETED {
                self.refactorer.file_deleted(&path);
            } else if event.typ == FileChangeType::CREATED {
                let backend = self.clone();
                handles.push(tokio::spawn(async move {
                    backend.refactorer.file_created(&backend, &path).await
                }));
            }
        }

        handles
    }
}

/// Short machine-readable result returned from `workspace/executeCommand`.
fn outcome_label(outcome: &Outcome) -> &'static str {
    match outcome {
        Outcome::NoClass => "noClass",
        Outcome::InvalidName(_) => "invalidName",
        Outcome::Aligned => "aligned",
        Outcome::Declined => "declined",
        Outcome::Refactored(_) => "refactored",
        Outcome::Failed(_) => "failed",
    }
}
