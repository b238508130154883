//! PHPSync: a language server that keeps PHP class names, namespaces and
//! cross-file references in step with file names and directories.
//!
//! When a PHP file is renamed or moved, the editor reports a deletion
//! followed by a creation. The server pairs the two, derives the class name
//! and namespace the file should now have, asks for confirmation and then
//! rewrites the declaration and every referencing line in the workspace.
//! The same rewrite is available on demand through the
//! `phpRefactor.updateClassReferences` command.
//!
//! Matching is line-oriented and regex based; see [`references`] for what
//! counts as a reference.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;
use tower_lsp::Client;
use tower_lsp::lsp_types::Url;

pub mod composer;
pub mod config;
pub mod error;
pub mod extract;
pub mod host;
pub mod namespace;
pub mod naming;
pub mod pending;
pub mod references;
pub mod refactor;
pub mod rewrite;
mod server;
pub mod types;
mod util;
pub mod workspace;

pub use config::{ConfigLayer, RefactorConfig};
pub use error::RefactorError;
pub use host::RefactorHost;
pub use refactor::Refactorer;
pub use types::{ClassDeclaration, Outcome, ReferenceKind, ReferenceMatch, RefactorSummary};

/// The command that renames the current file's class to match its name.
pub const UPDATE_COMMAND: &str = "phpRefactor.updateClassReferences";

#[derive(Clone)]
pub struct Backend {
    name: String,
    version: String,
    /// `None` when running headless (CLI and tests): edits go straight to
    /// disk and messages go to the log.
    client: Option<Client>,
    workspace_root: Arc<Mutex<Option<PathBuf>>>,
    /// Text of documents open in the editor, keyed by URI string.
    open_files: Arc<Mutex<HashMap<String, String>>>,
    /// The most recently opened or edited document.
    last_active: Arc<Mutex<Option<Url>>>,
    /// Settings passed in `initializationOptions`.
    init_options: Arc<Mutex<Option<ConfigLayer>>>,
    refactorer: Arc<Refactorer>,
    /// Headless answer to confirmation prompts.
    assume_yes: bool,
}

impl Backend {
    pub fn new(client: Client) -> Self {
        Self::build(Some(client), None, false)
    }

    /// A client-less backend without a workspace root.
    pub fn new_test() -> Self {
        Self::build(None, None, false)
    }

    /// A client-less backend rooted at `workspace_root`.
    pub fn new_test_with_workspace(workspace_root: PathBuf) -> Self {
        Self::build(None, Some(workspace_root), false)
    }

    /// A client-less backend for the command line.
    pub fn new_headless(workspace_root: PathBuf, assume_yes: bool) -> Self {
        Self::build(None, Some(workspace_root), assume_yes)
    }

    fn build(client: Option<Client>, workspace_root: Option<PathBuf>, assume_yes: bool) -> Self {
        Self {
            name: "PHPSync".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            client,
            workspace_root: Arc::new(Mutex::new(workspace_root)),
            open_files: Arc::new(Mutex::new(HashMap::new())),
            last_active: Arc::new(Mutex::new(None)),
            init_options: Arc::new(Mutex::new(None)),
            refactorer: Arc::new(Refactorer::new()),
            assume_yes,
        }
    }

    /// Swap in a differently tuned orchestrator (e.g. no settle delay).
    pub fn with_refactorer(mut self, refactorer: Refactorer) -> Self {
        self.refactorer = Arc::new(refactorer);
        self
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }

    pub fn get_version(&self) -> &str {
        &self.version
    }

    pub fn refactorer(&self) -> &Refactorer {
        &self.refactorer
    }

    pub fn workspace_root(&self) -> Option<PathBuf> {
        self.workspace_root.lock().clone()
    }
}
