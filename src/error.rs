//! Error types for the refactoring pipeline.
//!
//! The pure pieces (name derivation, class extraction, reference matching)
//! never fail. Only host interaction can: reading a file, or the client
//! refusing or failing to apply an edit.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for refactoring operations.
pub type Result<T> = std::result::Result<T, RefactorError>;

/// Errors raised while rewriting files.
#[derive(Debug, Error)]
pub enum RefactorError {
    /// Reading or writing a file failed.
    #[error("could not access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The client answered `applied: false` to a workspace edit.
    #[error("edit to {} was rejected: {reason}", path.display())]
    EditRejected { path: PathBuf, reason: String },

    /// A request to the client failed at the JSON-RPC level.
    #[error("client request failed: {0}")]
    Client(String),

    /// A path could not be expressed as a `file://` URI.
    #[error("not a valid file path: {}", .0.display())]
    InvalidPath(PathBuf),

    /// The server was started without a workspace root.
    #[error("no workspace root is known")]
    NoWorkspace,
}

impl From<tower_lsp::jsonrpc::Error> for RefactorError {
    fn from(err: tower_lsp::jsonrpc::Error) -> Self {
        RefactorError::Client(err.message.to_string())
    }
}
