#![allow(dead_code)]

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use parking_lot::Mutex;
use phpsync_lsp::error::Result;
use phpsync_lsp::rewrite::{LineEdit, apply_line_edits};
use phpsync_lsp::{Backend, RefactorConfig, RefactorError, RefactorHost, Refactorer};
use tower_lsp::lsp_types::MessageType;

pub fn create_test_backend() -> Backend {
    Backend::new_test()
}

/// A refactorer that does not wait before pairing create events.
pub fn instant_refactorer() -> Refactorer {
    Refactorer::new().with_settle_delay(Duration::ZERO)
}

/// Helper: create a temp workspace populated with `files`.
pub fn create_workspace(files: &[(&str, &str)]) -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    for (rel_path, content) in files {
        write_file(dir.path(), rel_path, content);
    }
    dir
}

pub fn write_file(root: &Path, rel_path: &str, content: &str) {
    let full = root.join(rel_path);
    if let Some(parent) = full.parent() {
        fs::create_dir_all(parent).expect("failed to create dirs");
    }
    fs::write(&full, content).expect("failed to write file");
}

pub fn read_file(root: &Path, rel_path: &str) -> String {
    fs::read_to_string(root.join(rel_path)).expect("failed to read file")
}

/// In-memory workspace that records every interaction.
pub struct MemoryHost {
    files: Mutex<BTreeMap<PathBuf, String>>,
    config: Mutex<RefactorConfig>,
    answer: bool,
    fail_on: Option<PathBuf>,
    pub prompts: Mutex<Vec<String>>,
    pub notifications: Mutex<Vec<(MessageType, String)>>,
    pub applied: Mutex<Vec<PathBuf>>,
}

impl MemoryHost {
    pub fn new(files: &[(&str, &str)]) -> Self {
        Self {
            files: Mutex::new(
                files
                    .iter()
                    .map(|(path, content)| (PathBuf::from(path), content.to_string()))
                    .collect(),
            ),
            config: Mutex::new(RefactorConfig::default()),
            answer: true,
            fail_on: None,
            prompts: Mutex::new(Vec::new()),
            notifications: Mutex::new(Vec::new()),
            applied: Mutex::new(Vec::new()),
        }
    }

    /// Answer every confirmation with `answer`.
    pub fn answering(mut self, answer: bool) -> Self {
        self.answer = answer;
        self
    }

    pub fn with_config(self, config: RefactorConfig) -> Self {
        *self.config.lock() = config;
        self
    }

    /// Reject any edit to `path`.
    pub fn failing_on(mut self, path: &str) -> Self {
        self.fail_on = Some(PathBuf::from(path));
        self
    }

    pub fn file(&self, path: &str) -> String {
        self.files
            .lock()
            .get(Path::new(path))
            .cloned()
            .unwrap_or_else(|| panic!("no such file: {path}"))
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }

    pub fn notifications(&self) -> Vec<(MessageType, String)> {
        self.notifications.lock().clone()
    }

    pub fn messages_at(&self, level: MessageType) -> Vec<String> {
        self.notifications
            .lock()
            .iter()
            .filter(|(typ, _)| *typ == level)
            .map(|(_, message)| message.clone())
            .collect()
    }
}

#[tower_lsp::async_trait]
impl RefactorHost for MemoryHost {
    async fn configuration(&self) -> RefactorConfig {
        self.config.lock().clone()
    }

    async fn php_files(&self) -> Result<Vec<PathBuf>> {
        Ok(self
            .files
            .lock()
            .keys()
            .filter(|p| p.extension().is_some_and(|ext| ext == "php"))
            .cloned()
            .collect())
    }

    async fn read_file(&self, path: &Path) -> Result<String> {
        self.files
            .lock()
            .get(path)
            .cloned()
            .ok_or_else(|| RefactorError::Io {
                path: path.to_path_buf(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            })
    }

    async fn apply_edits(&self, path: &Path, edits: &[LineEdit]) -> Result<()> {
        if self.fail_on.as_deref() == Some(path) {
            return Err(RefactorError::EditRejected {
                path: path.to_path_buf(),
                reason: "read-only".to_string(),
            });
        }

        let mut files = self.files.lock();
        let content = files.get(path).cloned().unwrap_or_default();
        let lines: Vec<&str> = content.lines().collect();
        for edit in edits {
            assert_eq!(
                lines.get(edit.line).copied(),
                Some(edit.original.as_str()),
                "edit to {} is based on stale text",
                path.display()
            );
        }
        let updated = apply_line_edits(&content, edits);
        files.insert(path.to_path_buf(), updated);
        self.applied.lock().push(path.to_path_buf());
        Ok(())
    }

    async fn confirm(&self, message: &str) -> bool {
        self.prompts.lock().push(message.to_string());
        self.answer
    }

    async fn notify(&self, level: MessageType, message: &str) {
        self.notifications.lock().push((level, message.to_string()));
    }
}
