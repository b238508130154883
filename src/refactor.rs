//! Rename detection and the refactor pipeline.
//!
//! A run moves through these phases:
//!
//! ```text
//! Idle ─▶ DetectingChange ─▶ AwaitingConfirmation ─▶ Rewriting ─▶ Reporting
//!   ▲            │                    │                               │
//!   └────────────┴────────────────────┴───────────────────────────────┘
//! ```
//!
//! Deletions are only recorded; they never start a run. A creation starts
//! one: after a short settle delay it is paired with a live deletion whose
//! derived class name or directory differs (a rename or move), or, failing
//! that, the new file's declared class is checked against its file name.
//! The manual command skips detection and confirmation.
//!
//! Runs are serialized: two runs never rewrite the workspace at the same
//! time. Within a run the first failed step aborts the rest; edits already
//! applied stay applied.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tower_lsp::lsp_types::MessageType;
use tracing::{debug, error, info, warn};

use crate::config::RefactorConfig;
use crate::error::Result;
use crate::extract::extract_class;
use crate::host::RefactorHost;
use crate::namespace::namespace_from_path;
use crate::naming::{class_name_from_path, is_valid_class_name};
use crate::pending::PendingDeletions;
use crate::references::ReferenceMatcher;
use crate::rewrite::{LineEdit, Rename, apply_line_edits, declaration_edits, reference_edits};
use crate::types::{Outcome, RefactorSummary, RenamePlan, Trigger};

/// Wait between a create event and rename detection.
pub const SETTLE_DELAY: Duration = Duration::from_millis(100);

pub struct Refactorer {
    pending: Mutex<PendingDeletions>,
    /// Held for the whole of a run (detection through reporting).
    gate: tokio::sync::Mutex<()>,
    settle_delay: Duration,
}

impl Default for Refactorer {
    fn default() -> Self {
        Self::new()
    }
}

impl Refactorer {
    pub fn new() -> Self {
        Self {
            pending: Mutex::new(PendingDeletions::default()),
            gate: tokio::sync::Mutex::new(()),
            settle_delay: SETTLE_DELAY,
        }
    }

    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Replace the deletion record, e.g. to change how long deletions live.
    pub fn with_pending(mut self, pending: PendingDeletions) -> Self {
        self.pending = Mutex::new(pending);
        self
    }

    /// Number of deletions still eligible for pairing.
    pub fn pending_deletions(&self) -> usize {
        self.pending.lock().live(Instant::now()).len()
    }

    /// Record a deleted file so a following creation can pair with it.
    pub fn file_deleted(&self, path: &Path) {
        debug!("deleted: {}", path.display());
        self.pending.lock().record(path, Instant::now());
    }

    /// Handle a created file: detect a rename/move or a misnamed class and,
    /// once confirmed, refactor.
    pub async fn file_created<H>(&self, host: &H, path: &Path) -> Outcome
    where
        H: RefactorHost + ?Sized,
    {
        if !self.settle_delay.is_zero() {
            tokio::time::sleep(self.settle_delay).await;
        }
        let _run = self.gate.lock().await;

        let config = host.configuration().await;
        let new_class = class_name_from_path(path, config.enable_framework_conventions);
        if !is_valid_class_name(&new_class) {
            debug!("{} does not yield a class name, ignoring", path.display());
            return Outcome::InvalidName(new_class);
        }
        let candidates = self.pending.lock().live(Instant::now());

        for old_path in candidates {
            let old_class = class_name_from_path(&old_path, config.enable_framework_conventions);
            if !is_valid_class_name(&old_class) {
                continue;
            }
            let directory_changed = old_path.parent() != path.parent();
            if !directory_changed && old_class == new_class {
                continue;
            }

            self.pending.lock().take(&old_path, Instant::now());
            info!(
                "{} → {} looks like a {}",
                old_path.display(),
                path.display(),
                if directory_changed { "move" } else { "rename" }
            );

            let plan = RenamePlan {
                target: path.to_path_buf(),
                old_path,
                old_class,
                new_class,
                directory_changed,
                trigger: Trigger::Rename,
            };
            return self.confirm_rename(host, plan).await;
        }

        self.check_alignment(host, path).await
    }

    /// The manual command: rename the class in `path` to match its file name.
    pub async fn refactor_file<H>(&self, host: &H, path: &Path) -> Outcome
    where
        H: RefactorHost + ?Sized,
    {
        let _run = self.gate.lock().await;

        let content = match host.read_file(path).await {
            Ok(content) => content,
            Err(err) => return fail(host, err.to_string()).await,
        };
        let Some(class) = extract_class(&content) else {
            host.notify(MessageType::WARNING, "No PHP class found in this file.")
                .await;
            return Outcome::NoClass;
        };

        let config = host.configuration().await;
        let expected = class_name_from_path(path, config.enable_framework_conventions);
        if !is_valid_class_name(&expected) {
            host.notify(
                MessageType::WARNING,
                "File name does not form a valid PHP class name.",
            )
            .await;
            return Outcome::InvalidName(expected);
        }
        if class.name == expected {
            host.notify(MessageType::INFO, "Class name already matches filename.")
                .await;
            return Outcome::Aligned;
        }

        let plan = RenamePlan {
            target: path.to_path_buf(),
            old_path: path.to_path_buf(),
            old_class: class.name,
            new_class: expected,
            directory_changed: false,
            trigger: Trigger::Command,
        };
        self.run(host, &plan).await
    }

    async fn check_alignment<H>(&self, host: &H, path: &Path) -> Outcome
    where
        H: RefactorHost + ?Sized,
    {
        let content = match host.read_file(path).await {
            Ok(content) => content,
            Err(err) => {
                warn!("cannot check class name alignment: {err}");
                return Outcome::NoClass;
            }
        };
        let Some(class) = extract_class(&content) else {
            return Outcome::NoClass;
        };

        let config = host.configuration().await;
        let expected = class_name_from_path(path, config.enable_framework_conventions);
        if !is_valid_class_name(&expected) {
            return Outcome::InvalidName(expected);
        }
        if class.name == expected {
            return Outcome::Aligned;
        }

        let message = format!(
            "Class name \"{}\" doesn't match filename. Rename to \"{}\"?",
            class.name, expected
        );
        if !config.auto_update && !host.confirm(&message).await {
            debug!("alignment of {} declined", path.display());
            return Outcome::Declined;
        }

        let plan = RenamePlan {
            target: path.to_path_buf(),
            old_path: path.to_path_buf(),
            old_class: class.name,
            new_class: expected,
            directory_changed: false,
            trigger: Trigger::Alignment,
        };
        self.run(host, &plan).await
    }

    async fn confirm_rename<H>(&self, host: &H, plan: RenamePlan) -> Outcome
    where
        H: RefactorHost + ?Sized,
    {
        let config = host.configuration().await;
        if !config.auto_update {
            let message = rename_prompt(&plan, &config);
            if !host.confirm(&message).await {
                debug!("rename of {} declined", plan.old_class);
                return Outcome::Declined;
            }
        }
        self.run(host, &plan).await
    }

    /// Rewriting and reporting.
    async fn run<H>(&self, host: &H, plan: &RenamePlan) -> Outcome
    where
        H: RefactorHost + ?Sized,
    {
        match rewrite(host, plan).await {
            Ok(summary) => {
                info!(
                    "{}: renamed {} to {} ({} references, {} files)",
                    plan.trigger,
                    summary.old_class,
                    summary.new_class,
                    summary.references,
                    summary.files_changed
                );
                if host.configuration().await.show_notifications {
                    host.notify(MessageType::INFO, &summary.message()).await;
                }
                Outcome::Refactored(summary)
            }
            Err(err) => {
                debug!("{} of {} aborted", plan.trigger, plan.old_class);
                fail(host, err.to_string()).await
            }
        }
    }
}

async fn fail<H>(host: &H, reason: String) -> Outcome
where
    H: RefactorHost + ?Sized,
{
    let message = format!("Refactoring failed: {reason}");
    error!("{message}");
    host.notify(MessageType::ERROR, &message).await;
    Outcome::Failed(message)
}

/// The confirmation question for a detected rename or move.
pub fn rename_prompt(plan: &RenamePlan, config: &RefactorConfig) -> String {
    let class_changed = plan.old_class != plan.new_class;
    let mut message = format!(
        "PHP file {}.",
        if plan.directory_changed { "moved" } else { "renamed" }
    );

    if class_changed {
        message.push_str(&format!(
            " Update class name from \"{}\" to \"{}\"",
            plan.old_class, plan.new_class
        ));
    }

    if plan.directory_changed && config.update_namespaces {
        let old_ns = namespace_from_path(&plan.old_path, &config.root_namespace, &config.source_directory);
        let new_ns = namespace_from_path(&plan.target, &config.root_namespace, &config.source_directory);
        // Only a change between two known namespaces is ever rewritten.
        if let (Some(old_ns), Some(new_ns)) = (old_ns, new_ns)
            && old_ns != new_ns
        {
            if class_changed {
                message.push_str(&format!(" and namespace from \"{old_ns}\" to \"{new_ns}\""));
            } else {
                message.push_str(&format!(" Update namespace from \"{old_ns}\" to \"{new_ns}\""));
            }
        }
    }

    message.push_str(" and all references?");
    message
}

/// Rewrite the declaring file, then every line that references the old
/// name. Edits are batched per file.
async fn rewrite<H>(host: &H, plan: &RenamePlan) -> Result<RefactorSummary>
where
    H: RefactorHost + ?Sized,
{
    let config = host.configuration().await;
    let (old_namespace, new_namespace) = if plan.directory_changed && config.update_namespaces {
        (
            namespace_from_path(&plan.old_path, &config.root_namespace, &config.source_directory),
            namespace_from_path(&plan.target, &config.root_namespace, &config.source_directory),
        )
    } else {
        (None, None)
    };

    let rename = Rename {
        old_class: &plan.old_class,
        new_class: &plan.new_class,
        old_namespace: old_namespace.as_deref(),
        new_namespace: new_namespace.as_deref(),
    };

    // Listed up front so a missing workspace fails before anything changes.
    let corpus = host.php_files().await?;

    // Declaring file first; the reference scan then sees its new text.
    let declaring = host.read_file(&plan.target).await?;
    let declaration = declaration_edits(&declaring, &rename);
    let declaring = if declaration.is_empty() {
        declaring
    } else {
        host.apply_edits(&plan.target, &declaration).await?;
        debug!("rewrote declaration in {}", plan.target.display());
        apply_line_edits(&declaring, &declaration)
    };

    let matcher = ReferenceMatcher::new(&plan.old_class, old_namespace.as_deref());
    let mut references = 0;
    let mut batches: Vec<(PathBuf, Vec<LineEdit>)> = Vec::new();

    for file in corpus {
        let owned;
        let content = if file == plan.target {
            &declaring
        } else {
            owned = host.read_file(&file).await?;
            &owned
        };

        let matches = matcher.scan(&file, content);
        if matches.is_empty() {
            continue;
        }
        for m in &matches {
            debug!("{}:{}: {} reference", file.display(), m.line + 1, m.kind);
        }
        references += matches.len();

        let edits = reference_edits(content, &matches, &rename);
        if !edits.is_empty() {
            batches.push((file, edits));
        }
    }

    for (file, edits) in &batches {
        host.apply_edits(file, edits).await?;
        debug!("updated {} line(s) in {}", edits.len(), file.display());
    }

    let files_changed = batches.len()
        + usize::from(!declaration.is_empty() && !batches.iter().any(|(f, _)| *f == plan.target));

    Ok(RefactorSummary {
        old_class: plan.old_class.clone(),
        new_class: plan.new_class.clone(),
        old_namespace,
        new_namespace,
        references,
        files_changed,
    })
}
