//! Data types used throughout the PHPSync server.
//!
//! This module contains the value types that flow between the pure
//! string/path transforms (class declarations, reference matches) and the
//! orchestrator (rename plans, summaries, outcomes).

use std::fmt;
use std::path::PathBuf;

/// The first class declared in a PHP file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDeclaration {
    /// The class name as written (e.g. "UserService").
    pub name: String,
    /// The declared namespace, if the file has a `namespace ...;` line.
    pub namespace: Option<String>,
    /// Zero-based index of the line holding the declaration.
    pub line: usize,
}

/// The syntactic role a class name plays on a matched line.
///
/// Variants are listed in matching priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceKind {
    /// `Name::method()` or `Name::CONSTANT`.
    Static,
    /// `new Name`.
    New,
    /// `use Some\Namespace\Name;`.
    Use,
    /// `extends Name`.
    Extends,
    /// `implements Foo, Name`.
    Implements,
    /// Call-style usage and framework literals (`Name(`, `Name::class`,
    /// `'Name'`, `$name`).
    Other,
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ReferenceKind::Static => "static",
            ReferenceKind::New => "new",
            ReferenceKind::Use => "use",
            ReferenceKind::Extends => "extends",
            ReferenceKind::Implements => "implements",
            ReferenceKind::Other => "other",
        };
        f.write_str(label)
    }
}

/// One line that refers to the class being renamed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceMatch {
    /// The file the line belongs to.
    pub path: PathBuf,
    /// Zero-based line index.
    pub line: usize,
    /// Character offset (not byte offset) of the match start within the line.
    pub column: usize,
    /// The line text with surrounding whitespace trimmed.
    pub text: String,
    pub kind: ReferenceKind,
}

/// What triggered a refactor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// A deletion paired with a creation under a new name or directory.
    Rename,
    /// A created file whose class name does not match its file name.
    Alignment,
    /// The `phpRefactor.updateClassReferences` command.
    Command,
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Trigger::Rename => "rename",
            Trigger::Alignment => "alignment",
            Trigger::Command => "command",
        })
    }
}

/// A confirmed-or-pending rename of one class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenamePlan {
    /// The file that declares the class (its current location).
    pub target: PathBuf,
    /// Where the file used to live. Equal to `target` unless it moved.
    pub old_path: PathBuf,
    pub old_class: String,
    pub new_class: String,
    /// Whether the file changed directory, which enables namespace updates.
    pub directory_changed: bool,
    pub trigger: Trigger,
}

/// What a finished refactor changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefactorSummary {
    pub old_class: String,
    pub new_class: String,
    pub old_namespace: Option<String>,
    pub new_namespace: Option<String>,
    /// Number of matched reference lines across the workspace.
    pub references: usize,
    /// Number of files that received at least one edit.
    pub files_changed: usize,
}

impl RefactorSummary {
    /// Whether both namespaces are known and differ.
    pub fn namespace_changed(&self) -> bool {
        matches!(
            (&self.old_namespace, &self.new_namespace),
            (Some(old), Some(new)) if old != new
        )
    }

    /// The notification shown to the user once the refactor is done.
    pub fn message(&self) -> String {
        let mut message = format!(
            "Refactored class \"{}\" to \"{}\".",
            self.old_class, self.new_class
        );
        if let (true, Some(old), Some(new)) = (
            self.namespace_changed(),
            &self.old_namespace,
            &self.new_namespace,
        ) {
            message.push_str(&format!(
                " Updated namespace from \"{}\" to \"{}\".",
                old, new
            ));
        }
        message.push_str(&format!(" Updated {} references.", self.references));
        message
    }
}

/// How an orchestration run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The file declares no class.
    NoClass,
    /// The file name does not yield a usable class name (e.g. `_.php`).
    InvalidName(String),
    /// Class name already matches the file name and nothing moved.
    Aligned,
    /// The user said no (or dismissed the prompt).
    Declined,
    Refactored(RefactorSummary),
    /// The rewrite aborted; the message was already shown to the user.
    Failed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> RefactorSummary {
        RefactorSummary {
            old_class: "UserService".to_string(),
            new_class: "UserManager".to_string(),
            old_namespace: None,
            new_namespace: None,
            references: 2,
            files_changed: 2,
        }
    }

    #[test]
    fn summary_message_without_namespace() {
        assert_eq!(
            summary().message(),
            "Refactored class \"UserService\" to \"UserManager\". Updated 2 references."
        );
    }

    #[test]
    fn summary_message_with_namespace_change() {
        let s = RefactorSummary {
            old_namespace: Some("App\\Services".to_string()),
            new_namespace: Some("App\\Domain".to_string()),
            ..summary()
        };
        assert_eq!(
            s.message(),
            "Refactored class \"UserService\" to \"UserManager\". \
             Updated namespace from \"App\\Services\" to \"App\\Domain\". \
             Updated 2 references."
        );
    }

    #[test]
    fn identical_namespaces_are_not_a_change() {
        let s = RefactorSummary {
            old_namespace: Some("App".to_string()),
            new_namespace: Some("App".to_string()),
            ..summary()
        };
        assert!(!s.namespace_changed());
        assert!(!s.message().contains("namespace"));
    }

    #[test]
    fn labels_for_logging() {
        assert_eq!(ReferenceKind::Use.to_string(), "use");
        assert_eq!(ReferenceKind::Implements.to_string(), "implements");
        assert_eq!(Trigger::Alignment.to_string(), "alignment");
        assert_eq!(Trigger::Command.to_string(), "command");
    }
}
