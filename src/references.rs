/// Reference scanning.
///
/// Finds lines that mention a class by name. Matching is line-oriented and
/// intentionally loose: string literals and comments are not excluded, and
/// the lower-cased `$variable` form will hit unrelated variables that happen
/// to share the name. Each line yields at most one match, classified by the
/// first pattern (in priority order) that hits it, so a line is never edited
/// twice.
use std::path::Path;

use regex::Regex;

use crate::types::{ReferenceKind, ReferenceMatch};

/// Compiled patterns for one class name.
#[derive(Debug)]
pub struct ReferenceMatcher {
    patterns: Vec<(Regex, ReferenceKind)>,
}

impl ReferenceMatcher {
    /// Build a matcher for `class_name`, optionally also recognising the
    /// fully-qualified `namespace\class_name` form in `use` statements.
    pub fn new(class_name: &str, namespace: Option<&str>) -> Self {
        let name = regex::escape(class_name);
        let fqn = match namespace {
            Some(ns) => regex::escape(&format!("{}\\{}", ns, class_name)),
            None => name.clone(),
        };
        let variable = regex::escape(&class_name.to_lowercase());

        let sources = [
            (format!(r"\b{name}::"), ReferenceKind::Static),
            (format!(r"\bnew\s+{name}\b"), ReferenceKind::New),
            (format!(r"\buse\s+[^;]*\b{name}\b"), ReferenceKind::Use),
            (format!(r"\buse\s+[^;]*\b{fqn}\b"), ReferenceKind::Use),
            (format!(r"\bextends\s+{name}\b"), ReferenceKind::Extends),
            (format!(r"\bimplements\s+[^{{]*\b{name}\b"), ReferenceKind::Implements),
            (format!(r"\b{name}\s*\("), ReferenceKind::Other),
            // Framework idioms: route arrays, class constants, string
            // references and same-named variables.
            (format!(r"\[{name}::class,"), ReferenceKind::Other),
            (format!(r"{name}::class"), ReferenceKind::Other),
            (format!(r"'{name}'"), ReferenceKind::Other),
            (format!(r#""{name}""#), ReferenceKind::Other),
            (format!(r"\${variable}"), ReferenceKind::Other),
        ];

        let patterns = sources
            .into_iter()
            .filter_map(|(source, kind)| match Regex::new(&source) {
                Ok(re) => Some((re, kind)),
                Err(err) => {
                    tracing::warn!("skipping reference pattern {source:?}: {err}");
                    None
                }
            })
            .collect();

        Self { patterns }
    }

    /// Classify a single line. Returns the kind and the byte offset of the
    /// match start.
    pub fn match_line(&self, line: &str) -> Option<(ReferenceKind, usize)> {
        self.patterns
            .iter()
            .find_map(|(re, kind)| re.find(line).map(|m| (*kind, m.start())))
    }

    /// Scan one file's content, in line order.
    pub fn scan(&self, path: &Path, content: &str) -> Vec<ReferenceMatch> {
        content
            .lines()
            .enumerate()
            .filter_map(|(index, line)| {
                let (kind, byte_offset) = self.match_line(line)?;
                Some(ReferenceMatch {
                    path: path.to_path_buf(),
                    line: index,
                    column: line[..byte_offset].chars().count(),
                    text: line.trim().to_string(),
                    kind,
                })
            })
            .collect()
    }
}

/// Scan a corpus of `(path, content)` pairs for references to `class_name`.
///
/// Results are ordered file-then-line, in corpus order.
pub fn find_references<'a, I>(class_name: &str, namespace: Option<&str>, corpus: I) -> Vec<ReferenceMatch>
where
    I: IntoIterator<Item = (&'a Path, &'a str)>,
{
    let matcher = ReferenceMatcher::new(class_name, namespace);
    corpus
        .into_iter()
        .flat_map(|(path, content)| matcher.scan(path, content))
        .collect()
}
