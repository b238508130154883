/// Line rewrites for a class rename.
///
/// Every edit replaces one whole line, so edits within a file never
/// overlap. The same edits drive both LSP `TextEdit`s and direct on-disk
/// rewrites.
use std::sync::LazyLock;

use regex::{NoExpand, Regex};
use tower_lsp::lsp_types::{Position, Range, TextEdit};

use crate::types::{ReferenceKind, ReferenceMatch};

static NAMESPACE_LINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^namespace\s+").unwrap());

static NAMESPACE_STATEMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^namespace\s+[^;]+;").unwrap());

/// Replacement text for one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineEdit {
    /// Zero-based line index.
    pub line: usize,
    /// The line as it was when the edit was computed (without terminator).
    pub original: String,
    pub replacement: String,
}

impl LineEdit {
    /// Convert to an LSP edit covering the whole original line.
    ///
    /// Columns are UTF-16 code units, the LSP default position encoding.
    pub fn to_text_edit(&self) -> TextEdit {
        let line = self.line as u32;
        TextEdit {
            range: Range {
                start: Position { line, character: 0 },
                end: Position {
                    line,
                    character: self.original.encode_utf16().count() as u32,
                },
            },
            new_text: self.replacement.clone(),
        }
    }
}

/// Old and new identity of the class being renamed.
#[derive(Debug, Clone, Copy)]
pub struct Rename<'a> {
    pub old_class: &'a str,
    pub new_class: &'a str,
    pub old_namespace: Option<&'a str>,
    pub new_namespace: Option<&'a str>,
}

impl Rename<'_> {
    /// Both namespaces, when both are known and differ.
    fn namespace_change(&self) -> Option<(&str, &str)> {
        match (self.old_namespace, self.new_namespace) {
            (Some(old), Some(new)) if old != new => Some((old, new)),
            _ => None,
        }
    }
}

/// Edits for the file that declares the class: its namespace line, its
/// class declaration line and any `new OldName` on any line.
pub fn declaration_edits(content: &str, rename: &Rename<'_>) -> Vec<LineEdit> {
    let old = regex::escape(rename.old_class);
    let (Ok(declaration), Ok(word), Ok(instantiation)) = (
        Regex::new(&format!(r"class\s+{old}\b")),
        Regex::new(&format!(r"\b{old}\b")),
        Regex::new(&format!(r"\bnew\s+{old}\b")),
    ) else {
        return Vec::new();
    };
    let new_instantiation = format!("new {}", rename.new_class);
    let namespace_change = rename.namespace_change();
    let instantiation_marker = format!("new {}", rename.old_class);

    content
        .lines()
        .enumerate()
        .filter_map(|(index, line)| {
            let mut text = line.to_string();

            if let Some((_, new_ns)) = namespace_change
                && NAMESPACE_LINE.is_match(&text)
            {
                let statement = format!("namespace {new_ns};");
                text = NAMESPACE_STATEMENT
                    .replace(&text, NoExpand(&statement))
                    .into_owned();
            }

            if declaration.is_match(&text) {
                text = word.replace_all(&text, NoExpand(rename.new_class)).into_owned();
            }

            if text.contains(&instantiation_marker) {
                text = instantiation
                    .replace_all(&text, NoExpand(&new_instantiation))
                    .into_owned();
            }

            (text != line).then(|| LineEdit {
                line: index,
                original: line.to_string(),
                replacement: text,
            })
        })
        .collect()
}

/// Rewrite one referencing line.
///
/// `use` lines get their fully-qualified name swapped when the namespace
/// changed; every other line has each word-bounded occurrence of the old
/// name replaced. Returns `None` when the line would be unchanged.
pub fn rewrite_reference_line(line: &str, kind: ReferenceKind, rename: &Rename<'_>) -> Option<String> {
    let (pattern, replacement) = match (kind, rename.namespace_change()) {
        (ReferenceKind::Use, Some((old_ns, new_ns))) => (
            format!(r"\b{}\b", regex::escape(&format!("{}\\{}", old_ns, rename.old_class))),
            format!("{}\\{}", new_ns, rename.new_class),
        ),
        _ => (
            format!(r"\b{}\b", regex::escape(rename.old_class)),
            rename.new_class.to_string(),
        ),
    };

    let re = Regex::new(&pattern).ok()?;
    let rewritten = re.replace_all(line, NoExpand(&replacement));
    (rewritten != line).then(|| rewritten.into_owned())
}

/// Edits for every matched line of one file.
///
/// `matches` must all belong to the file whose text is `content`.
pub fn reference_edits(content: &str, matches: &[ReferenceMatch], rename: &Rename<'_>) -> Vec<LineEdit> {
    let lines: Vec<&str> = content.lines().collect();
    matches
        .iter()
        .filter_map(|m| {
            let line = *lines.get(m.line)?;
            let replacement = rewrite_reference_line(line, m.kind, rename)?;
            Some(LineEdit {
                line: m.line,
                original: line.to_string(),
                replacement,
            })
        })
        .collect()
}

/// Apply whole-line edits to `content`, keeping every line terminator
/// (`\n` or `\r\n`) as it was.
pub fn apply_line_edits(content: &str, edits: &[LineEdit]) -> String {
    let mut out = String::with_capacity(content.len());
    for (index, raw) in content.split_inclusive('\n').enumerate() {
        match edits.iter().find(|e| e.line == index) {
            Some(edit) => {
                let body_len = raw
                    .strip_suffix("\r\n")
                    .or_else(|| raw.strip_suffix('\n'))
                    .map_or(raw.len(), str::len);
                out.push_str(&edit.replacement);
                out.push_str(&raw[body_len..]);
            }
            None => out.push_str(raw),
        }
    }
    out
}
