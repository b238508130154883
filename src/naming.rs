/// Class-name derivation from file paths.
///
/// A PHP file is expected to declare a class named after the file. This
/// module turns a path like `app/Http/Controllers/user-profile.php` into the
/// class name the file should declare (`UserProfileController`):
///
///   1. The `.php` extension is stripped.
///   2. Names containing `-`, `_` or `.` are folded to PascalCase: split on
///      runs of those characters, upper-case the first letter of each part,
///      lower-case the rest, concatenate.
///   3. An all-lowercase name only gets its first letter capitalised.
///   4. Anything else is assumed to already be in PascalCase.
///   5. With framework conventions enabled, files under a recognised
///      directory get that directory's suffix appended (unless already
///      present).
use std::path::Path;

/// Directory segment → class suffix, checked in this order. The first
/// segment found in the directory path wins.
pub const FRAMEWORK_SUFFIXES: &[(&str, &str)] = &[
    ("Controllers", "Controller"),
    ("Requests", "Request"),
    ("Jobs", "Job"),
    ("Events", "Event"),
    ("Listeners", "Listener"),
    ("Middleware", "Middleware"),
    ("Resources", "Resource"),
    ("Policies", "Policy"),
];

/// Derive the class name a file at `path` should declare.
pub fn class_name_from_path(path: &Path, framework_conventions: bool) -> String {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let base = file_name.strip_suffix(".php").unwrap_or(&file_name);
    let directory = path
        .parent()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_default();

    let folded = fold_base_name(base);
    if framework_conventions {
        apply_framework_suffix(folded, &directory)
    } else {
        folded
    }
}

/// Case-fold a bare file name (no extension) into a class name.
pub fn fold_base_name(base: &str) -> String {
    if base.contains(is_separator) {
        return base
            .split(is_separator)
            .filter(|part| !part.is_empty())
            .map(capitalize_lower_rest)
            .collect();
    }

    if base == base.to_lowercase() {
        return capitalize_first(base);
    }

    base.to_string()
}

/// Append the framework suffix for the first recognised segment in
/// `directory`, unless `class_name` already ends with it.
///
/// Segments are matched as substrings preceded by either path separator, so
/// `/app/Http/Controllers/Admin` counts as a controllers directory.
pub fn apply_framework_suffix(class_name: String, directory: &str) -> String {
    let hit = FRAMEWORK_SUFFIXES.iter().find(|(segment, _)| {
        directory.contains(&format!("/{segment}")) || directory.contains(&format!("\\{segment}"))
    });

    match hit {
        Some((_, suffix)) if !class_name.ends_with(suffix) => class_name + *suffix,
        _ => class_name,
    }
}

/// Whether `name` can be declared as a PHP class: a letter, `_` or
/// non-ASCII character, followed by any of those or digits.
pub fn is_valid_class_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    let is_start = |c: char| c.is_ascii_alphabetic() || c == '_' || !c.is_ascii();
    is_start(first) && chars.all(|c| is_start(c) || c.is_ascii_digit())
}

fn is_separator(c: char) -> bool {
    matches!(c, '-' | '_' | '.')
}

fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn capitalize_lower_rest(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.as_str().to_lowercase().chars())
            .collect(),
        None => String::new(),
    }
}
