/// Namespace derivation from file paths.
///
/// Given a configured source directory (`app`) and root namespace (`App`),
/// `/project/app/Http/Controllers/Admin/UserController.php` lives in
/// `App\Http\Controllers\Admin`. The source directory is located by the
/// first ASCII-case-insensitive `/<source>/` in the `/`-normalised path.
use std::path::Path;

/// Derive the namespace a file at `path` should declare.
///
/// Returns `None` when the path does not pass through the source directory.
pub fn namespace_from_path(path: &Path, root_namespace: &str, source_directory: &str) -> Option<String> {
    let mut normalized = path.to_string_lossy().replace('\\', "/");
    if !normalized.starts_with('/') {
        normalized.insert(0, '/');
    }

    // ASCII lowering keeps byte offsets aligned with `normalized`.
    let needle = format!("/{}/", source_directory.to_ascii_lowercase());
    let start = normalized.to_ascii_lowercase().find(&needle)?;
    let relative = &normalized[start + needle.len()..];

    let directory = match relative.rfind('/') {
        Some(idx) => &relative[..idx],
        None => "",
    };

    let parts: Vec<&str> = directory.split('/').filter(|p| !p.is_empty()).collect();
    if parts.is_empty() {
        return Some(root_namespace.to_string());
    }

    Some(format!("{}\\{}", root_namespace, parts.join("\\")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ns(path: &str) -> Option<String> {
        namespace_from_path(Path::new(path), "App", "app")
    }

    #[test]
    fn simple_path() {
        assert_eq!(ns("/project/app/Models/User.php").as_deref(), Some("App\\Models"));
    }

    #[test]
    fn nested_path() {
        assert_eq!(
            ns("/project/app/Http/Controllers/Admin/UserController.php").as_deref(),
            Some("App\\Http\\Controllers\\Admin")
        );
    }

    #[test]
    fn file_in_source_root_gets_root_namespace() {
        assert_eq!(ns("/project/app/User.php").as_deref(), Some("App"));
    }

    #[test]
    fn file_outside_source_directory_has_no_namespace() {
        assert_eq!(ns("/project/config/database.php"), None);
        assert_eq!(ns("/project/application/User.php"), None);
    }

    #[test]
    fn windows_separators_are_normalised() {
        assert_eq!(
            ns("C:\\project\\app\\Services\\UserService.php").as_deref(),
            Some("App\\Services")
        );
    }

    #[test]
    fn source_directory_match_ignores_case() {
        assert_eq!(ns("/project/App/Models/User.php").as_deref(), Some("App\\Models"));
    }

    #[test]
    fn duplicate_slashes_are_ignored() {
        assert_eq!(
            ns("/project/app//Http///Controllers/UserController.php").as_deref(),
            Some("App\\Http\\Controllers")
        );
    }

    #[test]
    fn relative_path_starting_at_source_directory() {
        assert_eq!(ns("app/Models/User.php").as_deref(), Some("App\\Models"));
    }

    #[test]
    fn custom_root_and_source() {
        assert_eq!(
            namespace_from_path(Path::new("/lib/src/Http/Client.php"), "Acme", "src").as_deref(),
            Some("Acme\\Http")
        );
    }

    #[test]
    fn first_occurrence_of_source_directory_wins() {
        assert_eq!(
            ns("/project/app/Modules/app/Thing.php").as_deref(),
            Some("App\\Modules\\app")
        );
    }
}
