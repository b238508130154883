/// Workspace file discovery.
///
/// Walks the workspace for `.php` files, honouring `.gitignore` and skipping
/// hidden directories and dependency directories. Results are sorted so that
/// reference scans visit files in a stable order.
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

/// Directory names never descended into.
pub const EXCLUDED_DIRECTORIES: &[&str] = &["vendor", "node_modules"];

/// Whether `path` names a PHP source file.
pub fn is_php_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "php")
}

/// All PHP files under `root`.
pub fn php_files(root: &Path) -> Vec<PathBuf> {
    let walker = WalkBuilder::new(root)
        .require_git(false)
        .filter_entry(|entry| {
            let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
            !(is_dir
                && entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| EXCLUDED_DIRECTORIES.contains(&name)))
        })
        .build();

    let mut files: Vec<PathBuf> = walker
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                tracing::debug!("skipping unreadable entry: {err}");
                None
            }
        })
        .filter(|entry| entry.file_type().is_some_and(|t| t.is_file()))
        .map(|entry| entry.into_path())
        .filter(|path| is_php_file(path))
        .collect();

    files.sort();
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(root: &Path, relative: &str) {
        let full = root.join(relative);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).expect("failed to create dirs");
        }
        fs::write(&full, "<?php\n").expect("failed to write file");
    }

    #[test]
    fn finds_php_files_and_skips_dependencies() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let root = dir.path();
        touch(root, "app/Models/User.php");
        touch(root, "app/Services/UserService.php");
        touch(root, "routes/web.php");
        touch(root, "vendor/laravel/framework/src/Foundation/Application.php");
        touch(root, "node_modules/some-package/shim.php");
        touch(root, "resources/js/app.js");

        let files: Vec<PathBuf> = php_files(root)
            .into_iter()
            .map(|p| p.strip_prefix(root).unwrap().to_path_buf())
            .collect();

        assert_eq!(
            files,
            vec![
                PathBuf::from("app/Models/User.php"),
                PathBuf::from("app/Services/UserService.php"),
                PathBuf::from("routes/web.php"),
            ]
        );
    }

    #[test]
    fn gitignored_directories_are_skipped() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let root = dir.path();
        fs::write(root.join(".gitignore"), "storage/\n").expect("failed to write .gitignore");
        touch(root, "storage/framework/views/compiled.php");
        touch(root, "app/User.php");

        let files = php_files(root);
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("app/User.php"));
    }

    #[test]
    fn php_extension_check() {
        assert!(is_php_file(Path::new("/a/B.php")));
        assert!(!is_php_file(Path::new("/a/B.phtml")));
        assert!(!is_php_file(Path::new("/a/php")));
    }
}
