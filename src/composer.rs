/// Composer autoload support.
///
/// This module parses `composer.json` to extract PSR-4 autoload mappings and
/// derives the project's root namespace and source directory from them.
///
/// # Source root detection
///
/// Given a mapping like `"App\\" => "app/"`, the root namespace is `App` and
/// the source directory is `app`. Only the `autoload` section is considered
/// (never `autoload-dev`), and only single-segment prefixes qualify, since a
/// namespace such as `Database\Factories\` does not root the project.
use std::path::Path;

use crate::config::ConfigLayer;

/// A single PSR-4 namespace-to-directory mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Psr4Mapping {
    /// The namespace prefix, always ending with `\` (e.g. `"App\"`).
    pub prefix: String,
    /// The base directory path relative to the workspace root (e.g. `"app/"`).
    pub base_path: String,
    /// Whether the mapping came from `autoload-dev`.
    pub dev: bool,
}

impl Psr4Mapping {
    /// The prefix without its trailing `\`.
    pub fn namespace(&self) -> &str {
        self.prefix.trim_end_matches('\\')
    }

    /// The last component of the base path (`"src/Acme/"` → `"Acme"`).
    pub fn directory_name(&self) -> Option<&str> {
        self.base_path.split('/').rfind(|part| !part.is_empty() && *part != ".")
    }
}

/// Parse a `composer.json` file at the given workspace root and extract all
/// PSR-4 autoload mappings from both `autoload` and `autoload-dev` sections.
///
/// Returns an empty `Vec` if the file doesn't exist, can't be read, or
/// contains no PSR-4 mappings.
pub fn parse_composer_json(workspace_root: &Path) -> Vec<Psr4Mapping> {
    let composer_path = workspace_root.join("composer.json");
    let content = match std::fs::read_to_string(&composer_path) {
        Ok(c) => c,
        Err(_) => return Vec::new(),
    };

    let json: serde_json::Value = match serde_json::from_str(&content) {
        Ok(v) => v,
        Err(err) => {
            tracing::warn!("could not parse {}: {err}", composer_path.display());
            return Vec::new();
        }
    };

    let mut mappings = Vec::new();

    for (section_key, dev) in [("autoload", false), ("autoload-dev", true)] {
        if let Some(section) = json.get(section_key)
            && let Some(psr4) = section.get("psr-4")
            && let Some(psr4_obj) = psr4.as_object()
        {
            for (prefix, paths) in psr4_obj {
                extract_psr4_entries(prefix, paths, dev, &mut mappings);
            }
        }
    }

    mappings
}

/// Extract PSR-4 entries from a single prefix → path(s) pair.
///
/// The value can be either a string (`"src/"`) or an array of strings
/// (`["src/", "lib/"]`).
fn extract_psr4_entries(
    prefix: &str,
    paths: &serde_json::Value,
    dev: bool,
    mappings: &mut Vec<Psr4Mapping>,
) {
    let normalised_prefix = if prefix.ends_with('\\') || prefix.is_empty() {
        prefix.to_string()
    } else {
        format!("{}\\", prefix)
    };

    let push = |mappings: &mut Vec<Psr4Mapping>, path: &str| {
        mappings.push(Psr4Mapping {
            prefix: normalised_prefix.clone(),
            base_path: normalise_path(path),
            dev,
        });
    };

    match paths {
        serde_json::Value::String(path) => push(mappings, path),
        serde_json::Value::Array(arr) => {
            for path in arr.iter().filter_map(|entry| entry.as_str()) {
                push(mappings, path);
            }
        }
        _ => {}
    }
}

/// Normalise a directory path: ensure it uses forward slashes and ends with `/`.
fn normalise_path(path: &str) -> String {
    let p = path.replace('\\', "/");
    if p.ends_with('/') || p.is_empty() {
        p
    } else {
        format!("{}/", p)
    }
}

/// Pick the mapping that roots the project: a non-dev, single-segment prefix
/// with a named base directory. Ties go to the alphabetically first prefix.
pub fn source_root(mappings: &[Psr4Mapping]) -> Option<&Psr4Mapping> {
    mappings
        .iter()
        .filter(|m| !m.dev)
        .filter(|m| {
            let ns = m.namespace();
            !ns.is_empty() && !ns.contains('\\')
        })
        .filter(|m| m.directory_name().is_some())
        .min_by(|a, b| a.prefix.cmp(&b.prefix))
}

/// Config layer carrying the root namespace and source directory found in
/// the workspace's `composer.json`, if any.
pub fn source_root_layer(workspace_root: &Path) -> Option<ConfigLayer> {
    let mappings = parse_composer_json(workspace_root);
    let root = source_root(&mappings)?;
    Some(ConfigLayer {
        root_namespace: Some(root.namespace().to_string()),
        source_directory: root.directory_name().map(str::to_string),
        ..ConfigLayer::default()
    })
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    /// Helper: a temporary workspace holding a composer.json.
    struct TestWorkspace {
        dir: tempfile::TempDir,
    }

    impl TestWorkspace {
        fn new(composer_json: &str) -> Self {
            let dir = tempfile::tempdir().expect("failed to create temp dir");
            fs::write(dir.path().join("composer.json"), composer_json)
                .expect("failed to write composer.json");
            TestWorkspace { dir }
        }

        fn root(&self) -> &Path {
            self.dir.path()
        }
    }

    #[test]
    fn test_parse_basic_psr4() {
        let ws = TestWorkspace::new(
            r#"{
                "autoload": {
                    "psr-4": {
                        "App\\": "app/"
                    }
                }
            }"#,
        );

        let mappings = parse_composer_json(ws.root());
        assert_eq!(mappings.len(), 1);
        assert_eq!(mappings[0].prefix, "App\\");
        assert_eq!(mappings[0].base_path, "app/");
        assert!(!mappings[0].dev);
    }

    #[test]
    fn test_parse_autoload_dev_is_flagged() {
        let ws = TestWorkspace::new(
            r#"{
                "autoload": { "psr-4": { "App\\": "app/" } },
                "autoload-dev": { "psr-4": { "Tests\\": "tests/" } }
            }"#,
        );

        let mappings = parse_composer_json(ws.root());
        assert_eq!(mappings.len(), 2);
        assert!(mappings.iter().any(|m| m.prefix == "Tests\\" && m.dev));
        assert!(mappings.iter().any(|m| m.prefix == "App\\" && !m.dev));
    }

    #[test]
    fn test_parse_array_paths() {
        let ws = TestWorkspace::new(
            r#"{
                "autoload": {
                    "psr-4": {
                        "App\\": ["src/", "lib/"]
                    }
                }
            }"#,
        );

        let mappings = parse_composer_json(ws.root());
        assert_eq!(mappings.len(), 2);
        assert_eq!(mappings[0].base_path, "src/");
        assert_eq!(mappings[1].base_path, "lib/");
    }

    #[test]
    fn test_parse_missing_or_invalid() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        assert!(parse_composer_json(dir.path()).is_empty());

        let ws = TestWorkspace::new("not valid json {{{");
        assert!(parse_composer_json(ws.root()).is_empty());
    }

    #[test]
    fn test_prefix_without_trailing_backslash() {
        let ws = TestWorkspace::new(r#"{ "autoload": { "psr-4": { "App": "src" } } }"#);
        let mappings = parse_composer_json(ws.root());
        assert_eq!(mappings[0].prefix, "App\\");
        assert_eq!(mappings[0].base_path, "src/");
    }

    #[test]
    fn test_normalise_path() {
        assert_eq!(normalise_path("src"), "src/");
        assert_eq!(normalise_path("src/"), "src/");
        assert_eq!(normalise_path(""), "");
        assert_eq!(normalise_path("src\\Klarna\\"), "src/Klarna/");
    }

    #[test]
    fn test_laravel_source_root() {
        let ws = TestWorkspace::new(
            r#"{
                "autoload": {
                    "psr-4": {
                        "App\\": "app/",
                        "Database\\Factories\\": "database/factories/",
                        "Database\\Seeders\\": "database/seeders/"
                    }
                },
                "autoload-dev": { "psr-4": { "Tests\\": "tests/" } }
            }"#,
        );

        let layer = source_root_layer(ws.root()).expect("App mapping should root the project");
        assert_eq!(layer.root_namespace.as_deref(), Some("App"));
        assert_eq!(layer.source_directory.as_deref(), Some("app"));
        assert_eq!(layer.auto_update, None);
    }

    #[test]
    fn test_nested_base_path_uses_last_component() {
        let ws = TestWorkspace::new(r#"{ "autoload": { "psr-4": { "Acme\\": "./src/Acme" } } }"#);
        let layer = source_root_layer(ws.root()).unwrap();
        assert_eq!(layer.root_namespace.as_deref(), Some("Acme"));
        assert_eq!(layer.source_directory.as_deref(), Some("Acme"));
    }

    #[test]
    fn test_no_source_root_for_fallback_or_dev_only() {
        let ws = TestWorkspace::new(
            r#"{
                "autoload": { "psr-4": { "": "src/" } },
                "autoload-dev": { "psr-4": { "Tests\\": "tests/" } }
            }"#,
        );
        assert_eq!(source_root_layer(ws.root()), None);
    }
}
