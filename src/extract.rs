/// Class and namespace declaration lookup.
///
/// Not a PHP parser: declarations are found with
/// line-anchored regular expressions, and only the first class in a file is
/// considered.
use std::sync::LazyLock;

use regex::Regex;

use crate::types::ClassDeclaration;

static CLASS_DECLARATION: LazyLock<Regex> = LazyLock::new(|| {
    // `class Foo`, `abstract class Foo`, `final class Foo` at the start of a line
    Regex::new(r"(?m)^(?:abstract\s+|final\s+)?class\s+(\w+)").unwrap()
});

static NAMESPACE_DECLARATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^namespace\s+([^;]+);").unwrap());

/// Find the first class declared in `content`.
///
/// Returns `None` for files without a class (interfaces, traits, plain
/// scripts, empty input).
pub fn extract_class(content: &str) -> Option<ClassDeclaration> {
    let caps = CLASS_DECLARATION.captures(content)?;
    let whole = caps.get(0)?;
    let name = caps.get(1)?.as_str().to_string();

    let line = content
        .lines()
        .position(|l| l.contains(whole.as_str()))
        // The declaration spans a line break (`class\nFoo`); fall back to the
        // line the match starts on.
        .unwrap_or_else(|| content[..whole.start()].matches('\n').count());

    Some(ClassDeclaration {
        name,
        namespace: extract_namespace(content),
        line,
    })
}

/// Find the first `namespace ...;` declaration in `content`.
pub fn extract_namespace(content: &str) -> Option<String> {
    NAMESPACE_DECLARATION
        .captures(content)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_with_namespace() {
        let content = "<?php\nnamespace App\\Services;\n\nclass UserService\n{\n}";
        assert_eq!(
            extract_class(content),
            Some(ClassDeclaration {
                name: "UserService".to_string(),
                namespace: Some("App\\Services".to_string()),
                line: 3,
            })
        );
    }

    #[test]
    fn modifiers_are_accepted() {
        for (content, expected) in [
            ("<?php\nabstract class Base {}", "Base"),
            ("<?php\nfinal class Sealed {}", "Sealed"),
            ("<?php\nclass Plain extends Base {}", "Plain"),
        ] {
            let class = extract_class(content).expect("class should be found");
            assert_eq!(class.name, expected);
            assert_eq!(class.line, 1);
            assert_eq!(class.namespace, None);
        }
    }

    #[test]
    fn interfaces_and_traits_are_not_classes() {
        assert_eq!(extract_class("<?php\ninterface Cacheable {}\n"), None);
        assert_eq!(extract_class("<?php\ntrait Loggable {}\n"), None);
    }

    #[test]
    fn empty_and_garbage_input() {
        assert_eq!(extract_class(""), None);
        assert_eq!(extract_class("not php at all {{{"), None);
    }

    #[test]
    fn indented_class_is_not_matched() {
        assert_eq!(extract_class("<?php\n    class Nested {}\n"), None);
    }

    #[test]
    fn only_first_class_is_used() {
        let content = "<?php\nclass First {}\nclass Second {}\n";
        assert_eq!(extract_class(content).map(|c| c.name), Some("First".to_string()));
    }

    #[test]
    fn crlf_line_endings() {
        let content = "<?php\r\nnamespace App\\Models;\r\n\r\nclass User\r\n{\r\n}\r\n";
        let class = extract_class(content).expect("class should be found");
        assert_eq!(class.name, "User");
        assert_eq!(class.line, 3);
        assert_eq!(class.namespace.as_deref(), Some("App\\Models"));
    }

    #[test]
    fn declaration_split_across_lines() {
        let content = "<?php\n\nclass\nSplit {}\n";
        let class = extract_class(content).expect("class should be found");
        assert_eq!(class.name, "Split");
        assert_eq!(class.line, 2);
    }
}
