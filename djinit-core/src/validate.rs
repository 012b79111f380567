//! Project and app name validation.
//!
//! Rules are checked in order and the first failure is reported. Input is
//! trimmed before every check.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{CoreError, NameKind, NameRule};

const MIN_LEN: usize = 2;
const MAX_LEN: usize = 50;

static NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9_]*$").expect("name pattern is valid"));

const PYTHON_KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
    "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return",
    "try", "while", "with", "yield",
];

/// Modules compiled into the CPython interpreter. Underscore-prefixed ones
/// are already excluded by [`NAME_PATTERN`].
const PYTHON_BUILTIN_MODULES: &[&str] = &[
    "atexit", "builtins", "errno", "faulthandler", "gc", "itertools", "marshal", "posix",
    "pwd", "sys", "time", "xxsubtype",
];

/// Validate `name`, returning the trimmed form on success.
pub fn validate_name(name: &str, kind: NameKind) -> Result<String, CoreError> {
    let name = name.trim();
    let fail = |rule| Err(CoreError::InvalidName { kind, rule });

    if name.is_empty() {
        return fail(NameRule::Empty);
    }
    let len = name.chars().count();
    if len < MIN_LEN {
        return fail(NameRule::TooShort);
    }
    if len > MAX_LEN {
        return fail(NameRule::TooLong);
    }
    if !NAME_PATTERN.is_match(name) {
        return fail(NameRule::InvalidCharacters);
    }
    if PYTHON_KEYWORDS.contains(&name) {
        return fail(NameRule::Keyword(name.to_string()));
    }
    if PYTHON_BUILTIN_MODULES.contains(&name.to_lowercase().as_str()) {
        return fail(NameRule::BuiltinModule(name.to_string()));
    }
    Ok(name.to_string())
}

pub fn validate_project_name(name: &str) -> Result<String, CoreError> {
    validate_name(name, NameKind::Project)
}

pub fn validate_app_name(name: &str) -> Result<String, CoreError> {
    validate_name(name, NameKind::App)
}

/// Flatten `["users,orders", " blog "]` into `["users", "orders", "blog"]`,
/// dropping empties and repeats (first occurrence wins).
pub fn parse_app_names<S: AsRef<str>>(tokens: &[S]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for token in tokens {
        for part in token.as_ref().split(',') {
            let part = part.trim();
            if !part.is_empty() && !names.iter().any(|n| n == part) {
                names.push(part.to_string());
            }
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("shop")]
    #[case("  blog_posts ")]
    #[case("Api2")]
    #[case("ab")]
    fn accepts_valid_names(#[case] name: &str) {
        assert_eq!(validate_app_name(name).unwrap(), name.trim());
    }

    #[rstest]
    #[case("", NameRule::Empty)]
    #[case("   ", NameRule::Empty)]
    #[case("a", NameRule::TooShort)]
    #[case(&"a".repeat(51), NameRule::TooLong)]
    #[case("1shop", NameRule::InvalidCharacters)]
    #[case("my-shop", NameRule::InvalidCharacters)]
    #[case("_private", NameRule::InvalidCharacters)]
    #[case("class", NameRule::Keyword("class".to_string()))]
    #[case("sys", NameRule::BuiltinModule("sys".to_string()))]
    #[case("Time", NameRule::BuiltinModule("Time".to_string()))]
    fn rejects_invalid_names(#[case] name: &str, #[case] expected: NameRule) {
        match validate_project_name(name) {
            Err(CoreError::InvalidName { kind, rule }) => {
                assert_eq!(kind, NameKind::Project);
                assert_eq!(rule, expected);
            }
            other => panic!("expected InvalidName for {name:?}, got {other:?}"),
        }
    }

    #[test]
    fn fifty_chars_is_allowed() {
        assert!(validate_app_name(&"a".repeat(50)).is_ok());
    }

    #[test]
    fn error_message_names_the_kind() {
        let err = validate_app_name("for").unwrap_err();
        assert_eq!(
            err.to_string(),
            "App name 'for' is a Python keyword, choose a different name"
        );
    }

    #[test]
    fn app_names_are_split_and_deduplicated() {
        let names = parse_app_names(&["users,orders", " blog ", "users", ",,"]);
        assert_eq!(names, vec!["users", "orders", "blog"]);
        assert!(parse_app_names::<&str>(&[]).is_empty());
    }
}
