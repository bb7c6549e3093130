//! Comment and literal masking shared by the classifier and the extractor

use regex::{Captures, Regex};
use std::sync::LazyLock;

// String literals are matched alongside comments so that `--` or `/*` inside a
// literal is never mistaken for the start of a comment. An unterminated block
// comment runs to the end of the text.
static LITERAL_OR_COMMENT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"'(?:[^'\\]|\\.)*'|"(?:[^"\\]|\\.)*"|--[^\n]*|/\*[\s\S]*?(?:\*/|$)"#)
        .expect("valid regex")
});

static STRING_LITERAL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"'(?:[^'\\]|\\.)*'|"(?:[^"\\]|\\.)*""#).expect("valid regex")
});

/// Removes `--` line comments and `/* ... */` block comments.
///
/// Each comment is replaced by a single space so tokens on either side stay
/// separate. String literals are left untouched.
///
/// # Example
///
/// ```
/// use qlens_analyzer::sql::strip_comments;
///
/// assert_eq!(strip_comments("SELECT 1 -- trailing"), "SELECT 1  ");
/// assert_eq!(strip_comments("SELECT/* x */1"), "SELECT 1");
/// assert_eq!(strip_comments("SELECT '--not a comment'"), "SELECT '--not a comment'");
/// ```
pub fn strip_comments(sql: &str) -> String {
    LITERAL_OR_COMMENT_REGEX
        .replace_all(sql, |caps: &Captures| {
            let matched = &caps[0];
            if matched.starts_with("--") || matched.starts_with("/*") {
                " ".to_string()
            } else {
                matched.to_string()
            }
        })
        .into_owned()
}

/// Replaces the contents of every quoted string literal with an empty literal
/// of the same quote style, so keywords inside literals cannot match.
pub fn mask_string_literals(sql: &str) -> String {
    STRING_LITERAL_REGEX
        .replace_all(sql, |caps: &Captures| {
            if caps[0].starts_with('"') {
                "\"\"".to_string()
            } else {
                "''".to_string()
            }
        })
        .into_owned()
}
