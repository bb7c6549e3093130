//! Table Reference Extractor
//!
//! Pulls table identifiers that follow `FROM` or `JOIN` out of a statement.
//! Nothing tracks parenthesis depth, so a table named inside a sub-select is
//! reported exactly like one in the outer query. Comma-separated table lists
//! only yield their first entry.

use regex::Regex;
use std::sync::LazyLock;

use super::comments::{mask_string_literals, strip_comments};

// The alias that may follow the identifier is deliberately not consumed, so
// `FROM a JOIN b` still sees the `JOIN` keyword that introduces `b`.
static TABLE_REFERENCE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:FROM|JOIN)\s+([A-Za-z0-9_.`\-]+)").expect("valid regex")
});

/// Extracts referenced table names in first-occurrence order, without
/// duplicates.
///
/// Backticks and surrounding whitespace are stripped; identifiers that end up
/// empty are dropped. An empty result means "no tables found", which callers
/// treat as a recoverable condition.
///
/// # Example
///
/// ```
/// use qlens_analyzer::sql::extract_tables;
///
/// let tables = extract_tables(
///     "SELECT * FROM `wp_posts` p JOIN wp_postmeta m ON p.ID=m.post_id",
/// );
/// assert_eq!(tables, vec!["wp_posts", "wp_postmeta"]);
/// ```
pub fn extract_tables(sql: &str) -> Vec<String> {
    let scanned = mask_string_literals(&strip_comments(sql));

    let mut tables: Vec<String> = Vec::new();
    for caps in TABLE_REFERENCE_REGEX.captures_iter(&scanned) {
        let name = clean_identifier(&caps[1]);
        if name.is_empty() || tables.contains(&name) {
            continue;
        }
        tables.push(name);
    }

    tracing::trace!(count = tables.len(), "extracted table references");
    tables
}

fn clean_identifier(raw: &str) -> String {
    raw.replace('`', "").trim().to_string()
}
