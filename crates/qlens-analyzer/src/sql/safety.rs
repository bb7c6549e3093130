//! Statement Safety Classifier
//!
//! Decides whether a raw SQL string may be sent for plan analysis. The check
//! is a front-anchored heuristic over comment-stripped text:
//!
//! 1. A leading destructive keyword (`INSERT`, `UPDATE`, `DELETE`, `DROP`,
//!    `TRUNCATE`, `ALTER`, `CREATE`, `GRANT`, `REVOKE`) blocks the statement.
//! 2. A dangerous construct anywhere (`EXEC(`, `INTO OUTFILE`,
//!    `INTO DUMPFILE`, `LOAD_FILE(`) blocks the statement.
//!
//! A second statement appended after `;` is not inspected by [`classify`].
//! Use [`classify_with`] and a strict [`SafetyPolicy`] to reject such input.
//!
//! # Examples
//!
//! ```
//! use qlens_analyzer::sql::{classify, BlockReason, SafetyVerdict};
//!
//! assert_eq!(classify("/* note */ SELECT 1"), SafetyVerdict::Safe);
//! assert_eq!(
//!     classify("DROP TABLE wp_posts"),
//!     SafetyVerdict::blocked(BlockReason::DestructiveStatement)
//! );
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use super::comments::{mask_string_literals, strip_comments};

static DESTRUCTIVE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:INSERT|UPDATE|DELETE|DROP|TRUNCATE|ALTER|CREATE|GRANT|REVOKE)\b")
        .expect("valid regex")
});

static DISALLOWED_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bEXEC\s*\(|\bINTO\s+OUTFILE\b|\bINTO\s+DUMPFILE\b|\bLOAD_FILE\s*\(")
        .expect("valid regex")
});

/// Why a statement was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockReason {
    /// Statement starts with a data- or schema-modifying keyword
    DestructiveStatement,
    /// Statement uses a construct that reaches outside the database
    DisallowedConstruct,
    /// Statement text holds more than one statement (strict policy only)
    MultipleStatements,
}

impl BlockReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DestructiveStatement => "destructive statement",
            Self::DisallowedConstruct => "disallowed construct",
            Self::MultipleStatements => "multiple statements",
        }
    }
}

impl std::fmt::Display for BlockReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of classifying one statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SafetyVerdict {
    Safe,
    Blocked { reason: BlockReason },
}

impl SafetyVerdict {
    pub fn blocked(reason: BlockReason) -> Self {
        Self::Blocked { reason }
    }

    pub fn is_safe(&self) -> bool {
        matches!(self, Self::Safe)
    }

    pub fn is_blocked(&self) -> bool {
        matches!(self, Self::Blocked { .. })
    }

    pub fn reason(&self) -> Option<BlockReason> {
        match self {
            Self::Safe => None,
            Self::Blocked { reason } => Some(*reason),
        }
    }
}

/// Knobs for the classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SafetyPolicy {
    /// Refuse input that carries a second statement after a `;`
    pub reject_multiple_statements: bool,
}

impl SafetyPolicy {
    pub fn strict() -> Self {
        Self {
            reject_multiple_statements: true,
        }
    }
}

/// Classifies `sql` with the default (single-statement heuristic) policy
pub fn classify(sql: &str) -> SafetyVerdict {
    classify_with(sql, &SafetyPolicy::default())
}

/// Classifies `sql` under the given policy
pub fn classify_with(sql: &str, policy: &SafetyPolicy) -> SafetyVerdict {
    let stripped = strip_comments(sql);

    if DESTRUCTIVE_REGEX.is_match(&stripped) {
        return SafetyVerdict::blocked(BlockReason::DestructiveStatement);
    }

    if DISALLOWED_REGEX.is_match(&stripped) {
        return SafetyVerdict::blocked(BlockReason::DisallowedConstruct);
    }

    if policy.reject_multiple_statements && has_multiple_statements(&stripped) {
        return SafetyVerdict::blocked(BlockReason::MultipleStatements);
    }

    SafetyVerdict::Safe
}

/// True when a `;` outside string literals is followed by more statement text.
/// A lone trailing terminator is allowed.
fn has_multiple_statements(stripped: &str) -> bool {
    let masked = mask_string_literals(stripped);
    masked.trim_end().trim_end_matches(';').contains(';')
}
