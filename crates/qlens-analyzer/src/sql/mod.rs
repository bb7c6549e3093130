//! Lexical SQL analysis
//!
//! Only enough lexical work to decide statement intent and find table names;
//! this is not a SQL grammar.

mod comments;
pub mod safety;
pub mod tables;

pub use comments::{mask_string_literals, strip_comments};
pub use safety::{BlockReason, SafetyPolicy, SafetyVerdict, classify, classify_with};
pub use tables::extract_tables;
