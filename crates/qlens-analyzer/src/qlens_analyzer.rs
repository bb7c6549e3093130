//! qlens Analyzer - Lexical SQL checks and EXPLAIN tree parsing
//!
//! This crate provides functionality for:
//! - Classifying whether a SQL statement is safe to analyze
//! - Extracting referenced table identifiers
//! - Parsing indentation-based plan text into a typed node tree
//! - Flagging plan operations that deserve a warning

pub mod explain;
pub mod sql;
pub mod warnings;

pub use explain::*;
pub use sql::*;
pub use warnings::*;
