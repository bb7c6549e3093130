//! qlens Core - Shared types and collaborator traits
//!
//! This crate provides the types every other qlens crate depends on:
//!
//! - `QueryRequest` - One caller-submitted SQL statement
//! - `PlanFetcher` - Capability that turns SQL into raw EXPLAIN text
//! - `SchemaFetcher` - Capability that returns column and index metadata
//! - `ColumnInfo`, `IndexColumn`, `TableSchema` - Catalog records
//! - `QlensError` - Error type raised by collaborators

mod error;
mod fetch;
mod schema;
mod types;

pub use error::*;
pub use fetch::*;
pub use schema::*;
pub use types::*;
