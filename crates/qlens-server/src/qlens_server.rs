//! qlens Server - HTTP boundary for the SQL analysis pipeline
//!
//! This crate provides:
//! - `router` - axum routes for `POST /api/analyze` and `GET /health`
//! - `MysqlCollaborator` - Plan and catalog retrieval over `mysql_async`
//! - `QlensConfig` - TOML configuration
//! - `logging` - tracing subscriber setup

mod config;
mod error;
pub mod logging;
mod mysql;
mod routes;

pub use config::*;
pub use error::ApiError;
pub use mysql::MysqlCollaborator;
pub use routes::{AppState, HealthResponse, router};
