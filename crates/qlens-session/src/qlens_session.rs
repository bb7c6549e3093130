//! qlens Session - Multi-query analysis
//!
//! Runs a batch of SQL statements through the analysis pipeline:
//!
//! - `SessionAnalyzer` - Classifies, extracts, fetches and parses each query
//! - `SessionSummary` - Aggregate metrics over a finished session
//! - `ReportFormatter` - Deterministic plain-text report
//! - `AnalysisService` - Request/response DTO boundary used by the server

mod error;
pub mod report;
mod result;
mod service;
pub mod session;
pub mod summary;
pub mod view_models;

pub use error::*;
pub use report::{Clock, FixedClock, ReportFormatter, SystemClock};
pub use result::*;
pub use service::AnalysisService;
pub use session::{ExecutionMode, SessionAnalysis, SessionAnalyzer, SessionOptions};
pub use summary::SessionSummary;
pub use view_models::*;
