//! Session aggregation
//!
//! A session takes an ordered list of requests, analyzes each one
//! independently and summarizes the outcome. Per-query failures are recorded
//! on that query's result; only a malformed request list fails the session.

mod executor;

pub use executor::{ExecutionMode, SessionAnalysis, SessionAnalyzer, SessionOptions};
