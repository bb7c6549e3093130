//! View models for the analysis request boundary
//!
//! These are DTOs designed for JSON consumption.

use indexmap::IndexMap;
use qlens_analyzer::{PlanForest, PlanWarning, SafetyVerdict};
use qlens_core::{ColumnInfo, IndexColumn, QueryRequest};
use serde::{Deserialize, Serialize};

use crate::result::QueryAnalysisResult;
use crate::summary::SessionSummary;

/// Incoming analysis request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    pub queries: Vec<QueryInput>,
    /// Also run EXPLAIN ANALYZE for each query
    #[serde(default)]
    pub include_analyze: bool,
}

/// One submitted query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryInput {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub label: String,
    pub query: String,
}

impl From<QueryInput> for QueryRequest {
    fn from(input: QueryInput) -> Self {
        QueryRequest::new(input.id, input.label, input.query)
    }
}

/// Response for a session, successful or rejected
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub success: bool,
    pub message: String,
    pub queries: Vec<QueryResultView>,
    pub summary: Option<SummaryView>,
    pub complete_output: Option<String>,
}

impl AnalyzeResponse {
    /// Response for a rejected request; nothing was analyzed
    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            queries: Vec::new(),
            summary: None,
            complete_output: None,
        }
    }
}

/// Per-query result for JSON consumption
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResultView {
    pub id: String,
    pub label: String,
    pub query: String,
    pub safety: SafetyVerdict,
    /// Seconds spent fetching and parsing; null when analysis did not run
    pub execution_time: Option<f64>,
    pub explain: Option<PlanForest>,
    pub analyze: Option<PlanForest>,
    pub referenced_tables: Vec<String>,
    pub tables: IndexMap<String, Vec<ColumnInfo>>,
    pub indexes: IndexMap<String, Vec<IndexColumn>>,
    pub warnings: Vec<PlanWarning>,
    pub error: Option<String>,
    pub error_kind: Option<String>,
}

impl From<&QueryAnalysisResult> for QueryResultView {
    fn from(result: &QueryAnalysisResult) -> Self {
        let mut tables = IndexMap::new();
        let mut indexes = IndexMap::new();
        for schema in &result.schemas {
            tables.insert(schema.table.clone(), schema.columns.clone());
            indexes.insert(schema.table.clone(), schema.indexes.clone());
        }

        Self {
            id: result.request.id.clone(),
            label: result.request.label.clone(),
            query: result.request.raw_sql.clone(),
            safety: result.verdict,
            execution_time: result.duration.map(|d| d.as_secs_f64()),
            explain: result.estimated.clone(),
            analyze: result.actual.clone(),
            referenced_tables: result.tables.clone(),
            tables,
            indexes,
            warnings: result.warnings.clone(),
            error: result.error_message(),
            error_kind: result.error.as_ref().map(|e| e.kind().to_string()),
        }
    }
}

/// Session summary for JSON consumption
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryView {
    pub total_queries: usize,
    pub successful_queries: usize,
    pub failed_queries: usize,
    /// Seconds
    pub total_execution_time: f64,
    pub total_cost: i64,
    pub slowest_query_index: Option<usize>,
    pub has_warnings: bool,
}

impl From<&SessionSummary> for SummaryView {
    fn from(summary: &SessionSummary) -> Self {
        Self {
            total_queries: summary.total_queries,
            successful_queries: summary.successful_queries,
            failed_queries: summary.failed_queries,
            total_execution_time: summary.total_execution_secs(),
            total_cost: summary.total_cost,
            slowest_query_index: summary.slowest_query_index,
            has_warnings: summary.has_warnings,
        }
    }
}
