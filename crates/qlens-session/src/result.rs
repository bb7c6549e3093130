//! Per-query analysis results

use std::time::Duration;

use qlens_analyzer::{PlanForest, PlanWarning, SafetyVerdict};
use qlens_core::{QueryRequest, TableSchema};

use crate::error::QueryError;

/// Everything the session learned about one submitted query
///
/// A failed result never carries plans, schemas or a duration. Blocked
/// queries carry no tables either.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryAnalysisResult {
    /// Position in the submitted request list
    pub index: usize,
    pub request: QueryRequest,
    pub verdict: SafetyVerdict,
    /// Tables referenced by the SQL, in first-occurrence order
    pub tables: Vec<String>,
    pub estimated: Option<PlanForest>,
    pub actual: Option<PlanForest>,
    /// Metadata for each referenced table, in `tables` order
    pub schemas: Vec<TableSchema>,
    pub warnings: Vec<PlanWarning>,
    /// Wall-clock time spent fetching and parsing, present only on success
    pub duration: Option<Duration>,
    pub error: Option<QueryError>,
}

/// The parsed output of a successful fetch
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FetchedAnalysis {
    pub estimated: PlanForest,
    pub actual: Option<PlanForest>,
    pub schemas: Vec<TableSchema>,
    pub warnings: Vec<PlanWarning>,
}

impl QueryAnalysisResult {
    /// Creates a successful result
    pub fn success(
        index: usize,
        request: QueryRequest,
        tables: Vec<String>,
        fetched: FetchedAnalysis,
        duration: Duration,
    ) -> Self {
        Self {
            index,
            request,
            verdict: SafetyVerdict::Safe,
            tables,
            estimated: Some(fetched.estimated),
            actual: fetched.actual,
            schemas: fetched.schemas,
            warnings: fetched.warnings,
            duration: Some(duration),
            error: None,
        }
    }

    /// Creates a failed result; the verdict follows from the error
    pub fn failed(index: usize, request: QueryRequest, tables: Vec<String>, error: QueryError) -> Self {
        let verdict = match &error {
            QueryError::BlockedStatement(reason) => SafetyVerdict::blocked(*reason),
            _ => SafetyVerdict::Safe,
        };
        Self {
            index,
            request,
            verdict,
            tables,
            estimated: None,
            actual: None,
            schemas: Vec::new(),
            warnings: Vec::new(),
            duration: None,
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }

    /// Error text shown to callers
    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(|e| e.to_string())
    }

    /// Root cost of the estimated plan, if any
    pub fn root_cost(&self) -> Option<f64> {
        self.estimated.as_ref().and_then(|f| f.root_cost())
    }

    /// Returns true if the estimated plan reads any table in full
    pub fn has_table_scans(&self) -> bool {
        self.estimated.as_ref().is_some_and(|f| f.has_table_scans())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qlens_analyzer::{BlockReason, PlanNode};
    use pretty_assertions::assert_eq;

    fn request() -> QueryRequest {
        QueryRequest::new("q1", "Query 1", "SELECT * FROM t")
    }

    #[test]
    fn test_blocked_result_has_no_analysis() {
        let result = QueryAnalysisResult::failed(
            0,
            request(),
            vec![],
            QueryError::BlockedStatement(BlockReason::DestructiveStatement),
        );

        assert!(result.is_failed());
        assert!(result.verdict.is_blocked());
        assert_eq!(result.error_message().as_deref(), Some("destructive statement"));
        assert_eq!(result.duration, None);
        assert_eq!(result.estimated, None);
        assert_eq!(result.root_cost(), None);
    }

    #[test]
    fn test_fetch_failure_keeps_tables() {
        let result = QueryAnalysisResult::failed(
            1,
            request(),
            vec!["t".to_string()],
            QueryError::FetchFailure("connection refused".to_string()),
        );

        assert!(result.verdict.is_safe());
        assert_eq!(result.tables, vec!["t"]);
        assert!(result.schemas.is_empty());
        assert_eq!(result.error.as_ref().map(|e| e.kind()), Some("fetch_failure"));
    }

    #[test]
    fn test_success_exposes_root_cost() {
        let fetched = FetchedAnalysis {
            estimated: PlanForest::new(vec![PlanNode::new("Table scan on t", 0).with_cost(4.2)]),
            ..Default::default()
        };
        let result = QueryAnalysisResult::success(
            0,
            request(),
            vec!["t".to_string()],
            fetched,
            Duration::from_millis(5),
        );

        assert!(result.is_success());
        assert_eq!(result.root_cost(), Some(4.2));
        assert!(result.has_table_scans());
        assert_eq!(result.duration, Some(Duration::from_millis(5)));
    }
}
