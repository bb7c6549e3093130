//! Analysis service
//!
//! Wraps a `SessionAnalyzer` and a `ReportFormatter` behind the request and
//! response DTOs.

use qlens_core::QueryRequest;

use crate::error::SessionResult;
use crate::report::ReportFormatter;
use crate::session::SessionAnalyzer;
use crate::view_models::{AnalyzeRequest, AnalyzeResponse, QueryResultView, SummaryView};

/// Service that runs a full analysis for one request
#[derive(Clone)]
pub struct AnalysisService {
    analyzer: SessionAnalyzer,
    formatter: ReportFormatter,
}

impl AnalysisService {
    pub fn new(analyzer: SessionAnalyzer, formatter: ReportFormatter) -> Self {
        Self {
            analyzer,
            formatter,
        }
    }

    /// Runs the session and renders the report
    ///
    /// Returns `Err` only when the request shape is invalid.
    #[tracing::instrument(skip(self, request), fields(queries = request.queries.len(), include_analyze = request.include_analyze))]
    pub async fn analyze(&self, request: AnalyzeRequest) -> SessionResult<AnalyzeResponse> {
        let include_actual = request.include_analyze;
        let requests: Vec<QueryRequest> = request.queries.into_iter().map(Into::into).collect();

        let analysis = self.analyzer.analyze_session(requests, include_actual).await?;
        let report = self
            .formatter
            .format(&analysis.results, &analysis.summary, include_actual);

        let summary = &analysis.summary;
        let message = format!(
            "Analyzed {} of {} queries",
            summary.successful_queries, summary.total_queries
        );

        Ok(AnalyzeResponse {
            success: true,
            message,
            queries: analysis.results.iter().map(QueryResultView::from).collect(),
            summary: Some(SummaryView::from(summary)),
            complete_output: Some(report),
        })
    }
}
