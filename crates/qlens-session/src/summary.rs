//! Session summary metrics

use std::time::Duration;

use crate::result::QueryAnalysisResult;

/// Aggregate metrics for one session
///
/// Only successful results contribute time, cost and warnings; every
/// submitted request counts toward `total_queries`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionSummary {
    pub total_queries: usize,
    pub successful_queries: usize,
    pub failed_queries: usize,
    pub total_execution_time: Duration,
    /// Sum of root costs, truncated toward zero
    pub total_cost: i64,
    /// Request index of the strictly slowest success; the earliest wins ties
    pub slowest_query_index: Option<usize>,
    /// Any successful estimated plan contains a table scan
    pub has_warnings: bool,
}

impl SessionSummary {
    /// Summarizes results ordered by request index
    pub fn from_results(results: &[QueryAnalysisResult]) -> Self {
        let mut summary = Self {
            total_queries: results.len(),
            ..Self::default()
        };
        let mut total_cost = 0.0_f64;
        let mut slowest: Option<(usize, Duration)> = None;

        for result in results.iter().filter(|r| r.is_success()) {
            summary.successful_queries += 1;
            total_cost += result.root_cost().unwrap_or(0.0);
            summary.has_warnings |= result.has_table_scans();

            let Some(duration) = result.duration else {
                continue;
            };
            summary.total_execution_time += duration;
            if slowest.is_none_or(|(_, longest)| duration > longest) {
                slowest = Some((result.index, duration));
            }
        }

        summary.failed_queries = summary.total_queries - summary.successful_queries;
        summary.total_cost = total_cost as i64;
        summary.slowest_query_index = slowest.map(|(index, _)| index);
        summary
    }

    /// Total execution time in seconds
    pub fn total_execution_secs(&self) -> f64 {
        self.total_execution_time.as_secs_f64()
    }
}
