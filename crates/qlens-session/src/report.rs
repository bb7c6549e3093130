//! Plain-text report rendering
//!
//! The report is deterministic: identical results, summary and clock always
//! produce byte-identical text. Timestamps are rendered in UTC.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use qlens_analyzer::PlanForest;
use qlens_core::{ColumnInfo, IndexColumn, TableSchema};

use crate::result::QueryAnalysisResult;
use crate::summary::SessionSummary;

const RULE_WIDTH: usize = 80;
const COLUMN_GAP: &str = "  ";

/// Source of the report timestamp
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always returns the same instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Renders a finished session as one text document
#[derive(Clone)]
pub struct ReportFormatter {
    clock: Arc<dyn Clock>,
}

impl ReportFormatter {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Formatter stamped with the current time
    pub fn system() -> Self {
        Self::new(Arc::new(SystemClock))
    }

    /// Renders the header, the executive summary and one section per result
    pub fn format(
        &self,
        results: &[QueryAnalysisResult],
        summary: &SessionSummary,
        include_actual: bool,
    ) -> String {
        let mut lines = Vec::new();

        self.write_header(&mut lines, summary, include_actual);
        write_summary(&mut lines, results, summary);
        for result in results {
            write_query(&mut lines, result);
        }

        let mut report = lines.join("\n");
        report.push('\n');
        report
    }

    fn write_header(&self, lines: &mut Vec<String>, summary: &SessionSummary, include_actual: bool) {
        let mode = if include_actual {
            "EXPLAIN + EXPLAIN ANALYZE"
        } else {
            "EXPLAIN"
        };

        lines.push(heavy_rule());
        lines.push("SQL ANALYSIS REPORT".to_string());
        lines.push(heavy_rule());
        lines.push(format!(
            "Generated: {}",
            self.clock.now().format("%Y-%m-%d %H:%M:%S UTC")
        ));
        lines.push(format!("Mode: {mode}"));
        lines.push(format!("Queries: {}", summary.total_queries));
    }
}

fn write_summary(lines: &mut Vec<String>, results: &[QueryAnalysisResult], summary: &SessionSummary) {
    let slowest = summary
        .slowest_query_index
        .and_then(|index| results.iter().find(|r| r.index == index))
        .map(|r| {
            format!(
                "{} (#{}, {})",
                r.request.label,
                r.index + 1,
                format_duration(r.duration.unwrap_or_default().as_secs_f64())
            )
        })
        .unwrap_or_else(|| "none".to_string());

    let rows = vec![
        vec!["Total queries:".to_string(), summary.total_queries.to_string()],
        vec!["Successful:".to_string(), summary.successful_queries.to_string()],
        vec!["Failed:".to_string(), summary.failed_queries.to_string()],
        vec![
            "Total execution time:".to_string(),
            format_duration(summary.total_execution_secs()),
        ],
        vec!["Total cost:".to_string(), summary.total_cost.to_string()],
        vec!["Slowest query:".to_string(), slowest],
        vec![
            "Full table scans:".to_string(),
            if summary.has_warnings { "yes" } else { "no" }.to_string(),
        ],
    ];

    lines.push(String::new());
    lines.push("EXECUTIVE SUMMARY".to_string());
    lines.push(light_rule());
    lines.extend(align_rows(&rows));
}

fn write_query(lines: &mut Vec<String>, result: &QueryAnalysisResult) {
    lines.push(String::new());
    lines.push(heavy_rule());
    lines.push(format!("QUERY {}: {}", result.index + 1, result.request.label));
    lines.push(heavy_rule());

    let status = match (&result.error, result.duration) {
        (Some(error), _) => format!("Status: ERROR - {error}"),
        (None, Some(duration)) => format!("Status: OK ({})", format_duration(duration.as_secs_f64())),
        (None, None) => "Status: OK".to_string(),
    };
    lines.push(status);

    lines.push(String::new());
    lines.push("SQL:".to_string());
    lines.push(result.request.raw_sql.clone());

    if let Some(actual) = &result.actual {
        write_plan(lines, "EXPLAIN ANALYZE:", actual);
    }
    if let Some(estimated) = &result.estimated {
        write_plan(lines, "EXPLAIN:", estimated);
    }

    if !result.warnings.is_empty() {
        lines.push(String::new());
        lines.push("WARNINGS:".to_string());
        for warning in &result.warnings {
            lines.push(format!(
                "- [{}] {}: {}",
                warning.severity.as_str(),
                warning.operation,
                warning.message
            ));
        }
    }

    if result.is_success() {
        for schema in &result.schemas {
            write_schema(lines, schema);
        }
    }
}

fn write_plan(lines: &mut Vec<String>, title: &str, forest: &PlanForest) {
    lines.push(String::new());
    lines.push(title.to_string());
    if forest.is_empty() {
        lines.push("(empty plan)".to_string());
    } else {
        lines.extend(forest.render().lines().map(str::to_string));
    }
}

fn write_schema(lines: &mut Vec<String>, schema: &TableSchema) {
    lines.push(String::new());
    lines.push(format!("TABLE: {}", schema.table));
    if schema.columns.is_empty() {
        lines.push("(no columns)".to_string());
    } else {
        let rows: Vec<Vec<String>> = schema.columns.iter().map(column_row).collect();
        lines.extend(align_table(
            &["Column", "Type", "Null", "Key", "Default", "Extra"],
            &rows,
        ));
    }

    lines.push(String::new());
    lines.push(format!("INDEXES: {}", schema.table));
    if schema.indexes.is_empty() {
        lines.push("(no indexes)".to_string());
    } else {
        let rows: Vec<Vec<String>> = schema.indexes.iter().map(index_row).collect();
        lines.extend(align_table(
            &["Name", "Column", "Seq", "Unique", "Type"],
            &rows,
        ));
    }
}

fn column_row(column: &ColumnInfo) -> Vec<String> {
    vec![
        column.name.clone(),
        column.data_type.clone(),
        yes_no(column.nullable).to_string(),
        column.key.as_str().to_string(),
        column.default_value.clone().unwrap_or_else(|| "NULL".to_string()),
        column.extra.clone(),
    ]
}

fn index_row(index: &IndexColumn) -> Vec<String> {
    vec![
        index.index_name.clone(),
        index.column_name.clone().unwrap_or_else(|| "-".to_string()),
        index.seq_in_index.to_string(),
        yes_no(index.is_unique).to_string(),
        index.index_type.clone(),
    ]
}

/// Header, dashed separator and rows, each column padded to its widest cell
fn align_table(headers: &[&str], rows: &[Vec<String>]) -> Vec<String> {
    let header: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    let separator: Vec<String> = column_widths(std::iter::once(&header).chain(rows))
        .into_iter()
        .map(|width| "-".repeat(width))
        .collect();

    let mut all = Vec::with_capacity(rows.len() + 2);
    all.push(header);
    all.push(separator);
    all.extend(rows.iter().cloned());
    align_rows(&all)
}

fn align_rows(rows: &[Vec<String>]) -> Vec<String> {
    let widths = column_widths(rows.iter());
    rows.iter()
        .map(|row| {
            row.iter()
                .zip(&widths)
                .map(|(cell, width)| format!("{cell:<width$}", width = *width))
                .collect::<Vec<_>>()
                .join(COLUMN_GAP)
                .trim_end()
                .to_string()
        })
        .collect()
}

fn column_widths<'a>(rows: impl Iterator<Item = &'a Vec<String>>) -> Vec<usize> {
    let mut widths: Vec<usize> = Vec::new();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            let len = cell.chars().count();
            match widths.get_mut(i) {
                Some(width) => *width = (*width).max(len),
                None => widths.push(len),
            }
        }
    }
    widths
}

fn format_duration(secs: f64) -> String {
    format!("{secs:.4}s")
}

fn yes_no(value: bool) -> &'static str {
    if value { "YES" } else { "NO" }
}

fn heavy_rule() -> String {
    "=".repeat(RULE_WIDTH)
}

fn light_rule() -> String {
    "-".repeat(RULE_WIDTH)
}

#[cfg(test)]
mod tests;
