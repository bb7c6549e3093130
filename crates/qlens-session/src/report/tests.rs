use super::*;
use std::time::Duration;

use chrono::TimeZone;
use indoc::indoc;
use pretty_assertions::assert_eq;
use qlens_analyzer::{BlockReason, PlanMode, detect_warnings, parse_plan};
use qlens_core::{ColumnKey, QueryRequest};

use crate::error::QueryError;
use crate::result::FetchedAnalysis;

fn fixed_formatter() -> ReportFormatter {
    let instant = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
    ReportFormatter::new(Arc::new(FixedClock(instant)))
}

fn sample_results() -> Vec<QueryAnalysisResult> {
    let blocked = QueryAnalysisResult::failed(
        0,
        QueryRequest::new("q1", "Query 1", "DROP TABLE t"),
        Vec::new(),
        QueryError::BlockedStatement(BlockReason::DestructiveStatement),
    );

    let estimated = parse_plan(
        "-> Filter: (t.id = 5)  (cost=1.25 rows=1)\n    -> Table scan on t  (cost=1.00 rows=10)",
        PlanMode::Estimated,
    );
    let schema = TableSchema::new("t")
        .with_columns(vec![
            ColumnInfo::new("id", "bigint")
                .not_null()
                .with_key(ColumnKey::Primary)
                .with_extra("auto_increment"),
            ColumnInfo::new("title", "varchar(255)"),
        ])
        .with_indexes(vec![IndexColumn::new("PRIMARY", "id", 1).unique()]);
    let fetched = FetchedAnalysis {
        warnings: detect_warnings(&estimated),
        estimated,
        actual: None,
        schemas: vec![schema],
    };
    let success = QueryAnalysisResult::success(
        1,
        QueryRequest::new("q2", "Recent posts", "SELECT * FROM t WHERE id = 5"),
        vec!["t".to_string()],
        fetched,
        Duration::from_millis(12),
    );

    vec![blocked, success]
}

#[test]
fn test_full_report_layout() {
    let results = sample_results();
    let summary = SessionSummary::from_results(&results);
    let report = fixed_formatter().format(&results, &summary, false);

    let expected = indoc! {"
        ================================================================================
        SQL ANALYSIS REPORT
        ================================================================================
        Generated: 2026-01-02 03:04:05 UTC
        Mode: EXPLAIN
        Queries: 2

        EXECUTIVE SUMMARY
        --------------------------------------------------------------------------------
        Total queries:         2
        Successful:            1
        Failed:                1
        Total execution time:  0.0120s
        Total cost:            1
        Slowest query:         Recent posts (#2, 0.0120s)
        Full table scans:      yes

        ================================================================================
        QUERY 1: Query 1
        ================================================================================
        Status: ERROR - destructive statement

        SQL:
        DROP TABLE t

        ================================================================================
        QUERY 2: Recent posts
        ================================================================================
        Status: OK (0.0120s)

        SQL:
        SELECT * FROM t WHERE id = 5

        EXPLAIN:
        -> Filter: (t.id = 5)  (cost=1.25 rows=1)
            -> Table scan on t  (cost=1.00 rows=10)

        WARNINGS:
        - [warning] Table scan on t: Full table scan detected (10 estimated rows)

        TABLE: t
        Column  Type          Null  Key  Default  Extra
        ------  ------------  ----  ---  -------  --------------
        id      bigint        NO    PRI  NULL     auto_increment
        title   varchar(255)  YES        NULL

        INDEXES: t
        Name     Column  Seq  Unique  Type
        -------  ------  ---  ------  -----
        PRIMARY  id      1    YES     BTREE
    "};

    assert_eq!(report, expected);
}

#[test]
fn test_report_is_deterministic() {
    let results = sample_results();
    let summary = SessionSummary::from_results(&results);
    let formatter = fixed_formatter();

    assert_eq!(
        formatter.format(&results, &summary, true),
        formatter.format(&results, &summary, true)
    );
}

#[test]
fn test_actual_plan_precedes_estimated_plan() {
    let mut results = sample_results();
    results[1].actual = Some(parse_plan(
        "-> Table scan on t  (cost=1.00 rows=10) (actual time=0.010..0.020 rows=10 loops=1)",
        PlanMode::Actual,
    ));
    let summary = SessionSummary::from_results(&results);
    let report = fixed_formatter().format(&results, &summary, true);

    assert!(report.contains("Mode: EXPLAIN + EXPLAIN ANALYZE"));
    assert!(report.contains(
        "EXPLAIN ANALYZE:\n-> Table scan on t  (cost=1.00 rows=10) (actual time=0.010..0.020 rows=10 loops=1)"
    ));
    let actual_at = report.find("EXPLAIN ANALYZE:").unwrap();
    let estimated_at = report.find("\nEXPLAIN:\n").unwrap();
    assert!(actual_at < estimated_at);
}

#[test]
fn test_empty_schema_and_plan_placeholders() {
    let fetched = FetchedAnalysis {
        schemas: vec![TableSchema::new("v")],
        ..Default::default()
    };
    let results = vec![QueryAnalysisResult::success(
        0,
        QueryRequest::new("q1", "View read", "SELECT * FROM v"),
        vec!["v".to_string()],
        fetched,
        Duration::from_millis(1),
    )];
    let summary = SessionSummary::from_results(&results);
    let report = fixed_formatter().format(&results, &summary, false);

    assert!(report.contains("EXPLAIN:\n(empty plan)\n"));
    assert!(report.contains("TABLE: v\n(no columns)\n"));
    assert!(report.contains("INDEXES: v\n(no indexes)\n"));
    assert!(report.contains("Slowest query:         View read (#1, 0.0010s)"));
}

#[test]
fn test_no_successes_reports_none() {
    let results = vec![sample_results().remove(0)];
    let summary = SessionSummary::from_results(&results);
    let report = fixed_formatter().format(&results, &summary, false);

    assert!(report.contains("Slowest query:         none"));
    assert!(report.contains("Full table scans:      no"));
    assert!(!report.contains("TABLE:"));
}

#[test]
fn test_sql_is_printed_as_submitted() {
    let sql = "  SELECT *\n  FROM t\n  WHERE id = 5;  ";
    let results = vec![QueryAnalysisResult::failed(
        0,
        QueryRequest::new("q1", "Indented", sql),
        vec!["t".to_string()],
        QueryError::FetchFailure("Query error: gone".into()),
    )];
    let summary = SessionSummary::from_results(&results);
    let report = fixed_formatter().format(&results, &summary, false);

    assert!(report.contains(&format!("SQL:\n{sql}\n")));
}
