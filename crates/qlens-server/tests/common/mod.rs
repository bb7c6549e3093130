//! Common test utilities and mocks

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use chrono::TimeZone;
use qlens_core::{
    ColumnInfo, ColumnKey, IndexColumn, PlanFetcher, PlanMode, QlensError, Result, SchemaFetcher,
};
use qlens_server::{AppState, ServerConfig, router};
use qlens_session::{AnalysisService, FixedClock, ReportFormatter, SessionAnalyzer, SessionOptions};

/// Mock database answering plan and catalog lookups without a server.
///
/// Plans are chosen by SQL substring; unmatched SQL gets a table scan.
pub struct MockDatabase {
    pub plans: Vec<(String, String)>,
    pub failures: Vec<String>,
    pub panics: Vec<String>,
    pub fetch_log: Arc<parking_lot::Mutex<Vec<String>>>,
}

impl MockDatabase {
    pub fn new() -> Self {
        Self {
            plans: vec![],
            failures: vec![],
            panics: vec![],
            fetch_log: Arc::new(parking_lot::Mutex::new(Vec::new())),
        }
    }

    /// Register a plan for SQL containing the given pattern.
    pub fn with_plan(mut self, sql_contains: impl Into<String>, plan: impl Into<String>) -> Self {
        self.plans.push((sql_contains.into(), plan.into()));
        self
    }

    pub fn with_failure(mut self, sql_contains: impl Into<String>) -> Self {
        self.failures.push(sql_contains.into());
        self
    }

    pub fn with_panic(mut self, sql_contains: impl Into<String>) -> Self {
        self.panics.push(sql_contains.into());
        self
    }

    pub fn fetch_log(&self) -> Vec<String> {
        self.fetch_log.lock().clone()
    }
}

#[async_trait]
impl PlanFetcher for MockDatabase {
    async fn fetch_plan(&self, sql: &str, mode: PlanMode) -> Result<String> {
        self.fetch_log.lock().push(format!("{mode}: {sql}"));

        if self.panics.iter().any(|p| sql.contains(p.as_str())) {
            panic!("mock database crashed");
        }
        if self.failures.iter().any(|p| sql.contains(p.as_str())) {
            return Err(QlensError::Query("Table 'app.missing' doesn't exist".into()));
        }

        let plan = self
            .plans
            .iter()
            .find(|(pattern, _)| sql.contains(pattern.as_str()))
            .map(|(_, plan)| plan.clone())
            .unwrap_or_else(|| "-> Table scan on t  (cost=1.00 rows=10)".to_string());

        Ok(match mode {
            PlanMode::Estimated => plan,
            PlanMode::Actual => format!("{plan} (actual time=0.010..0.020 rows=10 loops=1)"),
        })
    }
}

#[async_trait]
impl SchemaFetcher for MockDatabase {
    async fn get_columns(&self, _table: &str) -> Result<Vec<ColumnInfo>> {
        Ok(vec![
            ColumnInfo::new("id", "bigint")
                .not_null()
                .with_key(ColumnKey::Primary),
            ColumnInfo::new("title", "varchar(255)"),
        ])
    }

    async fn get_indexes(&self, _table: &str) -> Result<Vec<IndexColumn>> {
        Ok(vec![IndexColumn::new("PRIMARY", "id", 1).unique()])
    }
}

/// Build a router over the mock with a fixed report clock.
pub fn test_router(db: Arc<MockDatabase>, options: SessionOptions) -> Router {
    let analyzer = SessionAnalyzer::with_options(db.clone(), db, options);
    let instant = chrono::Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
    let formatter = ReportFormatter::new(Arc::new(FixedClock(instant)));
    let service = AnalysisService::new(analyzer, formatter);
    router(AppState::new(service), &ServerConfig::default())
}
