//! Session executor implementation

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use qlens_analyzer::{SafetyPolicy, classify_with, detect_warnings, extract_tables, parse_plan};
use qlens_core::{PlanFetcher, PlanMode, QueryRequest, SchemaFetcher};
use serde::{Deserialize, Serialize};

use crate::error::{QueryError, SessionError, SessionResult};
use crate::result::{FetchedAnalysis, QueryAnalysisResult};
use crate::summary::SessionSummary;

/// Configuration options for a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionOptions {
    /// How queries in a session are scheduled
    pub mode: ExecutionMode,
    /// Maximum number of concurrent analyses (only applies to Parallel mode)
    pub max_parallelism: usize,
    /// Timeout per query in milliseconds (0 = no timeout)
    pub query_timeout_ms: u64,
    /// Refuse statement text holding more than one statement
    pub reject_multiple_statements: bool,
    /// Largest accepted request list (0 = unlimited)
    pub max_queries: usize,
}

impl SessionOptions {
    /// Create options for sequential execution
    pub fn sequential() -> Self {
        Self {
            mode: ExecutionMode::Sequential,
            ..Self::default()
        }
    }

    /// Create options for parallel execution
    pub fn parallel() -> Self {
        Self {
            mode: ExecutionMode::Parallel,
            ..Self::default()
        }
    }

    pub fn with_mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set maximum parallelism for parallel execution
    pub fn with_max_parallelism(mut self, max: usize) -> Self {
        self.max_parallelism = max.max(1);
        self
    }

    pub fn with_query_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.query_timeout_ms = timeout_ms;
        self
    }

    pub fn with_reject_multiple_statements(mut self, reject: bool) -> Self {
        self.reject_multiple_statements = reject;
        self
    }

    pub fn with_max_queries(mut self, max: usize) -> Self {
        self.max_queries = max;
        self
    }

    /// The per-query timeout, if one is configured
    pub fn query_timeout(&self) -> Option<Duration> {
        (self.query_timeout_ms > 0).then(|| Duration::from_millis(self.query_timeout_ms))
    }

    pub fn safety_policy(&self) -> SafetyPolicy {
        SafetyPolicy {
            reject_multiple_statements: self.reject_multiple_statements,
        }
    }
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            mode: ExecutionMode::Sequential,
            max_parallelism: 4,
            query_timeout_ms: 0,
            reject_multiple_statements: false,
            max_queries: 50,
        }
    }
}

/// Execution mode for a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// Analyze queries one at a time in order
    #[default]
    Sequential,
    /// Analyze queries concurrently; results are still returned in request order
    Parallel,
}

/// Results of a finished session, in request order, and their summary
#[derive(Debug, Clone)]
pub struct SessionAnalysis {
    pub results: Vec<QueryAnalysisResult>,
    pub summary: SessionSummary,
}

/// Runs sessions against a pair of collaborators
#[derive(Clone)]
pub struct SessionAnalyzer {
    pipeline: QueryPipeline,
    options: SessionOptions,
}

impl SessionAnalyzer {
    pub fn new(plans: Arc<dyn PlanFetcher>, schemas: Arc<dyn SchemaFetcher>) -> Self {
        Self::with_options(plans, schemas, SessionOptions::default())
    }

    pub fn with_options(
        plans: Arc<dyn PlanFetcher>,
        schemas: Arc<dyn SchemaFetcher>,
        options: SessionOptions,
    ) -> Self {
        Self {
            pipeline: QueryPipeline {
                plans,
                schemas,
                policy: options.safety_policy(),
                timeout: options.query_timeout(),
            },
            options,
        }
    }

    /// Checks the request list shape without analyzing anything
    pub fn validate(&self, requests: &[QueryRequest]) -> SessionResult<()> {
        if requests.is_empty() {
            return Err(SessionError::EmptyRequest);
        }
        if self.options.max_queries > 0 && requests.len() > self.options.max_queries {
            return Err(SessionError::TooManyQueries {
                count: requests.len(),
                max: self.options.max_queries,
            });
        }

        let mut seen = HashSet::with_capacity(requests.len());
        for (index, request) in requests.iter().enumerate() {
            if request.id.trim().is_empty() {
                return Err(SessionError::BlankQueryId(index));
            }
            if !seen.insert(request.id.as_str()) {
                return Err(SessionError::DuplicateQueryId(request.id.clone()));
            }
        }
        Ok(())
    }

    /// Analyzes every request and summarizes the session
    ///
    /// Fails only when the request list itself is invalid; every per-query
    /// problem is recorded on that query's result.
    #[tracing::instrument(skip(self, requests), fields(queries = requests.len(), mode = ?self.options.mode))]
    pub async fn analyze_session(
        &self,
        requests: Vec<QueryRequest>,
        include_actual: bool,
    ) -> SessionResult<SessionAnalysis> {
        self.validate(&requests)?;

        let requests: Vec<QueryRequest> = requests
            .into_iter()
            .enumerate()
            .map(|(index, request)| request.with_default_label(index))
            .collect();

        let start = Instant::now();
        let results = match self.options.mode {
            ExecutionMode::Sequential => self.run_sequential(requests, include_actual).await,
            ExecutionMode::Parallel => self.run_parallel(requests, include_actual).await,
        };
        let summary = SessionSummary::from_results(&results);

        tracing::info!(
            successful = summary.successful_queries,
            failed = summary.failed_queries,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "session analyzed"
        );

        Ok(SessionAnalysis { results, summary })
    }

    async fn run_sequential(
        &self,
        requests: Vec<QueryRequest>,
        include_actual: bool,
    ) -> Vec<QueryAnalysisResult> {
        let mut results = Vec::with_capacity(requests.len());
        for (index, request) in requests.into_iter().enumerate() {
            let pipeline = self.pipeline.clone();
            let fallback = request.clone();

            // Each query runs in its own task so a panicking collaborator only fails that query
            let handle =
                tokio::spawn(async move { pipeline.analyze(index, request, include_actual).await });
            results.push(join_result(index, fallback, handle.await));
        }
        results
    }

    async fn run_parallel(
        &self,
        requests: Vec<QueryRequest>,
        include_actual: bool,
    ) -> Vec<QueryAnalysisResult> {
        let semaphore = Arc::new(tokio::sync::Semaphore::new(self.options.max_parallelism.max(1)));
        let mut handles = Vec::with_capacity(requests.len());

        for (index, request) in requests.into_iter().enumerate() {
            let pipeline = self.pipeline.clone();
            let semaphore = semaphore.clone();
            let fallback = request.clone();

            let handle = tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                pipeline.analyze(index, request, include_actual).await
            });
            handles.push((index, fallback, handle));
        }

        // Awaiting in spawn order keeps results in request order
        let mut results = Vec::with_capacity(handles.len());
        for (index, request, handle) in handles {
            results.push(join_result(index, request, handle.await));
        }
        results
    }
}

/// Turns a finished analysis task into its result, recording a panic or cancellation as `TaskFailed`
fn join_result(
    index: usize,
    request: QueryRequest,
    joined: Result<QueryAnalysisResult, tokio::task::JoinError>,
) -> QueryAnalysisResult {
    match joined {
        Ok(result) => result,
        Err(e) => {
            tracing::error!(index, error = %e, "analysis task failed");
            QueryAnalysisResult::failed(index, request, Vec::new(), QueryError::TaskFailed(e.to_string()))
        }
    }
}

/// Shared per-query pipeline, cheap to clone into spawned tasks
#[derive(Clone)]
struct QueryPipeline {
    plans: Arc<dyn PlanFetcher>,
    schemas: Arc<dyn SchemaFetcher>,
    policy: SafetyPolicy,
    timeout: Option<Duration>,
}

impl QueryPipeline {
    #[tracing::instrument(skip(self, request), fields(id = %request.id))]
    async fn analyze(
        &self,
        index: usize,
        request: QueryRequest,
        include_actual: bool,
    ) -> QueryAnalysisResult {
        let verdict = classify_with(&request.raw_sql, &self.policy);
        if let Some(reason) = verdict.reason() {
            tracing::debug!(%reason, "query blocked");
            return QueryAnalysisResult::failed(
                index,
                request,
                Vec::new(),
                QueryError::BlockedStatement(reason),
            );
        }

        let tables = extract_tables(&request.raw_sql);
        if tables.is_empty() {
            return QueryAnalysisResult::failed(index, request, tables, QueryError::NoTablesFound);
        }

        let start = Instant::now();
        let fetched = match self.timeout {
            Some(limit) => {
                match tokio::time::timeout(limit, self.fetch(&request.raw_sql, &tables, include_actual))
                    .await
                {
                    Ok(fetched) => fetched,
                    Err(_) => Err(QueryError::Timeout(limit)),
                }
            }
            None => self.fetch(&request.raw_sql, &tables, include_actual).await,
        };
        let duration = start.elapsed();

        match fetched {
            Ok(fetched) => {
                tracing::debug!(duration_ms = duration.as_millis() as u64, "query analyzed");
                QueryAnalysisResult::success(index, request, tables, fetched, duration)
            }
            Err(e) => {
                tracing::warn!(error = %e, "query analysis failed");
                QueryAnalysisResult::failed(index, request, tables, e)
            }
        }
    }

    /// Fetches plan text and metadata through the collaborators and parses it
    async fn fetch(
        &self,
        sql: &str,
        tables: &[String],
        include_actual: bool,
    ) -> Result<FetchedAnalysis, QueryError> {
        let text = self.plans.fetch_plan(sql, PlanMode::Estimated).await?;
        let estimated = parse_plan(&text, PlanMode::Estimated);

        let actual = if include_actual {
            let text = self.plans.fetch_plan(sql, PlanMode::Actual).await?;
            Some(parse_plan(&text, PlanMode::Actual))
        } else {
            None
        };

        let mut schemas = Vec::with_capacity(tables.len());
        for table in tables {
            schemas.push(self.schemas.get_table_schema(table).await?);
        }

        let warnings = detect_warnings(&estimated);
        Ok(FetchedAnalysis {
            estimated,
            actual,
            schemas,
            warnings,
        })
    }
}
