//! Session errors

use std::time::Duration;

use qlens_analyzer::BlockReason;
use qlens_core::QlensError;
use thiserror::Error;

pub type SessionResult<T> = Result<T, SessionError>;

/// Why a single query could not be analyzed
///
/// These are captured into that query's result and never fail the session.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    #[error("{0}")]
    BlockedStatement(BlockReason),

    #[error("no tables found")]
    NoTablesFound,

    #[error("{0}")]
    FetchFailure(String),

    #[error("analysis timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("analysis task failed: {0}")]
    TaskFailed(String),
}

impl QueryError {
    /// Stable machine-readable name of the error
    pub fn kind(&self) -> &'static str {
        match self {
            Self::BlockedStatement(_) => "blocked_statement",
            Self::NoTablesFound => "no_tables_found",
            Self::FetchFailure(_) => "fetch_failure",
            Self::Timeout(_) => "timeout",
            Self::TaskFailed(_) => "task_failed",
        }
    }
}

impl From<QlensError> for QueryError {
    fn from(err: QlensError) -> Self {
        Self::FetchFailure(err.to_string())
    }
}

/// Request-shape problems that reject the whole session
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("no queries submitted")]
    EmptyRequest,

    #[error("{count} queries submitted, at most {max} allowed")]
    TooManyQueries { count: usize, max: usize },

    #[error("duplicate query id '{0}'")]
    DuplicateQueryId(String),

    #[error("query {} has a blank id", .0 + 1)]
    BlankQueryId(usize),
}
