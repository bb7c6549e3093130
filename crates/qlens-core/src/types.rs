//! Core request types

use serde::{Deserialize, Serialize};

/// One SQL statement submitted for analysis
///
/// Requests are immutable once submitted; the session only ever reads them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRequest {
    /// Caller-supplied opaque identifier, unique within a session
    pub id: String,
    /// Display label used in the report
    pub label: String,
    /// The SQL text exactly as submitted
    #[serde(rename = "query")]
    pub raw_sql: String,
}

impl QueryRequest {
    /// Create a new request
    pub fn new(id: impl Into<String>, label: impl Into<String>, raw_sql: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            raw_sql: raw_sql.into(),
        }
    }

    /// Returns this request with a positional label (`Query 1`, `Query 2`, ...)
    /// when the submitted label is blank.
    pub fn with_default_label(mut self, index: usize) -> Self {
        if self.label.trim().is_empty() {
            self.label = default_label(index);
        }
        self
    }
}

/// Label given to the request at `index` (0-based) when none was supplied
pub fn default_label(index: usize) -> String {
    format!("Query {}", index + 1)
}

/// Which flavour of execution plan to request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanMode {
    /// Planner estimates only (EXPLAIN)
    Estimated,
    /// Plan annotated with measured execution (EXPLAIN ANALYZE)
    Actual,
}

impl PlanMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Estimated => "estimated",
            Self::Actual => "actual",
        }
    }

    pub fn is_actual(&self) -> bool {
        matches!(self, Self::Actual)
    }
}

impl std::fmt::Display for PlanMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_blank_label_gets_position() {
        let request = QueryRequest::new("q-7", "   ", "SELECT 1").with_default_label(2);
        assert_eq!(request.label, "Query 3");
    }

    #[test]
    fn test_explicit_label_is_kept() {
        let request = QueryRequest::new("q-1", "Recent posts", "SELECT 1").with_default_label(0);
        assert_eq!(request.label, "Recent posts");
    }

    #[test]
    fn test_request_json_uses_query_field() {
        let request = QueryRequest::new("a", "b", "SELECT 1");
        let json = serde_json::to_value(&request).expect("serialize");
        assert_eq!(json["query"], "SELECT 1");
        assert!(json.get("raw_sql").is_none());
    }
}
