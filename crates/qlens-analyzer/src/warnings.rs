//! Plan warnings
//!
//! Flags plan operations that usually point at a missing index or an
//! expensive intermediate result.

use serde::{Deserialize, Serialize};

use crate::explain::{PlanForest, PlanNode};

/// Severity level for warnings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeverityLevel {
    /// Likely to hurt performance
    Warning,
    /// Worth knowing about
    Info,
}

impl SeverityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

/// Kind of plan warning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// The plan reads every row of a table
    FullTableScan,
    /// The plan materializes rows into a temporary table
    TemporaryTable,
}

impl WarningKind {
    /// Returns a human-readable description of this warning kind
    pub fn description(&self) -> &'static str {
        match self {
            Self::FullTableScan => "Full table scan detected",
            Self::TemporaryTable => "Temporary table created",
        }
    }

    pub fn severity(&self) -> SeverityLevel {
        match self {
            Self::FullTableScan => SeverityLevel::Warning,
            Self::TemporaryTable => SeverityLevel::Info,
        }
    }

    fn matches(&self, node: &PlanNode) -> bool {
        match self {
            Self::FullTableScan => node.is_table_scan(),
            Self::TemporaryTable => node.operation.to_lowercase().contains("temporary table"),
        }
    }
}

/// A warning attached to one plan operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanWarning {
    pub kind: WarningKind,
    pub severity: SeverityLevel,
    /// Operation text of the node that triggered the warning
    pub operation: String,
    pub message: String,
}

impl PlanWarning {
    fn for_node(kind: WarningKind, node: &PlanNode) -> Self {
        let message = match node.estimated_rows {
            Some(rows) => format!("{} ({rows} estimated rows)", kind.description()),
            None => kind.description().to_string(),
        };
        Self {
            kind,
            severity: kind.severity(),
            operation: node.operation.clone(),
            message,
        }
    }
}

/// Collects warnings for every matching node, in pre-order
pub fn detect_warnings(forest: &PlanForest) -> Vec<PlanWarning> {
    const KINDS: [WarningKind; 2] = [WarningKind::FullTableScan, WarningKind::TemporaryTable];

    forest
        .iter_nodes()
        .flat_map(|node| {
            KINDS
                .iter()
                .filter(move |kind| kind.matches(node))
                .map(move |kind| PlanWarning::for_node(*kind, node))
        })
        .collect()
}
