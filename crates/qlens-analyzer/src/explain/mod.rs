//! EXPLAIN Plan Module
//!
//! Parses indentation-based plan text, as produced by `EXPLAIN FORMAT=TREE`
//! and `EXPLAIN ANALYZE`, into a typed forest of nodes.
//!
//! # Example
//!
//! ```
//! use qlens_analyzer::explain::{parse_plan, PlanMode};
//!
//! let text = "-> Filter: (t.id = 5)  (cost=1.25 rows=1)\n    -> Table scan on t  (cost=1.00 rows=10)";
//! let forest = parse_plan(text, PlanMode::Estimated);
//!
//! assert_eq!(forest.len(), 1);
//! assert_eq!(forest.node_count(), 2);
//! assert!(forest.has_table_scans());
//! ```

pub mod plan;
pub mod tree;

pub use plan::{ActualTime, PlanForest, PlanNode, PlanNodeIterator};
pub use qlens_core::PlanMode;
pub use tree::{INDENT_WIDTH, parse_plan};
