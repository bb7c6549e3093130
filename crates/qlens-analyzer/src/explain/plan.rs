//! Query Plan Model - Data structures for representing parsed execution plans

use serde::{Deserialize, Serialize};

use super::tree::INDENT_WIDTH;

/// An ordered list of plan roots, normally exactly one
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct PlanForest {
    roots: Vec<PlanNode>,
}

impl PlanForest {
    /// Creates a forest from already-built roots
    pub fn new(roots: Vec<PlanNode>) -> Self {
        Self { roots }
    }

    pub fn roots(&self) -> &[PlanNode] {
        &self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Number of roots
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    /// The first root, which represents the outermost operation
    pub fn root(&self) -> Option<&PlanNode> {
        self.roots.first()
    }

    /// Estimated cost of the first root, if the plan reported one
    pub fn root_cost(&self) -> Option<f64> {
        self.root().and_then(|r| r.cost)
    }

    /// Returns an iterator over all nodes in the forest (depth-first, pre-order)
    pub fn iter_nodes(&self) -> PlanNodeIterator<'_> {
        PlanNodeIterator::new(&self.roots)
    }

    /// Total number of nodes across all roots
    pub fn node_count(&self) -> usize {
        self.roots.iter().map(|r| r.node_count()).sum()
    }

    /// Number of levels in the deepest branch (0 for an empty forest)
    pub fn max_depth(&self) -> usize {
        self.iter_with_level().map(|(_, level)| level + 1).max().unwrap_or(0)
    }

    /// Returns true if any operation contains `needle`, ignoring case
    pub fn contains_operation(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.iter_nodes()
            .any(|n| n.operation.to_lowercase().contains(&needle))
    }

    /// Returns true if the plan reads any table in full
    pub fn has_table_scans(&self) -> bool {
        self.iter_nodes().any(|n| n.is_table_scan())
    }

    /// Re-indents the forest as plan text, one `->` line per node.
    ///
    /// Lines use the same 4-space indent unit the parser expects, so the
    /// output parses back into a forest with the same shape.
    pub fn render(&self) -> String {
        let mut lines = Vec::with_capacity(self.node_count());
        for (node, level) in self.iter_with_level() {
            lines.push(format!(
                "{}-> {}{}",
                " ".repeat(level * INDENT_WIDTH),
                node.operation,
                node.metrics_suffix()
            ));
        }
        lines.join("\n")
    }

    /// Pre-order traversal that also yields each node's level in the tree
    fn iter_with_level(&self) -> impl Iterator<Item = (&PlanNode, usize)> {
        let mut stack: Vec<(&PlanNode, usize)> = self.roots.iter().rev().map(|r| (r, 0)).collect();
        std::iter::from_fn(move || {
            let (node, level) = stack.pop()?;
            for child in node.children.iter().rev() {
                stack.push((child, level + 1));
            }
            Some((node, level))
        })
    }
}

/// Represents a single step in the plan tree
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanNode {
    /// Free-text description of the operation
    pub operation: String,
    /// Estimated cost
    pub cost: Option<f64>,
    /// Estimated number of rows
    pub estimated_rows: Option<f64>,
    /// Measured timing (actual mode only)
    pub actual_time: Option<ActualTime>,
    /// Rows actually produced (actual mode only)
    pub actual_rows: Option<f64>,
    /// Number of times the step ran (actual mode only)
    pub actual_loops: Option<u64>,
    /// Nesting level, 0 for roots
    pub depth: usize,
    /// Child nodes in document order
    pub children: Vec<PlanNode>,
}

impl PlanNode {
    /// Creates a new node with no metrics
    pub fn new(operation: impl Into<String>, depth: usize) -> Self {
        Self {
            operation: operation.into(),
            cost: None,
            estimated_rows: None,
            actual_time: None,
            actual_rows: None,
            actual_loops: None,
            depth,
            children: Vec::new(),
        }
    }

    pub fn with_cost(mut self, cost: f64) -> Self {
        self.cost = Some(cost);
        self
    }

    pub fn with_rows(mut self, rows: f64) -> Self {
        self.estimated_rows = Some(rows);
        self
    }

    pub fn with_actual(mut self, time: ActualTime, rows: f64, loops: u64) -> Self {
        self.actual_time = Some(time);
        self.actual_rows = Some(rows);
        self.actual_loops = Some(loops);
        self
    }

    /// Adds a child node
    pub fn with_child(mut self, child: PlanNode) -> Self {
        self.children.push(child);
        self
    }

    /// Returns the total number of nodes in this subtree (including self)
    pub fn node_count(&self) -> usize {
        PlanNodeIterator::new(std::slice::from_ref(self)).count()
    }

    /// Returns true if this is a leaf node (no children)
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Returns true if this step reads a whole table
    pub fn is_table_scan(&self) -> bool {
        self.operation.to_lowercase().contains("table scan")
    }

    /// The parenthesized metrics groups, formatted the way the source prints them
    fn metrics_suffix(&self) -> String {
        let mut estimate = Vec::new();
        if let Some(cost) = self.cost {
            estimate.push(format!("cost={cost:.2}"));
        }
        if let Some(rows) = self.estimated_rows {
            estimate.push(format!("rows={}", format_count(rows)));
        }

        let mut actual = Vec::new();
        if let Some(time) = self.actual_time {
            actual.push(format!("actual time={:.3}..{:.3}", time.start, time.end));
        }
        if let Some(rows) = self.actual_rows {
            actual.push(format!("rows={}", format_count(rows)));
        }
        if let Some(loops) = self.actual_loops {
            actual.push(format!("loops={loops}"));
        }

        let mut suffix = String::new();
        if !estimate.is_empty() {
            suffix.push_str(&format!("  ({})", estimate.join(" ")));
        }
        if !actual.is_empty() {
            let gap = if estimate.is_empty() { "  " } else { " " };
            suffix.push_str(&format!("{gap}({})", actual.join(" ")));
        }
        suffix
    }
}

/// Row counts are printed without a fractional part when they have none
fn format_count(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        format!("{value}")
    }
}

/// Actual timing information from EXPLAIN ANALYZE, in milliseconds
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ActualTime {
    /// Time to return the first row
    pub start: f64,
    /// Time to return all rows, per loop
    pub end: f64,
    /// Time across every loop (`end * loops`)
    pub total: f64,
}

impl ActualTime {
    /// Creates timing from the per-loop range and the loop count
    pub fn new(start: f64, end: f64, loops: u64) -> Self {
        Self {
            start,
            end,
            total: end * loops as f64,
        }
    }
}

/// Iterator for traversing plan nodes depth-first
pub struct PlanNodeIterator<'a> {
    stack: Vec<&'a PlanNode>,
}

impl<'a> PlanNodeIterator<'a> {
    fn new(roots: &'a [PlanNode]) -> Self {
        Self {
            stack: roots.iter().rev().collect(),
        }
    }
}

impl<'a> Iterator for PlanNodeIterator<'a> {
    type Item = &'a PlanNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        // Push children in reverse order so we visit them in order
        for child in node.children.iter().rev() {
            self.stack.push(child);
        }
        Some(node)
    }
}
