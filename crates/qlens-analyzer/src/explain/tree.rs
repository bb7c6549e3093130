//! Indentation-based plan text parser
//!
//! Each plan step is one line: leading spaces give the nesting level (four per
//! level), then the `->` marker, a free-text operation and optional metrics
//! groups:
//!
//! ```text
//! -> Nested loop inner join  (cost=2.45 rows=3) (actual time=0.051..0.066 rows=3 loops=1)
//!     -> Table scan on p  (cost=0.55 rows=3) (actual time=0.031..0.038 rows=3 loops=1)
//!     -> Single-row index lookup on u using PRIMARY (ID=p.post_author)  (cost=0.30 rows=1)
//! ```
//!
//! Malformed input never fails the parse: lines without `->` are skipped and a
//! line indented more than one level below its predecessor attaches to the
//! deepest open ancestor.

use regex::Regex;
use std::sync::LazyLock;

use super::plan::{ActualTime, PlanForest, PlanNode};
use qlens_core::PlanMode;

/// Spaces per nesting level in plan text
pub const INDENT_WIDTH: usize = 4;

const NUMBER: &str = r"[-+]?(?:\d+\.?\d*|\.\d+)(?:[eE][-+]?\d+)?";

// Where the trailing metrics groups begin; everything before is the operation.
static METRICS_START_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\((?:cost=|rows=|actual time=|never executed\))").expect("valid regex")
});

static GROUP_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(([^()]*)\)").expect("valid regex"));

// A `startup..total` range is accepted too; the total is kept.
static COST_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\bcost=({NUMBER})(?:\.\.({NUMBER}))?")).expect("valid regex")
});

static ROWS_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"\brows=({NUMBER})")).expect("valid regex"));

static ACTUAL_TIME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\bactual time=({NUMBER})\.\.({NUMBER})")).expect("valid regex")
});

static LOOPS_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bloops=(\d+)").expect("valid regex"));

/// Parses plan text into a forest of nodes.
///
/// Blank input gives an empty forest. Actual-mode fields are only filled in
/// when `mode` is [`PlanMode::Actual`].
pub fn parse_plan(text: &str, mode: PlanMode) -> PlanForest {
    let mut nodes: Vec<PlanNode> = Vec::new();
    let mut parents: Vec<Option<usize>> = Vec::new();
    // Arena index of the most recent node at each open depth.
    let mut open: Vec<usize> = Vec::new();
    let mut skipped = 0usize;

    for line in text.lines().filter(|l| !l.trim().is_empty()) {
        let Some((depth, mut node)) = parse_line(line, mode) else {
            skipped += 1;
            continue;
        };

        open.truncate(depth);
        node.depth = open.len();
        parents.push(open.last().copied());
        open.push(nodes.len());
        nodes.push(node);
    }

    let forest = assemble(nodes, parents);
    tracing::debug!(
        mode = %mode,
        roots = forest.len(),
        nodes = forest.node_count(),
        skipped_lines = skipped,
        "parsed plan text"
    );
    forest
}

/// Links arena nodes into owned trees without recursion.
///
/// A child always sits later in the arena than its parent, so walking the
/// arena backwards finishes every subtree before its parent is reached.
fn assemble(nodes: Vec<PlanNode>, parents: Vec<Option<usize>>) -> PlanForest {
    let mut pending: Vec<Vec<PlanNode>> = vec![Vec::new(); nodes.len()];
    let mut roots = Vec::new();

    for (index, mut node) in nodes.into_iter().enumerate().rev() {
        let mut children = std::mem::take(&mut pending[index]);
        children.reverse();
        node.children = children;

        match parents[index] {
            Some(parent) => pending[parent].push(node),
            None => roots.push(node),
        }
    }

    roots.reverse();
    PlanForest::new(roots)
}

/// Parses one line into its raw indentation depth and a childless node
fn parse_line(line: &str, mode: PlanMode) -> Option<(usize, PlanNode)> {
    let indent = line.len() - line.trim_start_matches(' ').len();
    let arrow = line.find("->")?;
    let body = line[arrow + 2..].trim();

    let (operation, metrics) = match METRICS_START_REGEX.find(body) {
        Some(m) => (body[..m.start()].trim(), &body[m.start()..]),
        None => (body, ""),
    };

    let mut node = PlanNode::new(operation, 0);
    let mut seen_estimate = false;
    let mut seen_actual = false;

    for caps in GROUP_REGEX.captures_iter(metrics) {
        let group = caps[1].trim();
        if group.starts_with("actual") {
            if mode.is_actual() && !seen_actual {
                apply_actual(&mut node, group);
                seen_actual = true;
            }
        } else if !seen_estimate && (group.contains("cost=") || group.contains("rows=")) {
            apply_estimate(&mut node, group);
            seen_estimate = true;
        }
    }

    Some((indent / INDENT_WIDTH, node))
}

fn apply_estimate(node: &mut PlanNode, group: &str) {
    if let Some(caps) = COST_REGEX.captures(group) {
        let value = caps.get(2).or_else(|| caps.get(1));
        node.cost = value.and_then(|m| parse_number(m.as_str()));
    }
    node.estimated_rows = capture_number(&ROWS_REGEX, group);
}

fn apply_actual(node: &mut PlanNode, group: &str) {
    let loops = LOOPS_REGEX
        .captures(group)
        .and_then(|caps| caps[1].parse::<u64>().ok());

    if let Some(caps) = ACTUAL_TIME_REGEX.captures(group)
        && let (Some(start), Some(end)) = (parse_number(&caps[1]), parse_number(&caps[2]))
    {
        node.actual_time = Some(ActualTime::new(start, end, loops.unwrap_or(1)));
    }

    node.actual_rows = capture_number(&ROWS_REGEX, group);
    node.actual_loops = loops;
}

fn capture_number(regex: &Regex, haystack: &str) -> Option<f64> {
    regex
        .captures(haystack)
        .and_then(|caps| parse_number(&caps[1]))
}

fn parse_number(text: &str) -> Option<f64> {
    text.parse::<f64>().ok().filter(|v| v.is_finite())
}
