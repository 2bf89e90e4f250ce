//! The trace renderer: one linear pass from steps to a styled digraph.

use crate::dot::Digraph;
use crate::label::{LabelError, LabelMode, Labeler};
use crate::step::StepData;
use crate::trace::Trace;

/// Parent ids at or below this value mark the synthetic root; steps under
/// it get no visible parent edge.
pub const ROOT_SENTINEL_ID: i64 = 1;

/// Render a trace into a directed graph laid out left to right.
///
/// Steps are visited in input order. Each step contributes at most one
/// node, keyed by its decimal id, and one edge from its parent when the
/// parent is a real step rather than the synthetic root.
pub fn render_trace(trace: &Trace, mode: LabelMode, name: &str) -> Result<Digraph, LabelError> {
    let mut graph = Digraph::new(name);
    graph.set_comment(name.to_uppercase());
    graph.set_graph_attr("rankdir", "LR");

    let mut labeler = Labeler::new(mode);
    for step in trace.steps() {
        let Some((label, style)) = labeler.label(step, trace)? else {
            continue;
        };
        let id = step.id.to_string();
        graph.add_node(id.clone(), label, style);
        if let Some(parent_id) = step.parent_id {
            if parent_id > ROOT_SENTINEL_ID {
                graph.add_edge(parent_id.to_string(), id);
            }
        }
    }
    Ok(graph)
}

/// Counts collected while validating a trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderSummary {
    pub steps: usize,
    /// Nodes the default (plain) render draws.
    pub nodes: usize,
    pub edges: usize,
    pub queries: u64,
    /// Result rows across all entity segments.
    pub rows: u64,
}

/// Validate a trace without keeping any output.
///
/// Every parent chain is walked and every label built in both display
/// modes; linked mode is what exercises prefix stripping.
pub fn check_trace(trace: &Trace) -> Result<RenderSummary, LabelError> {
    let plain = render_trace(trace, LabelMode::Plain, "check")?;
    render_trace(trace, LabelMode::Linked, "check")?;

    let mut queries = 0;
    let mut rows: u64 = 0;
    for step in trace.steps() {
        match &step.data {
            StepData::EntitySegment { count, .. } => rows = rows.saturating_add(*count),
            StepData::PartitionKeyQuery { .. } | StepData::PrefixQuery { .. } => queries += 1,
            StepData::Start { .. } => {}
        }
    }

    Ok(RenderSummary {
        steps: trace.len(),
        nodes: plain.node_count(),
        edges: plain.edge_count(),
        queries,
        rows,
    })
}
