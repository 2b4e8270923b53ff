//! # Path Highlighting and Edge Geometry

use std::collections::BTreeSet;

use droit_core::NodeId;
use droit_eval::TraceNode;

use crate::layout::LayoutEdge;

/// Ids of the conditions a trace passed through.
///
/// A trace holds conditions only; use
/// [`EvaluationResult::path_node_ids`](droit_eval::EvaluationResult::path_node_ids)
/// when the leaf, anchors and groups should light up too.
pub fn get_path_from_trace(trace: &[TraceNode]) -> BTreeSet<NodeId> {
    trace.iter().map(|t| t.node_id.clone()).collect()
}

/// SVG path data for an edge: a cubic Bézier leaving the source vertically
/// and entering the target vertically, with both control points at the
/// vertical midpoint.
pub fn generate_edge_path(edge: &LayoutEdge) -> String {
    let (from, to) = (edge.from, edge.to);
    let mid_y = (from.y + to.y) / 2.0;
    format!(
        "M {} {} C {} {}, {} {}, {} {}",
        from.x, from.y, from.x, mid_y, to.x, mid_y, to.x, to.y
    )
}
