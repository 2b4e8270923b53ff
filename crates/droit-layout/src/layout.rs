//! # Tree Layout
//!
//! Places every visible node of a rule tree on a plane for rendering.
//!
//! Two passes over the structural tree:
//!
//! 1. **Reserve** (bottom-up): each subtree reserves a horizontal span of
//!    `max(nodeWidth, Σ child spans + gaps)`.
//! 2. **Place** (top-down): children are packed left to right inside the
//!    parent's span (centred when the node is wider than its children), a
//!    childless node sits in the middle of its span, and every other node
//!    sits at the mean x of its children.
//!
//! `x` is the horizontal centre of a node's box and `y` its top edge,
//! `padding + depth × levelSpacing`. Sibling spans never overlap, so boxes on
//! the same level are always at least `horizontalSpacing` apart.
//!
//! Structural children are the `true`/`false` subtrees of a condition, the
//! members of a group or router in declaration order, and an anchor's
//! successor. Collapsed groups are drawn without their members.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use droit_core::{ComplianceStatus, DecisionNode, NodeId, NodeKind};

use crate::config::LayoutConfig;

/// A point on the layout plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate, growing downwards.
    pub y: f64,
}

/// A positioned node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutNode {
    /// Node id.
    pub id: NodeId,
    /// Horizontal centre.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Box width.
    pub width: f64,
    /// Box height.
    pub height: f64,
    /// Distance from the root, in levels.
    pub depth: usize,
    /// Node kind.
    pub kind: NodeKind,
    /// Display label.
    pub label: String,
    /// Leaf status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ComplianceStatus>,
    /// Whether the node is a leaf.
    pub is_leaf: bool,
    /// Whether the node lies on the highlighted evaluation path.
    pub is_on_path: bool,
}

/// A positioned edge from a parent's bottom centre to a child's top centre.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutEdge {
    /// `"{source}->{target}"`.
    pub id: String,
    /// Parent node id.
    pub source: NodeId,
    /// Child node id.
    pub target: NodeId,
    /// `"true"`/`"false"` for condition branches, jurisdiction codes for
    /// router branches.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Whether both ends lie on the highlighted path.
    pub is_on_path: bool,
    /// Start point.
    pub from: Point,
    /// End point.
    pub to: Point,
}

/// A complete layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeLayout {
    /// Nodes in structural pre-order.
    pub nodes: Vec<LayoutNode>,
    /// Edges in structural pre-order of their targets.
    pub edges: Vec<LayoutEdge>,
    /// Total drawing width, padding included.
    pub width: f64,
    /// Total drawing height, padding included.
    pub height: f64,
}

impl TreeLayout {
    /// Look up a positioned node by id.
    pub fn node(&self, id: &str) -> Option<&LayoutNode> {
        self.nodes.iter().find(|n| n.id.as_str() == id)
    }
}

/// Lay out a tree, highlighting the nodes in `path`.
pub fn calculate_layout(
    root: &DecisionNode,
    config: &LayoutConfig,
    path: &BTreeSet<NodeId>,
) -> TreeLayout {
    let measured = measure(root, config);
    let mut placer = Placer {
        config,
        path,
        nodes: Vec::new(),
        links: Vec::new(),
        max_depth: 0,
    };
    placer.place(&measured, config.padding, 0);

    let Placer {
        nodes,
        links,
        max_depth,
        ..
    } = placer;

    let edges = links
        .into_iter()
        .map(|link| {
            let (s, t) = (&nodes[link.source], &nodes[link.target]);
            LayoutEdge {
                id: format!("{}->{}", s.id, t.id),
                source: s.id.clone(),
                target: t.id.clone(),
                label: link.label,
                is_on_path: s.is_on_path && t.is_on_path,
                from: Point {
                    x: s.x,
                    y: s.y + s.height,
                },
                to: Point { x: t.x, y: t.y },
            }
        })
        .collect::<Vec<_>>();

    let width = measured.span + 2.0 * config.padding;
    let height =
        2.0 * config.padding + max_depth as f64 * config.level_spacing + config.node_height;
    debug!(nodes = nodes.len(), edges = edges.len(), width, height, "layout computed");

    TreeLayout {
        nodes,
        edges,
        width,
        height,
    }
}

// ---------------------------------------------------------------------------
// Reserve
// ---------------------------------------------------------------------------

struct Measured<'a> {
    node: &'a DecisionNode,
    span: f64,
    children: Vec<(Option<String>, Measured<'a>)>,
}

fn measure<'a>(node: &'a DecisionNode, config: &LayoutConfig) -> Measured<'a> {
    let children: Vec<(Option<String>, Measured<'a>)> = visible_children(node)
        .into_iter()
        .map(|(label, child)| (label, measure(child, config)))
        .collect();
    let span = config.node_width.max(block_width(&children, config));
    Measured {
        node,
        span,
        children,
    }
}

fn block_width(children: &[(Option<String>, Measured<'_>)], config: &LayoutConfig) -> f64 {
    if children.is_empty() {
        return 0.0;
    }
    let spans: f64 = children.iter().map(|(_, m)| m.span).sum();
    spans + config.horizontal_spacing * (children.len() - 1) as f64
}

fn visible_children(node: &DecisionNode) -> Vec<(Option<String>, &DecisionNode)> {
    match node {
        DecisionNode::Condition(c) => vec![
            (Some("true".to_string()), &*c.children.when_true),
            (Some("false".to_string()), &*c.children.when_false),
        ],
        DecisionNode::Leaf(_) => Vec::new(),
        DecisionNode::Group(g) if g.collapsed => Vec::new(),
        DecisionNode::Group(g) => g.children.iter().map(|c| (None, c)).collect(),
        DecisionNode::Router(r) => r
            .children
            .iter()
            .map(|child| {
                let codes: Vec<&str> = r
                    .branches
                    .iter()
                    .filter(|b| &b.target_node_id == child.node_id())
                    .map(|b| b.jurisdiction.as_str())
                    .collect();
                let label = (!codes.is_empty()).then(|| codes.join(", "));
                (label, child)
            })
            .collect(),
        DecisionNode::ConflictAnchor(a) => vec![(None, &*a.next)],
    }
}

// ---------------------------------------------------------------------------
// Place
// ---------------------------------------------------------------------------

struct Link {
    source: usize,
    target: usize,
    label: Option<String>,
}

struct Placer<'c> {
    config: &'c LayoutConfig,
    path: &'c BTreeSet<NodeId>,
    nodes: Vec<LayoutNode>,
    links: Vec<Link>,
    max_depth: usize,
}

impl Placer<'_> {
    /// Place `m` inside the span starting at `left`. Returns its index.
    fn place(&mut self, m: &Measured<'_>, left: f64, depth: usize) -> usize {
        let node = m.node;
        let index = self.nodes.len();
        self.max_depth = self.max_depth.max(depth);
        self.nodes.push(LayoutNode {
            id: node.node_id().clone(),
            x: left + m.span / 2.0,
            y: self.config.padding + depth as f64 * self.config.level_spacing,
            width: self.config.node_width,
            height: self.config.node_height,
            depth,
            kind: node.kind(),
            label: node.label(),
            status: node.as_leaf().map(|l| l.status),
            is_leaf: node.is_leaf(),
            is_on_path: self.path.contains(node.node_id()),
        });

        if m.children.is_empty() {
            return index;
        }

        let mut cursor = left + (m.span - block_width(&m.children, self.config)) / 2.0;
        let mut xs = Vec::with_capacity(m.children.len());
        for (label, child) in &m.children {
            let child_index = self.place(child, cursor, depth + 1);
            xs.push(self.nodes[child_index].x);
            self.links.push(Link {
                source: index,
                target: child_index,
                label: label.clone(),
            });
            cursor += child.span + self.config.horizontal_spacing;
        }
        self.nodes[index].x = xs.iter().sum::<f64>() / xs.len() as f64;
        index
    }
}
