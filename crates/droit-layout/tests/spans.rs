//! # Layout Geometry Properties
//!
//! Over randomly shaped trees: boxes on one level never overlap, everything
//! fits inside the reported drawing size, and parents sit over their
//! children.

use std::collections::{BTreeMap, BTreeSet};

use droit_core::{
    tree::condition_node, ComplianceStatus, Condition, ConditionOp, DecisionNode, GroupNode,
    LeafNode, NodeId,
};
use droit_layout::{calculate_layout, LayoutConfig, TreeLayout};
use proptest::prelude::*;
use serde_json::json;

const EPS: f64 = 1e-6;

#[derive(Debug, Clone)]
enum Shape {
    Leaf,
    Cond(Box<Shape>, Box<Shape>),
    Group(Vec<Shape>),
}

fn arb_shape() -> impl Strategy<Value = Shape> {
    Just(Shape::Leaf).prop_recursive(5, 40, 4, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone()).prop_map(|(t, f)| Shape::Cond(Box::new(t), Box::new(f))),
            prop::collection::vec(inner, 1..4).prop_map(Shape::Group),
        ]
    })
}

fn build(shape: &Shape, next: &mut usize) -> DecisionNode {
    *next += 1;
    let id = format!("n{next}");
    match shape {
        Shape::Leaf => LeafNode::new(id.as_str(), id.as_str(), ComplianceStatus::Compliant).into(),
        Shape::Cond(t, f) => {
            let t = build(t, next);
            let f = build(f, next);
            condition_node(id.as_str(), Condition::new("x", ConditionOp::Eq, json!(1)), t, f)
        }
        Shape::Group(members) => {
            let children: Vec<DecisionNode> = members.iter().map(|m| build(m, next)).collect();
            DecisionNode::Group(GroupNode {
                node_id: NodeId::new(id.clone()),
                label: id,
                entry_node_id: children[0].node_id().clone(),
                exit_node_id: None,
                collapsed: false,
                children,
            })
        }
    }
}

fn arb_config() -> impl Strategy<Value = LayoutConfig> {
    (20.0f64..200.0, 10.0f64..80.0, 0.0f64..60.0, 50.0f64..150.0, 0.0f64..50.0).prop_map(
        |(node_width, node_height, horizontal_spacing, level_spacing, padding)| LayoutConfig {
            node_width,
            node_height,
            horizontal_spacing,
            level_spacing,
            padding,
        },
    )
}

fn layout_of(shape: &Shape, config: &LayoutConfig) -> TreeLayout {
    calculate_layout(&build(shape, &mut 0), config, &BTreeSet::new())
}

proptest! {
    /// Boxes on the same level are at least `horizontalSpacing` apart.
    #[test]
    fn same_level_boxes_never_overlap(shape in arb_shape(), config in arb_config()) {
        let layout = layout_of(&shape, &config);
        let mut levels: BTreeMap<usize, Vec<f64>> = BTreeMap::new();
        for n in &layout.nodes {
            levels.entry(n.depth).or_default().push(n.x);
        }
        for xs in levels.values_mut() {
            xs.sort_by(f64::total_cmp);
            for pair in xs.windows(2) {
                prop_assert!(
                    pair[1] - pair[0] + EPS >= config.node_width + config.horizontal_spacing,
                    "boxes at {} and {} overlap", pair[0], pair[1]
                );
            }
        }
    }

    /// Every box lies inside the drawing, padding included.
    #[test]
    fn boxes_fit_the_drawing(shape in arb_shape(), config in arb_config()) {
        let layout = layout_of(&shape, &config);
        for n in &layout.nodes {
            prop_assert!(n.x - n.width / 2.0 + EPS >= config.padding);
            prop_assert!(n.x + n.width / 2.0 <= layout.width - config.padding + EPS);
            prop_assert!(n.y + n.height <= layout.height - config.padding + EPS);
        }
    }

    /// Parents sit at the mean x of their children, one level above them.
    #[test]
    fn parents_centre_over_children(shape in arb_shape()) {
        let config = LayoutConfig::default();
        let layout = layout_of(&shape, &config);
        let mut children: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
        for e in &layout.edges {
            children.entry(e.source.as_str()).or_default().push(e.to.x);
            let s = layout.node(e.source.as_str()).unwrap();
            let t = layout.node(e.target.as_str()).unwrap();
            prop_assert_eq!(s.depth + 1, t.depth);
        }
        for (id, xs) in children {
            let mean = xs.iter().sum::<f64>() / xs.len() as f64;
            prop_assert!((layout.node(id).unwrap().x - mean).abs() < EPS);
        }
    }

    /// Every node appears once, with one incoming edge except the root.
    #[test]
    fn every_node_is_placed_once(shape in arb_shape()) {
        let tree = build(&shape, &mut 0);
        let layout = calculate_layout(&tree, &LayoutConfig::default(), &BTreeSet::new());
        prop_assert_eq!(layout.nodes.len(), tree.descendants().len());
        prop_assert_eq!(layout.edges.len(), layout.nodes.len() - 1);
    }
}
