//! # Evaluation Properties
//!
//! Property tests over randomly shaped rule trees: evaluation is
//! deterministic, traces are depth-ordered, and partial evaluation with no
//! facts keeps every leaf in play.

use std::collections::BTreeSet;

use droit_core::{
    ComplianceStatus, Condition, ConditionNode, ConditionOp, ConflictAnchorNode, DecisionNode,
    Facts, LeafNode, NodeId,
};
use droit_eval::{
    collect_fact_paths, evaluate_condition, evaluate_partial, evaluate_tree, Evaluation,
};
use proptest::prelude::*;
use serde_json::json;

const FACTS: [&str; 4] = ["amount", "kind.code", "issuer.tier", "offer.size"];

#[derive(Debug, Clone)]
enum Shape {
    Leaf(usize),
    Cond(usize, usize, i64, Box<Shape>, Box<Shape>),
    Anchor(Box<Shape>),
}

fn arb_shape() -> impl Strategy<Value = Shape> {
    let leaf = (0usize..4).prop_map(Shape::Leaf);
    leaf.prop_recursive(6, 48, 2, |inner| {
        prop_oneof![
            4 => (0usize..FACTS.len(), 0usize..3, 0i64..4, inner.clone(), inner.clone())
                .prop_map(|(f, op, v, t, e)| Shape::Cond(f, op, v, Box::new(t), Box::new(e))),
            1 => inner.prop_map(|n| Shape::Anchor(Box::new(n))),
        ]
    })
}

fn arb_facts() -> impl Strategy<Value = Facts> {
    prop::collection::vec(prop::option::of(0i64..4), FACTS.len()).prop_map(|values| {
        let mut facts = Facts::new();
        for (path, value) in FACTS.iter().zip(values) {
            if let Some(v) = value {
                facts = facts.with(*path, json!(v));
            }
        }
        facts
    })
}

fn build(shape: &Shape, next_id: &mut usize) -> DecisionNode {
    *next_id += 1;
    let id = NodeId::new(format!("n{next_id}"));
    match shape {
        Shape::Leaf(s) => {
            let status = ComplianceStatus::all()[*s];
            DecisionNode::Leaf(LeafNode::new(id.clone(), id.to_string(), status))
        }
        Shape::Cond(f, op, v, t, e) => {
            let op = [ConditionOp::Eq, ConditionOp::Gt, ConditionOp::Lt][*op];
            let when_true = build(t, next_id);
            let when_false = build(e, next_id);
            droit_core::tree::condition_node(
                id,
                Condition::new(FACTS[*f], op, json!(v)),
                when_true,
                when_false,
            )
        }
        Shape::Anchor(n) => DecisionNode::ConflictAnchor(ConflictAnchorNode {
            node_id: id,
            paired_anchor_id: NodeId::from("elsewhere"),
            label: None,
            next: Box::new(build(n, next_id)),
        }),
    }
}

fn arb_tree() -> impl Strategy<Value = DecisionNode> {
    arb_shape().prop_map(|shape| build(&shape, &mut 0))
}

fn all_leaf_ids(root: &DecisionNode) -> BTreeSet<String> {
    root.descendants()
        .into_iter()
        .filter(|n| n.is_leaf())
        .map(|n| n.node_id().to_string())
        .collect()
}

fn first_condition(root: &DecisionNode) -> Option<&ConditionNode> {
    let mut node = root;
    loop {
        match node {
            DecisionNode::Condition(c) => return Some(c),
            DecisionNode::ConflictAnchor(a) => node = &*a.next,
            _ => return None,
        }
    }
}

proptest! {
    /// The same tree and facts always yield the same evaluation.
    #[test]
    fn evaluation_is_deterministic(tree in arb_tree(), facts in arb_facts()) {
        let a = evaluate_tree(&tree, &facts).unwrap();
        let b = evaluate_tree(&tree, &facts).unwrap();
        prop_assert_eq!(a, b);
    }

    /// Trace depth counts the conditions evaluated before each entry.
    #[test]
    fn trace_depth_increases_by_one(tree in arb_tree(), facts in arb_facts()) {
        let trace = match evaluate_tree(&tree, &facts).unwrap() {
            Evaluation::Decided(r) => r.trace,
            Evaluation::Undetermined(p) => p.partial_trace,
        };
        for (i, entry) in trace.iter().enumerate() {
            prop_assert_eq!(entry.depth, i);
        }
    }

    /// Recorded outcomes agree with re-evaluating each traced condition.
    #[test]
    fn trace_results_replay(tree in arb_tree(), facts in arb_facts()) {
        if let Evaluation::Decided(result) = evaluate_tree(&tree, &facts).unwrap() {
            for entry in &result.trace {
                let cond = Condition::new(
                    entry.fact_path.clone(),
                    entry.op,
                    entry.expected_value.clone(),
                );
                prop_assert_eq!(evaluate_condition(&cond, &facts), Some(entry.result));
            }
            prop_assert!(all_leaf_ids(&tree).contains(result.leaf.node_id.as_str()));
        }
    }

    /// With no facts, partial evaluation keeps every leaf reachable and
    /// reports every fact the tree references.
    #[test]
    fn empty_facts_keep_every_leaf(tree in arb_tree()) {
        let partial = evaluate_partial(&tree, &Facts::new()).unwrap();
        let reachable: BTreeSet<String> = partial
            .reachable_leaves
            .iter()
            .map(|l| l.node_id.to_string())
            .collect();
        prop_assert_eq!(reachable.len(), partial.reachable_leaves.len());
        prop_assert_eq!(reachable, all_leaf_ids(&tree));

        let missing: BTreeSet<String> = partial.missing_facts.iter().cloned().collect();
        prop_assert_eq!(missing, collect_fact_paths(&tree));
        if let Some(first) = first_condition(&tree) {
            prop_assert_eq!(partial.missing_facts[0].as_str(), first.condition.fact.as_str());
        }
        prop_assert!(partial.partial_trace.is_empty());
    }

    /// With every fact known, partial evaluation agrees with full evaluation.
    #[test]
    fn complete_facts_make_partial_equal_full(
        tree in arb_tree(),
        values in prop::collection::vec(0i64..4, FACTS.len()),
    ) {
        let facts = FACTS
            .iter()
            .zip(values)
            .fold(Facts::new(), |f, (path, v)| f.with(*path, json!(v)));
        let full = evaluate_tree(&tree, &facts).unwrap();
        let partial = evaluate_partial(&tree, &facts).unwrap();
        let decided = full.decided().unwrap();
        prop_assert!(partial.is_complete());
        prop_assert_eq!(&partial.reachable_leaves, &vec![decided.leaf.clone()]);
        prop_assert_eq!(&partial.partial_trace, &decided.trace);
    }
}
