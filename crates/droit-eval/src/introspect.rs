//! # Tree Introspection
//!
//! Structural questions about a rule tree that do not need facts: how big it
//! is, and which facts a caller should collect before evaluating it.

use std::collections::BTreeSet;

use droit_core::DecisionNode;

/// Total number of nodes in the tree.
pub fn count_nodes(root: &DecisionNode) -> usize {
    root.descendants().len()
}

/// Every fact path referenced by a condition, deduplicated and sorted.
pub fn collect_fact_paths(root: &DecisionNode) -> BTreeSet<String> {
    root.descendants()
        .into_iter()
        .filter_map(|node| match node {
            DecisionNode::Condition(c) => Some(c.condition.fact.clone()),
            _ => None,
        })
        .collect()
}
