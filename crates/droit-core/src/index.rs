//! # Tree Index
//!
//! [`TreeIndex`] is built once per tree and answers "which node has this id"
//! in constant time. Building it is also the tree's structural validation:
//!
//! - every node id is non-empty and unique,
//! - every `entryNodeId`, `exitNodeId` and `targetNodeId` resolves,
//! - the successor graph (condition branches, anchor successors, group
//!   entries, router targets) has no cycle.
//!
//! Once an index exists, any walk that follows successors is guaranteed to
//! terminate. Evaluators never fall back to deep search; an id the index does
//! not know is a malformed tree, reported before evaluation starts.

use std::collections::{HashMap, HashSet};

use crate::error::TreeError;
use crate::jurisdiction::JurisdictionContext;
use crate::tree::{DecisionNode, LeafNode, RouterNode};

const ROOT_PARENT: &str = "<root>";

/// Validated id → node lookup over a borrowed tree.
#[derive(Debug, Clone)]
pub struct TreeIndex<'a> {
    root: &'a DecisionNode,
    by_id: HashMap<&'a str, &'a DecisionNode>,
    order: Vec<&'a DecisionNode>,
}

impl<'a> TreeIndex<'a> {
    /// Index and validate a tree.
    ///
    /// # Errors
    ///
    /// Returns the first [`TreeError`] found, in pre-order.
    pub fn build(root: &'a DecisionNode) -> Result<Self, TreeError> {
        let mut by_id = HashMap::new();
        let mut order = Vec::new();
        let mut stack: Vec<(&'a DecisionNode, &'a str)> = vec![(root, ROOT_PARENT)];

        while let Some((node, parent)) = stack.pop() {
            let id = node.node_id().as_str();
            if id.is_empty() {
                return Err(TreeError::EmptyNodeId {
                    parent: parent.to_string(),
                });
            }
            if by_id.insert(id, node).is_some() {
                return Err(TreeError::DuplicateNodeId {
                    node_id: id.to_string(),
                });
            }
            order.push(node);
            for child in node.structural_children().into_iter().rev() {
                stack.push((child, id));
            }
        }

        let index = Self { root, by_id, order };
        index.check_references()?;
        index.check_acyclic()?;
        tracing::debug!(root = %root.node_id(), nodes = index.len(), "tree validated");
        Ok(index)
    }

    /// The root node.
    pub fn root(&self) -> &'a DecisionNode {
        self.root
    }

    /// Look up a node by id.
    pub fn get(&self, id: &str) -> Option<&'a DecisionNode> {
        self.by_id.get(id).copied()
    }

    /// Number of indexed nodes.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the index is empty. Never true for a built index.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// All nodes in structural pre-order.
    pub fn nodes(&self) -> impl Iterator<Item = &'a DecisionNode> + '_ {
        self.order.iter().copied()
    }

    /// Nodes evaluation may move to from `node`, in branch order.
    ///
    /// Routers yield every branch target; use [`TreeIndex::route`] to pick
    /// the one for a jurisdiction.
    pub fn successors(&self, node: &'a DecisionNode) -> Vec<&'a DecisionNode> {
        match node {
            DecisionNode::Condition(n) => vec![&*n.children.when_true, &*n.children.when_false],
            DecisionNode::Leaf(_) => Vec::new(),
            DecisionNode::Group(n) => self.get(n.entry_node_id.as_str()).into_iter().collect(),
            DecisionNode::Router(n) => n
                .branches
                .iter()
                .filter_map(|b| self.get(b.target_node_id.as_str()))
                .collect(),
            DecisionNode::ConflictAnchor(n) => vec![&*n.next],
        }
    }

    /// The node a router continues at for the given jurisdiction.
    pub fn route(
        &self,
        router: &'a RouterNode,
        context: &JurisdictionContext,
    ) -> Option<&'a DecisionNode> {
        router
            .branch_for(&context.jurisdiction, context.role)
            .and_then(|b| self.get(b.target_node_id.as_str()))
    }

    /// Every leaf reachable from `start` along successors, depth-first with
    /// `true` branches before `false`, each leaf listed once.
    ///
    /// With a context, routers only follow the branch selected for it.
    pub fn reachable_leaves(
        &self,
        start: &'a DecisionNode,
        context: Option<&JurisdictionContext>,
    ) -> Vec<&'a LeafNode> {
        let mut leaves = Vec::new();
        let mut seen: HashSet<&'a str> = HashSet::new();
        let mut stack = vec![start];
        while let Some(node) = stack.pop() {
            if !seen.insert(node.node_id().as_str()) {
                continue;
            }
            let next = match (node, context) {
                (DecisionNode::Leaf(leaf), _) => {
                    leaves.push(leaf);
                    continue;
                }
                (DecisionNode::Router(router), Some(ctx)) => {
                    self.route(router, ctx).into_iter().collect()
                }
                _ => self.successors(node),
            };
            stack.extend(next.into_iter().rev());
        }
        leaves
    }

    fn check_references(&self) -> Result<(), TreeError> {
        for node in &self.order {
            let from = node.node_id().as_str();
            let mut refs: Vec<(&str, &'static str)> = Vec::new();
            match node {
                DecisionNode::Group(g) => {
                    refs.push((g.entry_node_id.as_str(), "entryNodeId"));
                    if let Some(exit) = &g.exit_node_id {
                        refs.push((exit.as_str(), "exitNodeId"));
                    }
                }
                DecisionNode::Router(r) => {
                    refs.extend(
                        r.branches
                            .iter()
                            .map(|b| (b.target_node_id.as_str(), "targetNodeId")),
                    );
                }
                _ => {}
            }
            for (target, field) in refs {
                if !self.by_id.contains_key(target) {
                    return Err(TreeError::DanglingReference {
                        from: from.to_string(),
                        target: target.to_string(),
                        field,
                    });
                }
            }
        }
        Ok(())
    }

    fn check_acyclic(&self) -> Result<(), TreeError> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Active,
            Done,
        }

        struct Frame<'n> {
            node: &'n DecisionNode,
            next: Vec<&'n DecisionNode>,
            cursor: usize,
        }

        let mut marks: HashMap<&'a str, Mark> = HashMap::new();
        for &start in &self.order {
            if marks.contains_key(start.node_id().as_str()) {
                continue;
            }
            marks.insert(start.node_id().as_str(), Mark::Active);
            let mut stack = vec![Frame {
                node: start,
                next: self.successors(start),
                cursor: 0,
            }];

            while let Some(frame) = stack.last_mut() {
                if frame.cursor == frame.next.len() {
                    marks.insert(frame.node.node_id().as_str(), Mark::Done);
                    stack.pop();
                    continue;
                }
                let child = frame.next[frame.cursor];
                frame.cursor += 1;
                match marks.get(child.node_id().as_str()) {
                    Some(Mark::Active) => {
                        return Err(TreeError::Cycle {
                            node_id: child.node_id().to_string(),
                        })
                    }
                    Some(Mark::Done) => {}
                    None => {
                        marks.insert(child.node_id().as_str(), Mark::Active);
                        stack.push(Frame {
                            node: child,
                            next: self.successors(child),
                            cursor: 0,
                        });
                    }
                }
            }
        }
        Ok(())
    }
}
