//! # Tree Evaluator
//!
//! Walks a validated rule tree from the root, following exactly one path:
//!
//! - **condition**: evaluate, append a [`TraceNode`], take the `true` or
//!   `false` child;
//! - **group**: jump to `entryNodeId`;
//! - **router**: take the branch for the jurisdiction under evaluation;
//! - **conflict anchor**: record it and continue at `next`;
//! - **leaf**: stop.
//!
//! There is no backtracking. When a condition's fact is missing the walk
//! stops there and the result becomes partial: every leaf still reachable
//! under the blocking condition, and every fact that would narrow it down.
//!
//! The walk only moves along successors the [`TreeIndex`] has validated, so
//! it always terminates.

use std::collections::HashSet;

use tracing::{debug, trace};

use droit_core::{
    ConditionNode, DecisionNode, Facts, JurisdictionContext, LeafNode, NodeId, TreeError,
    TreeIndex,
};

use crate::condition::evaluate_condition;
use crate::error::EvalError;
use crate::trace::{Evaluation, EvaluationResult, PartialEvaluationResult, TraceNode};

// ---------------------------------------------------------------------------
// Public entry points
// ---------------------------------------------------------------------------

/// Evaluate a tree that contains no router nodes.
///
/// # Errors
///
/// [`EvalError::Malformed`] for structural defects and
/// [`EvalError::RouterOutsideJurisdiction`] if the walk reaches a router.
pub fn evaluate_tree(root: &DecisionNode, facts: &Facts) -> Result<Evaluation, EvalError> {
    let index = TreeIndex::build(root)?;
    evaluate_indexed(&index, facts, None)
}

/// Evaluate a tree on behalf of one jurisdiction, routing where needed.
pub fn evaluate_for_jurisdiction(
    root: &DecisionNode,
    facts: &Facts,
    context: &JurisdictionContext,
) -> Result<Evaluation, EvalError> {
    let index = TreeIndex::build(root)?;
    evaluate_indexed(&index, facts, Some(context))
}

/// Evaluate over a prebuilt index.
pub fn evaluate_indexed(
    index: &TreeIndex<'_>,
    facts: &Facts,
    context: Option<&JurisdictionContext>,
) -> Result<Evaluation, EvalError> {
    let walk = Walker::new(index, facts, context).walk()?;
    match walk.stop {
        Stop::Leaf(leaf) => {
            debug!(leaf = %leaf.node_id, steps = walk.trace.len(), "evaluation decided");
            Ok(Evaluation::Decided(EvaluationResult {
                leaf: leaf.clone(),
                trace: walk.trace,
                anchors: walk.anchors,
                path: walk.path,
            }))
        }
        Stop::Blocked(node) => {
            let partial = Walker::new(index, facts, context).explain(node, walk.trace);
            debug!(
                blocked_at = %node.node_id,
                missing = partial.missing_facts.len(),
                "evaluation undetermined"
            );
            Ok(Evaluation::Undetermined(partial))
        }
    }
}

/// Partially evaluate a tree that contains no router nodes.
pub fn evaluate_partial(
    root: &DecisionNode,
    facts: &Facts,
) -> Result<PartialEvaluationResult, EvalError> {
    let index = TreeIndex::build(root)?;
    evaluate_partial_indexed(&index, facts, None)
}

/// Partially evaluate a tree on behalf of one jurisdiction.
pub fn evaluate_partial_for_jurisdiction(
    root: &DecisionNode,
    facts: &Facts,
    context: &JurisdictionContext,
) -> Result<PartialEvaluationResult, EvalError> {
    let index = TreeIndex::build(root)?;
    evaluate_partial_indexed(&index, facts, Some(context))
}

/// Partially evaluate over a prebuilt index.
///
/// When every fact on the path is known, the result holds the single leaf
/// reached, no missing facts and the full trace.
pub fn evaluate_partial_indexed(
    index: &TreeIndex<'_>,
    facts: &Facts,
    context: Option<&JurisdictionContext>,
) -> Result<PartialEvaluationResult, EvalError> {
    let walker = Walker::new(index, facts, context);
    let walk = walker.walk()?;
    Ok(match walk.stop {
        Stop::Leaf(leaf) => PartialEvaluationResult {
            reachable_leaves: vec![leaf.clone()],
            missing_facts: Vec::new(),
            partial_trace: walk.trace,
            blocked_at: None,
        },
        Stop::Blocked(node) => walker.explain(node, walk.trace),
    })
}

// ---------------------------------------------------------------------------
// Walker
// ---------------------------------------------------------------------------

enum Stop<'a> {
    Leaf(&'a LeafNode),
    Blocked(&'a ConditionNode),
}

struct Walk<'a> {
    stop: Stop<'a>,
    trace: Vec<TraceNode>,
    anchors: Vec<NodeId>,
    path: Vec<NodeId>,
}

struct Walker<'i, 'a, 'f> {
    index: &'i TreeIndex<'a>,
    facts: &'f Facts,
    context: Option<&'f JurisdictionContext>,
}

impl<'i, 'a, 'f> Walker<'i, 'a, 'f> {
    fn new(
        index: &'i TreeIndex<'a>,
        facts: &'f Facts,
        context: Option<&'f JurisdictionContext>,
    ) -> Self {
        Self {
            index,
            facts,
            context,
        }
    }

    /// Follow the single path the facts select until a leaf or a blocker.
    fn walk(&self) -> Result<Walk<'a>, EvalError> {
        let mut trace = Vec::new();
        let mut anchors = Vec::new();
        let mut path = Vec::new();
        let mut node = self.index.root();

        loop {
            match node {
                DecisionNode::Condition(c) => {
                    let Some(result) = evaluate_condition(&c.condition, self.facts) else {
                        trace!(node = %c.node_id, fact = %c.condition.fact, "fact missing");
                        return Ok(Walk {
                            stop: Stop::Blocked(c),
                            trace,
                            anchors,
                            path,
                        });
                    };
                    trace!(node = %c.node_id, result, "condition evaluated");
                    trace.push(TraceNode::record(c, self.facts, result, trace.len()));
                    path.push(c.node_id.clone());
                    node = if result {
                        &*c.children.when_true
                    } else {
                        &*c.children.when_false
                    };
                }
                DecisionNode::Leaf(leaf) => {
                    path.push(leaf.node_id.clone());
                    return Ok(Walk {
                        stop: Stop::Leaf(leaf),
                        trace,
                        anchors,
                        path,
                    });
                }
                DecisionNode::Group(g) => {
                    path.push(g.node_id.clone());
                    node = self.resolve(&g.node_id, &g.entry_node_id, "entryNodeId")?;
                }
                DecisionNode::Router(r) => {
                    let ctx = self
                        .context
                        .ok_or_else(|| EvalError::RouterOutsideJurisdiction {
                            node_id: r.node_id.to_string(),
                        })?;
                    let branch = r.branch_for(&ctx.jurisdiction, ctx.role).ok_or_else(|| {
                        EvalError::NoRouterBranch {
                            node_id: r.node_id.to_string(),
                            jurisdiction: ctx.jurisdiction.clone(),
                            role: ctx.role,
                        }
                    })?;
                    path.push(r.node_id.clone());
                    node = self.resolve(&r.node_id, &branch.target_node_id, "targetNodeId")?;
                }
                DecisionNode::ConflictAnchor(a) => {
                    anchors.push(a.node_id.clone());
                    path.push(a.node_id.clone());
                    node = &*a.next;
                }
            }
        }
    }

    /// Build the partial result for a walk stopped at `blocker`.
    fn explain(
        &self,
        blocker: &'a ConditionNode,
        trace: Vec<TraceNode>,
    ) -> PartialEvaluationResult {
        let start = self
            .index
            .get(blocker.node_id.as_str())
            .unwrap_or(self.index.root());
        let reachable_leaves = self
            .index
            .reachable_leaves(start, self.context)
            .into_iter()
            .cloned()
            .collect();

        PartialEvaluationResult {
            reachable_leaves,
            missing_facts: self.missing_below(start),
            partial_trace: trace,
            blocked_at: Some(blocker.node_id.clone()),
        }
    }

    /// Explore below `start` symbolically: known facts pick their branch,
    /// unknown facts explore both and are recorded in first-seen order.
    fn missing_below(&self, start: &'a DecisionNode) -> Vec<String> {
        let mut missing: Vec<String> = Vec::new();
        let mut seen_facts: HashSet<&str> = HashSet::new();
        let mut visited: HashSet<&str> = HashSet::new();
        let mut stack = vec![start];

        while let Some(node) = stack.pop() {
            if !visited.insert(node.node_id().as_str()) {
                continue;
            }
            let next: Vec<&'a DecisionNode> = match node {
                DecisionNode::Condition(c) => match evaluate_condition(&c.condition, self.facts) {
                    Some(true) => vec![&*c.children.when_true],
                    Some(false) => vec![&*c.children.when_false],
                    None => {
                        if seen_facts.insert(c.condition.fact.as_str()) {
                            missing.push(c.condition.fact.clone());
                        }
                        vec![&*c.children.when_true, &*c.children.when_false]
                    }
                },
                DecisionNode::Router(r) => match self.context {
                    Some(ctx) => self.index.route(r, ctx).into_iter().collect(),
                    None => self.index.successors(node),
                },
                _ => self.index.successors(node),
            };
            stack.extend(next.into_iter().rev());
        }
        missing
    }

    fn resolve(
        &self,
        from: &NodeId,
        target: &NodeId,
        field: &'static str,
    ) -> Result<&'a DecisionNode, EvalError> {
        self.index.get(target.as_str()).ok_or_else(|| {
            EvalError::Malformed(TreeError::DanglingReference {
                from: from.to_string(),
                target: target.to_string(),
                field,
            })
        })
    }
}
