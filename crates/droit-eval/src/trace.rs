//! # Evaluation Results and Traces
//!
//! A decided evaluation carries the leaf reached and the ordered list of
//! conditions that led there. An undetermined one carries what is still
//! possible and which facts would settle it.
//!
//! Result types are plain values: freshly built per evaluation, never
//! sharing state with the tree they came from.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use droit_core::{
    ConditionNode, ConditionOp, Facts, LeafNode, NodeId, RuleDefinition, SourceReference,
    Timestamp,
};

/// One evaluated condition on the walk from root to leaf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceNode {
    /// The condition node's id.
    pub node_id: NodeId,
    /// Human-readable condition text.
    pub condition: String,
    /// The fact path tested.
    pub fact_path: String,
    /// The fact's value, `null` when absent.
    pub fact_value: Value,
    /// The value compared against.
    pub expected_value: Value,
    /// The operator applied.
    pub op: ConditionOp,
    /// The outcome.
    pub result: bool,
    /// Number of conditions evaluated before this one.
    pub depth: usize,
    /// Citation for the condition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_ref: Option<SourceReference>,
}

impl TraceNode {
    pub(crate) fn record(node: &ConditionNode, facts: &Facts, result: bool, depth: usize) -> Self {
        let condition = &node.condition;
        Self {
            node_id: node.node_id.clone(),
            condition: node.display_text(),
            fact_path: condition.fact.clone(),
            fact_value: facts.resolve(&condition.fact).cloned().unwrap_or(Value::Null),
            expected_value: condition.value.clone(),
            op: condition.op,
            result,
            depth,
            source_ref: node.source_ref.clone(),
        }
    }
}

/// A completed evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResult {
    /// The leaf reached.
    pub leaf: LeafNode,
    /// Conditions evaluated, root first.
    pub trace: Vec<TraceNode>,
    /// Conflict anchors passed through, in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub anchors: Vec<NodeId>,
    /// Every node visited, root first, ending with the leaf.
    #[serde(default)]
    pub path: Vec<NodeId>,
}

impl EvaluationResult {
    /// Ids of every node on the evaluated path, for highlighting.
    ///
    /// Covers traced conditions, anchors, groups and routers passed through,
    /// and the leaf.
    pub fn path_node_ids(&self) -> BTreeSet<NodeId> {
        self.trace
            .iter()
            .map(|t| t.node_id.clone())
            .chain(self.anchors.iter().cloned())
            .chain(self.path.iter().cloned())
            .chain(std::iter::once(self.leaf.node_id.clone()))
            .collect()
    }
}

/// An evaluation stopped by missing facts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialEvaluationResult {
    /// Leaves still possible, true branches first, each once.
    pub reachable_leaves: Vec<LeafNode>,
    /// Fact paths that block a decision, the first blocker first.
    pub missing_facts: Vec<String>,
    /// Conditions evaluated before the first blocker.
    pub partial_trace: Vec<TraceNode>,
    /// The first blocking condition, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocked_at: Option<NodeId>,
}

impl PartialEvaluationResult {
    /// Whether the evaluation actually reached a single decision.
    pub fn is_complete(&self) -> bool {
        self.missing_facts.is_empty()
    }

    /// Distinct statuses of the reachable leaves, strictest first.
    pub fn possible_statuses(&self) -> BTreeSet<droit_core::ComplianceStatus> {
        self.reachable_leaves.iter().map(|l| l.status).collect()
    }
}

/// Outcome of a full evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Evaluation {
    /// A leaf was reached.
    Decided(EvaluationResult),
    /// A required fact was missing.
    Undetermined(PartialEvaluationResult),
}

impl Evaluation {
    /// The decided result, if any.
    pub fn decided(&self) -> Option<&EvaluationResult> {
        match self {
            Self::Decided(result) => Some(result),
            Self::Undetermined(_) => None,
        }
    }

    /// Whether a leaf was reached.
    pub fn is_decided(&self) -> bool {
        matches!(self, Self::Decided(_))
    }

    /// Fact paths that block a decision. Empty when decided.
    pub fn missing_facts(&self) -> &[String] {
        match self {
            Self::Decided(_) => &[],
            Self::Undetermined(partial) => &partial.missing_facts,
        }
    }
}

/// Audit record of one decided evaluation of a versioned rule.
///
/// Built at the edge with the clock reading; the engine never stamps time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationTrace {
    /// The rule evaluated.
    pub rule_id: String,
    /// Its version.
    pub rule_version: String,
    /// Nodes visited, root first.
    pub path: Vec<NodeId>,
    /// The leaf reached.
    pub final_node: NodeId,
    /// When the evaluation ran.
    pub evaluated_at: Timestamp,
    /// The full result.
    pub result: EvaluationResult,
}

impl EvaluationTrace {
    /// Wrap a decided result for persistence.
    pub fn new(rule: &RuleDefinition, result: EvaluationResult, evaluated_at: Timestamp) -> Self {
        Self {
            rule_id: rule.id.clone(),
            rule_version: rule.version.clone(),
            path: result.path.clone(),
            final_node: result.leaf.node_id.clone(),
            evaluated_at,
            result,
        }
    }
}
