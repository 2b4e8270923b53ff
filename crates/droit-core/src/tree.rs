//! # Rule Tree Model
//!
//! A rule tree is a rooted, finite structure of [`DecisionNode`]s. The node
//! kinds form a closed, serde-tagged enum:
//!
//! | `type` | Variant | Role |
//! |---|---|---|
//! | `condition` | [`ConditionNode`] | tests one fact, branches `true`/`false` |
//! | `leaf` | [`LeafNode`] | terminal decision |
//! | `group` | [`GroupNode`] | organizational region, entered by id |
//! | `router` | [`RouterNode`] | per-jurisdiction fan-out |
//! | `conflict_anchor` | [`ConflictAnchorNode`] | cross-jurisdiction marker |
//!
//! Condition children and anchor successors are nested values. Group entry
//! points and router targets are id references resolved through
//! [`TreeIndex`](crate::TreeIndex), which also rejects dangling references
//! and cycles before anything walks the tree.
//!
//! Field names serialize in camelCase (`nodeId`, `entryNodeId`, ...), which is
//! the contract tree viewers and trace explorers rely on.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::identity::{JurisdictionCode, NodeId};
use crate::jurisdiction::JurisdictionRole;
use crate::rule::SourceReference;
use crate::status::ComplianceStatus;

// ---------------------------------------------------------------------------
// Conditions
// ---------------------------------------------------------------------------

/// Comparison operator applied by a condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConditionOp {
    /// Deep equality.
    Eq,
    /// Deep inequality.
    Neq,
    /// Numeric greater-than.
    Gt,
    /// Numeric less-than.
    Lt,
    /// Numeric greater-or-equal.
    Gte,
    /// Numeric less-or-equal.
    Lte,
    /// Fact value is a member of the expected array.
    In,
    /// Expected value is a member of the fact array.
    Contains,
    /// Fact value, as text, matches the expected regular expression.
    Matches,
    /// Fact is absent or null.
    #[serde(rename = "nil?")]
    IsNil,
    /// Fact is present and not null.
    #[serde(rename = "some?")]
    IsSome,
}

impl ConditionOp {
    /// Returns the wire identifier (`"eq"`, `"nil?"`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Neq => "neq",
            Self::Gt => "gt",
            Self::Lt => "lt",
            Self::Gte => "gte",
            Self::Lte => "lte",
            Self::In => "in",
            Self::Contains => "contains",
            Self::Matches => "matches",
            Self::IsNil => "nil?",
            Self::IsSome => "some?",
        }
    }

    /// Whether the operator can be decided when the fact is absent.
    ///
    /// Only the presence tests can; every other operator needs the fact and
    /// reports "missing" instead of `false`.
    pub fn decides_absence(&self) -> bool {
        matches!(self, Self::IsNil | Self::IsSome)
    }

    /// Whether the operator ignores its expected value.
    pub fn is_unary(&self) -> bool {
        self.decides_absence()
    }
}

impl fmt::Display for ConditionOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single test of one fact against an expected value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    /// Dotted path to the fact, e.g. `"instrument.type"`.
    pub fact: String,
    /// The comparison operator.
    pub op: ConditionOp,
    /// The value to compare against. Ignored by `nil?` / `some?`.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub value: Value,
}

impl Condition {
    /// Create a condition.
    pub fn new(fact: impl Into<String>, op: ConditionOp, value: Value) -> Self {
        Self {
            fact: fact.into(),
            op,
            value,
        }
    }

    /// Human-readable rendering, e.g. `instrument.type eq "security_token"`.
    pub fn describe(&self) -> String {
        if self.op.is_unary() {
            format!("{} {}", self.fact, self.op)
        } else {
            format!("{} {} {}", self.fact, self.op, self.value)
        }
    }
}

// ---------------------------------------------------------------------------
// Node variants
// ---------------------------------------------------------------------------

/// Both outcomes of a condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Branches {
    /// Subtree taken when the condition holds.
    #[serde(rename = "true")]
    pub when_true: Box<DecisionNode>,
    /// Subtree taken when the condition does not hold.
    #[serde(rename = "false")]
    pub when_false: Box<DecisionNode>,
}

/// An internal node testing one condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionNode {
    /// Node identifier.
    pub node_id: NodeId,
    /// The condition to evaluate.
    pub condition: Condition,
    /// Regulatory citation for the condition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_ref: Option<SourceReference>,
    /// Human-readable annotation shown instead of the raw condition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation: Option<String>,
    /// The `true` and `false` subtrees.
    pub children: Branches,
}

impl ConditionNode {
    /// Display text: the annotation when present, otherwise the condition.
    pub fn display_text(&self) -> String {
        self.annotation
            .clone()
            .unwrap_or_else(|| self.condition.describe())
    }
}

/// A time window in which a required action must be performed, counted in
/// days from the start of the activity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionDeadline {
    /// The action (usually an obligation id) the window applies to.
    pub action: String,
    /// Earliest day the action can be completed.
    pub min_days: u32,
    /// Latest day the action must be completed by.
    pub max_days: u32,
    /// Actions that must be completed before this one.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prerequisites: Vec<String>,
}

/// A terminal decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeafNode {
    /// Node identifier.
    pub node_id: NodeId,
    /// The decision outcome label.
    pub decision: String,
    /// Compliance status the decision results in.
    pub status: ComplianceStatus,
    /// Obligations triggered by the decision.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub obligations: Option<Vec<String>>,
    /// Regulatory citation for the decision.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_ref: Option<SourceReference>,
    /// Regulatory category the decision assigns to the instrument or activity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<String>,
    /// Time windows for the required actions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadlines: Option<Vec<ActionDeadline>>,
}

impl LeafNode {
    /// Create a leaf with no obligations.
    pub fn new(
        node_id: impl Into<NodeId>,
        decision: impl Into<String>,
        status: ComplianceStatus,
    ) -> Self {
        Self {
            node_id: node_id.into(),
            decision: decision.into(),
            status,
            obligations: None,
            source_ref: None,
            classification: None,
            deadlines: None,
        }
    }

    /// Set the obligations, returning `self` for chaining.
    pub fn with_obligations<I, S>(mut self, obligations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.obligations = Some(obligations.into_iter().map(Into::into).collect());
        self
    }

    /// Set the classification, returning `self` for chaining.
    pub fn with_classification(mut self, classification: impl Into<String>) -> Self {
        self.classification = Some(classification.into());
        self
    }

    /// Set the deadlines, returning `self` for chaining.
    pub fn with_deadlines(mut self, deadlines: Vec<ActionDeadline>) -> Self {
        self.deadlines = Some(deadlines);
        self
    }

    /// The obligations, empty when none are declared.
    pub fn obligations(&self) -> &[String] {
        self.obligations.as_deref().unwrap_or(&[])
    }

    /// The deadlines, empty when none are declared.
    pub fn deadlines(&self) -> &[ActionDeadline] {
        self.deadlines.as_deref().unwrap_or(&[])
    }
}

/// A named, collapsible region of the tree.
///
/// Evaluation enters through `entry_node_id`, never by child order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupNode {
    /// Node identifier.
    pub node_id: NodeId,
    /// Display label.
    pub label: String,
    /// The node evaluation jumps to on entering the group.
    pub entry_node_id: NodeId,
    /// The node where the region conventionally ends.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_node_id: Option<NodeId>,
    /// Whether viewers render the group collapsed.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub collapsed: bool,
    /// Member subtrees, in display order.
    pub children: Vec<DecisionNode>,
}

/// One jurisdiction-tagged branch of a router.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouterBranch {
    /// The jurisdiction this branch applies to.
    pub jurisdiction: JurisdictionCode,
    /// The role the jurisdiction plays.
    pub role: JurisdictionRole,
    /// The node evaluation continues at.
    pub target_node_id: NodeId,
}

/// Fans out to per-jurisdiction branches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouterNode {
    /// Node identifier.
    pub node_id: NodeId,
    /// Display label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Branches, one per jurisdiction role.
    pub branches: Vec<RouterBranch>,
    /// Subtrees the branches point into.
    pub children: Vec<DecisionNode>,
}

impl RouterNode {
    /// Select the branch for a jurisdiction.
    ///
    /// A branch matching both code and role wins over one matching only the
    /// code; among equals the first declared branch wins.
    pub fn branch_for(
        &self,
        jurisdiction: &JurisdictionCode,
        role: JurisdictionRole,
    ) -> Option<&RouterBranch> {
        let mut matching = self
            .branches
            .iter()
            .filter(|b| &b.jurisdiction == jurisdiction);
        let first = matching.clone().next()?;
        Some(matching.find(|b| b.role == role).unwrap_or(first))
    }
}

/// Marks a known cross-jurisdiction tension point.
///
/// Anchors are transparent to evaluation: the walk passes straight through to
/// `next` without adding a trace entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictAnchorNode {
    /// Node identifier.
    pub node_id: NodeId,
    /// Id of the counterpart anchor, usually in another jurisdiction's tree.
    pub paired_anchor_id: NodeId,
    /// Display label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// The node evaluation continues at.
    pub next: Box<DecisionNode>,
}

// ---------------------------------------------------------------------------
// DecisionNode
// ---------------------------------------------------------------------------

/// The kind of a node, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// [`ConditionNode`].
    Condition,
    /// [`LeafNode`].
    Leaf,
    /// [`GroupNode`].
    Group,
    /// [`RouterNode`].
    Router,
    /// [`ConflictAnchorNode`].
    ConflictAnchor,
}

/// A rule-tree node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DecisionNode {
    /// Internal condition node.
    Condition(ConditionNode),
    /// Terminal decision.
    Leaf(LeafNode),
    /// Organizational group.
    Group(GroupNode),
    /// Per-jurisdiction router.
    Router(RouterNode),
    /// Cross-jurisdiction marker.
    ConflictAnchor(ConflictAnchorNode),
}

impl DecisionNode {
    /// The node's identifier.
    pub fn node_id(&self) -> &NodeId {
        match self {
            Self::Condition(n) => &n.node_id,
            Self::Leaf(n) => &n.node_id,
            Self::Group(n) => &n.node_id,
            Self::Router(n) => &n.node_id,
            Self::ConflictAnchor(n) => &n.node_id,
        }
    }

    /// The node's kind.
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Condition(_) => NodeKind::Condition,
            Self::Leaf(_) => NodeKind::Leaf,
            Self::Group(_) => NodeKind::Group,
            Self::Router(_) => NodeKind::Router,
            Self::ConflictAnchor(_) => NodeKind::ConflictAnchor,
        }
    }

    /// The leaf payload, if this is a leaf.
    pub fn as_leaf(&self) -> Option<&LeafNode> {
        match self {
            Self::Leaf(leaf) => Some(leaf),
            _ => None,
        }
    }

    /// Whether this node is a leaf.
    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf(_))
    }

    /// Short display label.
    pub fn label(&self) -> String {
        match self {
            Self::Condition(n) => n.display_text(),
            Self::Leaf(n) => n.decision.clone(),
            Self::Group(n) => n.label.clone(),
            Self::Router(n) => n.label.clone().unwrap_or_else(|| "router".to_string()),
            Self::ConflictAnchor(n) => n
                .label
                .clone()
                .unwrap_or_else(|| format!("anchor ↔ {}", n.paired_anchor_id)),
        }
    }

    /// Nested children in structural order: `true` before `false`, group and
    /// router members in declaration order, an anchor's successor.
    pub fn structural_children(&self) -> Vec<&DecisionNode> {
        match self {
            Self::Condition(n) => vec![&*n.children.when_true, &*n.children.when_false],
            Self::Leaf(_) => Vec::new(),
            Self::Group(n) => n.children.iter().collect(),
            Self::Router(n) => n.children.iter().collect(),
            Self::ConflictAnchor(n) => vec![&*n.next],
        }
    }

    /// All nodes of the subtree in pre-order, this node first.
    ///
    /// Iterative, so arbitrarily deep trees do not exhaust the stack.
    pub fn descendants(&self) -> Vec<&DecisionNode> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(node.structural_children().into_iter().rev());
        }
        out
    }
}

impl From<LeafNode> for DecisionNode {
    fn from(leaf: LeafNode) -> Self {
        Self::Leaf(leaf)
    }
}

impl From<ConditionNode> for DecisionNode {
    fn from(node: ConditionNode) -> Self {
        Self::Condition(node)
    }
}

/// Build a condition node from its parts.
pub fn condition_node(
    node_id: impl Into<NodeId>,
    condition: Condition,
    when_true: impl Into<DecisionNode>,
    when_false: impl Into<DecisionNode>,
) -> DecisionNode {
    DecisionNode::Condition(ConditionNode {
        node_id: node_id.into(),
        condition,
        source_ref: None,
        annotation: None,
        children: Branches {
            when_true: Box::new(when_true.into()),
            when_false: Box::new(when_false.into()),
        },
    })
}
