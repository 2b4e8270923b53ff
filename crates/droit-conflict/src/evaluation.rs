//! # Per-Jurisdiction Evaluations
//!
//! A [`JurisdictionEvaluation`] is one jurisdiction's decided outcome,
//! flattened out of its [`EvaluationResult`] into the shape conflict
//! detection compares.

use serde::{Deserialize, Serialize};

use droit_core::{
    ActionDeadline, ComplianceStatus, JurisdictionCode, JurisdictionContext, JurisdictionRole,
    NodeId,
};
use droit_eval::{EvaluationResult, TraceNode};

/// The decided outcome of one jurisdiction's regime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JurisdictionEvaluation {
    /// The jurisdiction.
    pub jurisdiction: JurisdictionCode,
    /// Its role in the scenario.
    pub role: JurisdictionRole,
    /// The regime (rule set) that was evaluated.
    pub regime_id: String,
    /// Status of the leaf reached.
    pub status: ComplianceStatus,
    /// Conditions evaluated on the way.
    pub trace: Vec<TraceNode>,
    /// Id of the leaf reached.
    pub leaf_id: NodeId,
    /// Obligations the leaf triggers.
    pub obligations: Vec<String>,
    /// Classification the leaf assigns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<String>,
    /// Deadlines the leaf sets.
    #[serde(default)]
    pub deadlines: Vec<ActionDeadline>,
    /// Conflict anchors passed through.
    #[serde(default)]
    pub anchors: Vec<NodeId>,
}

impl JurisdictionEvaluation {
    /// Flatten a decided result for one jurisdiction.
    pub fn from_result(
        context: &JurisdictionContext,
        regime_id: impl Into<String>,
        result: &EvaluationResult,
    ) -> Self {
        let leaf = &result.leaf;
        Self {
            jurisdiction: context.jurisdiction.clone(),
            role: context.role,
            regime_id: regime_id.into(),
            status: leaf.status,
            trace: result.trace.clone(),
            leaf_id: leaf.node_id.clone(),
            obligations: leaf.obligations().to_vec(),
            classification: leaf.classification.clone(),
            deadlines: leaf.deadlines().to_vec(),
            anchors: result.anchors.clone(),
        }
    }

    /// A minimal evaluation with only a status, for building scenarios by
    /// hand.
    pub fn new(
        jurisdiction: JurisdictionCode,
        role: JurisdictionRole,
        regime_id: impl Into<String>,
        status: ComplianceStatus,
    ) -> Self {
        let regime_id = regime_id.into();
        Self {
            leaf_id: NodeId::new(format!("{regime_id}:leaf")),
            jurisdiction,
            role,
            regime_id,
            status,
            trace: Vec::new(),
            obligations: Vec::new(),
            classification: None,
            deadlines: Vec::new(),
            anchors: Vec::new(),
        }
    }

    /// Set the obligations, returning `self` for chaining.
    pub fn with_obligations<I, S>(mut self, obligations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.obligations = obligations.into_iter().map(Into::into).collect();
        self
    }

    /// Set the classification, returning `self` for chaining.
    pub fn with_classification(mut self, classification: impl Into<String>) -> Self {
        self.classification = Some(classification.into());
        self
    }

    /// Set the deadlines, returning `self` for chaining.
    pub fn with_deadlines(mut self, deadlines: Vec<ActionDeadline>) -> Self {
        self.deadlines = deadlines;
        self
    }

    /// Set the anchors, returning `self` for chaining.
    pub fn with_anchors<I: IntoIterator<Item = NodeId>>(mut self, anchors: I) -> Self {
        self.anchors = anchors.into_iter().collect();
        self
    }
}
