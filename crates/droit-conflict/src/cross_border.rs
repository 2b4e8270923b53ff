//! # Cross-Border Scenario Evaluation
//!
//! Evaluates one shared fact bag against every participating jurisdiction's
//! rule tree, then composes the outcomes: conflicts between jurisdictions,
//! the merged obligation set, and an overall status folded with the
//! pessimistic lattice meet.
//!
//! A jurisdiction whose evaluation is undetermined is listed with its
//! missing facts. It contributes the strictest status it could still reach
//! to the overall status, and no conflicts.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use droit_core::{
    ComplianceStatus, DecisionNode, Facts, JurisdictionCode, JurisdictionContext,
    JurisdictionRole,
};
use droit_eval::{evaluate_for_jurisdiction, EvalError, Evaluation};

use crate::conflict::{ConflictSeverity, CrossBorderConflict};
use crate::detect::{detect_conflicts_with, merge_obligations};
use crate::evaluation::JurisdictionEvaluation;
use crate::policy::ConflictPolicy;

/// One participating jurisdiction and the rule tree of its regime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JurisdictionRule {
    /// The jurisdiction.
    pub jurisdiction: JurisdictionCode,
    /// Its role in the scenario.
    pub role: JurisdictionRole,
    /// The regime the tree encodes.
    pub regime_id: String,
    /// The regime's rule tree.
    pub tree: DecisionNode,
}

impl JurisdictionRule {
    /// The context this rule is evaluated in.
    pub fn context(&self) -> JurisdictionContext {
        JurisdictionContext::new(self.jurisdiction.clone(), self.role)
    }
}

/// Shared facts plus the jurisdictions to evaluate them against.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossBorderScenario {
    /// Facts describing the activity.
    pub facts: Facts,
    /// Participating jurisdictions.
    pub rules: Vec<JurisdictionRule>,
}

/// A jurisdiction that could not reach a decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UndeterminedJurisdiction {
    /// The jurisdiction.
    pub jurisdiction: JurisdictionCode,
    /// Facts that would settle it.
    pub missing_facts: Vec<String>,
}

/// Composed outcome of a cross-border scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossBorderEvaluation {
    /// Decided jurisdictions, in scenario order.
    pub evaluations: Vec<JurisdictionEvaluation>,
    /// Jurisdictions blocked on missing facts, in scenario order.
    pub undetermined: Vec<UndeterminedJurisdiction>,
    /// Conflicts between decided jurisdictions.
    pub conflicts: Vec<CrossBorderConflict>,
    /// Union of every decided jurisdiction's obligations.
    pub merged_obligations: BTreeSet<String>,
    /// Meet of every jurisdiction's status.
    pub overall_status: ComplianceStatus,
    /// Number of blocking conflicts.
    pub blocking_count: usize,
    /// Number of warning conflicts.
    pub warning_count: usize,
    /// Whether every conflict can be resolved.
    pub all_resolvable: bool,
}

/// Evaluate a scenario under the default conflict policy.
pub fn evaluate_cross_border(
    scenario: &CrossBorderScenario,
) -> Result<CrossBorderEvaluation, EvalError> {
    evaluate_cross_border_with(scenario, &ConflictPolicy::default())
}

/// Evaluate a scenario under an explicit conflict policy.
///
/// # Errors
///
/// The first [`EvalError`] any jurisdiction's tree raises.
pub fn evaluate_cross_border_with(
    scenario: &CrossBorderScenario,
    policy: &ConflictPolicy,
) -> Result<CrossBorderEvaluation, EvalError> {
    let mut evaluations = Vec::new();
    let mut undetermined = Vec::new();
    // Top of the lattice: a scenario with no jurisdictions has no applicable rules.
    let mut overall_status = ComplianceStatus::NoApplicableRules;

    for rule in &scenario.rules {
        let context = rule.context();
        let outcome = evaluate_for_jurisdiction(&rule.tree, &scenario.facts, &context)
            .map_err(|e| {
                warn!(
                    jurisdiction = %rule.jurisdiction,
                    regime = %rule.regime_id,
                    error = %e,
                    "evaluation failed"
                );
                e
            })?;
        match outcome {
            Evaluation::Decided(result) => {
                let eval = JurisdictionEvaluation::from_result(&context, &rule.regime_id, &result);
                overall_status = overall_status.meet(eval.status);
                evaluations.push(eval);
            }
            Evaluation::Undetermined(partial) => {
                if let Some(worst) = partial.possible_statuses().into_iter().next() {
                    overall_status = overall_status.meet(worst);
                }
                undetermined.push(UndeterminedJurisdiction {
                    jurisdiction: rule.jurisdiction.clone(),
                    missing_facts: partial.missing_facts,
                });
            }
        }
    }

    let conflicts = detect_conflicts_with(&evaluations, policy);
    let blocking_count = count_severity(&conflicts, ConflictSeverity::Blocking);
    let warning_count = count_severity(&conflicts, ConflictSeverity::Warning);
    let all_resolvable = conflicts.iter().all(|c| c.resolvable);
    let merged_obligations = merge_obligations(&evaluations);

    debug!(
        decided = evaluations.len(),
        undetermined = undetermined.len(),
        conflicts = conflicts.len(),
        overall = %overall_status,
        "cross-border evaluation complete"
    );

    Ok(CrossBorderEvaluation {
        evaluations,
        undetermined,
        conflicts,
        merged_obligations,
        overall_status,
        blocking_count,
        warning_count,
        all_resolvable,
    })
}

fn count_severity(conflicts: &[CrossBorderConflict], severity: ConflictSeverity) -> usize {
    conflicts.iter().filter(|c| c.severity == severity).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn rule(code: &str, role: JurisdictionRole, tree: Value) -> JurisdictionRule {
        JurisdictionRule {
            jurisdiction: JurisdictionCode::new(code).unwrap(),
            role,
            regime_id: format!("{code}-regime"),
            tree: serde_json::from_value(tree).unwrap(),
        }
    }

    fn gate(fact: &str, yes: (&str, &str), no: (&str, &str)) -> Value {
        json!({
            "nodeId": format!("{fact}-gate"),
            "type": "condition",
            "condition": {"fact": fact, "op": "eq", "value": true},
            "children": {
                "true": {"nodeId": yes.0, "type": "leaf", "decision": yes.0, "status": yes.1, "obligations": ["register"]},
                "false": {"nodeId": no.0, "type": "leaf", "decision": no.0, "status": no.1}
            }
        })
    }

    #[test]
    fn composes_decided_jurisdictions() {
        let scenario = CrossBorderScenario {
            facts: Facts::from_value(json!({"licensed": true, "local": false})).unwrap(),
            rules: vec![
                rule(
                    "EU",
                    JurisdictionRole::Home,
                    gate("licensed", ("eu-ok", "requires_action"), ("eu-no", "blocked")),
                ),
                rule(
                    "SG",
                    JurisdictionRole::Target,
                    gate("local", ("sg-ok", "compliant"), ("sg-no", "blocked")),
                ),
            ],
        };
        let out = evaluate_cross_border(&scenario).unwrap();
        assert_eq!(out.evaluations.len(), 2);
        assert!(out.undetermined.is_empty());
        assert_eq!(out.overall_status, ComplianceStatus::Blocked);
        assert_eq!(out.blocking_count, 1);
        assert_eq!(out.warning_count, 0);
        assert!(!out.all_resolvable);
        assert_eq!(out.conflicts[0].id, "decision:EU:SG");
        assert_eq!(out.merged_obligations.len(), 1);
    }

    #[test]
    fn undetermined_jurisdictions_are_listed() {
        let scenario = CrossBorderScenario {
            facts: Facts::from_value(json!({"licensed": true})).unwrap(),
            rules: vec![
                rule(
                    "EU",
                    JurisdictionRole::Home,
                    gate("licensed", ("eu-ok", "compliant"), ("eu-no", "blocked")),
                ),
                rule(
                    "SG",
                    JurisdictionRole::Target,
                    gate("local", ("sg-ok", "compliant"), ("sg-no", "requires_action")),
                ),
            ],
        };
        let out = evaluate_cross_border(&scenario).unwrap();
        assert_eq!(out.evaluations.len(), 1);
        assert_eq!(out.undetermined.len(), 1);
        assert_eq!(out.undetermined[0].missing_facts, vec!["local"]);
        assert_eq!(out.overall_status, ComplianceStatus::RequiresAction);
        assert!(out.conflicts.is_empty());
        assert!(out.all_resolvable);
    }

    #[test]
    fn empty_scenario_has_no_applicable_rules() {
        let out = evaluate_cross_border(&CrossBorderScenario::default()).unwrap();
        assert_eq!(out.overall_status, ComplianceStatus::NoApplicableRules);
        assert!(out.all_resolvable);
    }

    #[test]
    fn router_trees_route_per_jurisdiction() {
        let shared = json!({
            "nodeId": "r", "type": "router",
            "branches": [
                {"jurisdiction": "EU", "role": "home", "targetNodeId": "eu"},
                {"jurisdiction": "SG", "role": "target", "targetNodeId": "sg"}
            ],
            "children": [
                {"nodeId": "eu", "type": "leaf", "decision": "eu", "status": "compliant"},
                {"nodeId": "sg", "type": "leaf", "decision": "sg", "status": "blocked"}
            ]
        });
        let scenario = CrossBorderScenario {
            facts: Facts::new(),
            rules: vec![
                rule("EU", JurisdictionRole::Home, shared.clone()),
                rule("SG", JurisdictionRole::Target, shared),
            ],
        };
        let out = evaluate_cross_border(&scenario).unwrap();
        let leaves: Vec<&str> = out.evaluations.iter().map(|e| e.leaf_id.as_str()).collect();
        assert_eq!(leaves, vec!["eu", "sg"]);
        assert_eq!(out.blocking_count, 1);
    }

    #[test]
    fn missing_router_branch_is_an_error() {
        let tree = json!({
            "nodeId": "r", "type": "router",
            "branches": [{"jurisdiction": "EU", "role": "home", "targetNodeId": "eu"}],
            "children": [{"nodeId": "eu", "type": "leaf", "decision": "eu", "status": "compliant"}]
        });
        let scenario = CrossBorderScenario {
            facts: Facts::new(),
            rules: vec![rule("SG", JurisdictionRole::Target, tree)],
        };
        assert!(matches!(
            evaluate_cross_border(&scenario),
            Err(EvalError::NoRouterBranch { .. })
        ));
    }
}
