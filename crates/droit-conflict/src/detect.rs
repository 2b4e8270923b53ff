//! # Conflict Detection
//!
//! Compares every unordered pair of distinct jurisdictions and reports where
//! their decisions fail to compose:
//!
//! | Type | Trigger | Severity |
//! |---|---|---|
//! | decision | exactly one side `blocked` | blocking |
//! | obligation | a policy `forbids` pair | blocking |
//! | obligation | a policy `exclusive` pair | warning |
//! | classification | different, non-equivalent categories | warning |
//! | timeline | windows that cannot both be met | warning |
//! | timeline | windows that only partially overlap | info |
//!
//! Each pair is examined in sorted orientation (lower jurisdiction code
//! first) and findings are merged per `(type, pair)`, so the output does not
//! depend on input order. Merged conflicts keep the highest severity and the
//! union of anchors; their descriptions list every finding, sorted.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use droit_core::{ActionDeadline, JurisdictionCode, NodeId};

use crate::conflict::{ConflictSeverity, ConflictType, CrossBorderConflict};
use crate::evaluation::JurisdictionEvaluation;
use crate::policy::ConflictPolicy;

type ConflictKey = (ConflictType, JurisdictionCode, JurisdictionCode);

struct Finding {
    conflict_type: ConflictType,
    severity: ConflictSeverity,
    detail: String,
}

#[derive(Default)]
struct Draft {
    severity: Option<ConflictSeverity>,
    anchors: BTreeSet<NodeId>,
    details: BTreeSet<String>,
}

/// Detect conflicts under the default policy.
pub fn detect_conflicts(evaluations: &[JurisdictionEvaluation]) -> Vec<CrossBorderConflict> {
    detect_conflicts_with(evaluations, &ConflictPolicy::default())
}

/// Detect conflicts under an explicit policy.
///
/// Output is sorted by `(type, a, b)`.
pub fn detect_conflicts_with(
    evaluations: &[JurisdictionEvaluation],
    policy: &ConflictPolicy,
) -> Vec<CrossBorderConflict> {
    let mut drafts: BTreeMap<ConflictKey, Draft> = BTreeMap::new();

    for (i, first) in evaluations.iter().enumerate() {
        for second in &evaluations[i + 1..] {
            let (a, b) = match first.jurisdiction.cmp(&second.jurisdiction) {
                std::cmp::Ordering::Less => (first, second),
                std::cmp::Ordering::Greater => (second, first),
                std::cmp::Ordering::Equal => continue,
            };
            for finding in pair_findings(a, b, policy) {
                let key = (
                    finding.conflict_type,
                    a.jurisdiction.clone(),
                    b.jurisdiction.clone(),
                );
                let draft = drafts.entry(key).or_default();
                draft.severity = Some(match draft.severity {
                    Some(s) => s.max(finding.severity),
                    None => finding.severity,
                });
                draft.anchors.extend(a.anchors.iter().cloned());
                draft.anchors.extend(b.anchors.iter().cloned());
                draft.details.insert(finding.detail);
            }
        }
    }

    drafts
        .into_iter()
        .filter_map(|((conflict_type, a, b), draft)| {
            let severity = draft.severity?;
            let conflict = CrossBorderConflict {
                id: CrossBorderConflict::make_id(conflict_type, &a, &b),
                severity,
                conflict_type,
                anchor_node_ids: draft.anchors.into_iter().collect(),
                description: draft.details.into_iter().collect::<Vec<_>>().join("; "),
                resolution_strategy: policy.resolution_for(conflict_type),
                resolvable: severity != ConflictSeverity::Blocking,
                jurisdictions: vec![a, b],
            };
            debug!(id = %conflict.id, severity = %conflict.severity, "conflict detected");
            Some(conflict)
        })
        .collect()
}

/// Deduplicated union of every jurisdiction's obligations.
pub fn merge_obligations(evaluations: &[JurisdictionEvaluation]) -> BTreeSet<String> {
    evaluations
        .iter()
        .flat_map(|e| e.obligations.iter().cloned())
        .collect()
}

// ---------------------------------------------------------------------------
// Pair checks. `a.jurisdiction < b.jurisdiction` throughout.
// ---------------------------------------------------------------------------

fn pair_findings(
    a: &JurisdictionEvaluation,
    b: &JurisdictionEvaluation,
    policy: &ConflictPolicy,
) -> Vec<Finding> {
    let mut findings = Vec::new();
    findings.extend(decision_finding(a, b));
    findings.extend(obligation_findings(a, b, policy));
    findings.extend(classification_finding(a, b, policy));
    findings.extend(timeline_findings(a, b));
    findings
}

fn decision_finding(a: &JurisdictionEvaluation, b: &JurisdictionEvaluation) -> Option<Finding> {
    let (blocked, other) = match (a.status.is_blocking(), b.status.is_blocking()) {
        (true, false) => (a, b),
        (false, true) => (b, a),
        _ => return None,
    };
    Some(Finding {
        conflict_type: ConflictType::Decision,
        severity: ConflictSeverity::Blocking,
        detail: format!(
            "{} blocks the activity under {} while {} allows it ({}) under {}",
            blocked.jurisdiction,
            blocked.regime_id,
            other.jurisdiction,
            other.status,
            other.regime_id
        ),
    })
}

fn obligation_findings(
    a: &JurisdictionEvaluation,
    b: &JurisdictionEvaluation,
    policy: &ConflictPolicy,
) -> Vec<Finding> {
    let mut findings = Vec::new();
    for oa in &a.obligations {
        for ob in &b.obligations {
            let forbidding = if policy.forbids(oa, ob) {
                Some(format!("{}:{oa} forbids {}:{ob}", a.jurisdiction, b.jurisdiction))
            } else if policy.forbids(ob, oa) {
                Some(format!("{}:{ob} forbids {}:{oa}", b.jurisdiction, a.jurisdiction))
            } else {
                None
            };
            if let Some(detail) = forbidding {
                findings.push(Finding {
                    conflict_type: ConflictType::Obligation,
                    severity: ConflictSeverity::Blocking,
                    detail,
                });
            } else if policy.are_exclusive(oa, ob) {
                findings.push(Finding {
                    conflict_type: ConflictType::Obligation,
                    severity: ConflictSeverity::Warning,
                    detail: format!(
                        "{}:{oa} and {}:{ob} are mutually exclusive",
                        a.jurisdiction, b.jurisdiction
                    ),
                });
            }
        }
    }
    findings
}

fn classification_finding(
    a: &JurisdictionEvaluation,
    b: &JurisdictionEvaluation,
    policy: &ConflictPolicy,
) -> Option<Finding> {
    let (ca, cb) = (a.classification.as_deref()?, b.classification.as_deref()?);
    if policy.equivalent(ca, cb) {
        return None;
    }
    Some(Finding {
        conflict_type: ConflictType::Classification,
        severity: ConflictSeverity::Warning,
        detail: format!(
            "{} classifies as {ca} while {} classifies as {cb}",
            a.jurisdiction, b.jurisdiction
        ),
    })
}

fn timeline_findings(a: &JurisdictionEvaluation, b: &JurisdictionEvaluation) -> Vec<Finding> {
    let mut findings = Vec::new();
    for da in &a.deadlines {
        for db in &b.deadlines {
            let judged = if da.action == db.action {
                same_action(da, db)
            } else if db.prerequisites.contains(&da.action) {
                prerequisite(da, db)
            } else if da.prerequisites.contains(&db.action) {
                prerequisite(db, da)
            } else {
                None
            };
            if let Some((severity, what)) = judged {
                findings.push(Finding {
                    conflict_type: ConflictType::Timeline,
                    severity,
                    detail: format!(
                        "{}:{} [{}-{}d] vs {}:{} [{}-{}d] {what}",
                        a.jurisdiction,
                        da.action,
                        da.min_days,
                        da.max_days,
                        b.jurisdiction,
                        db.action,
                        db.min_days,
                        db.max_days
                    ),
                });
            }
        }
    }
    findings
}

/// Two windows for the same action.
fn same_action(x: &ActionDeadline, y: &ActionDeadline) -> Option<(ConflictSeverity, &'static str)> {
    if x.max_days < y.min_days || y.max_days < x.min_days {
        return Some((ConflictSeverity::Warning, "do not overlap"));
    }
    let x_within_y = y.min_days <= x.min_days && x.max_days <= y.max_days;
    let y_within_x = x.min_days <= y.min_days && y.max_days <= x.max_days;
    if x_within_y || y_within_x {
        None
    } else {
        Some((ConflictSeverity::Info, "only partially overlap"))
    }
}

/// `before` must be completed before `after`.
fn prerequisite(
    before: &ActionDeadline,
    after: &ActionDeadline,
) -> Option<(ConflictSeverity, &'static str)> {
    if before.min_days > after.max_days {
        Some((ConflictSeverity::Warning, "prerequisite opens after the dependent deadline"))
    } else if before.max_days > after.max_days {
        Some((ConflictSeverity::Info, "prerequisite window outlasts the dependent deadline"))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use droit_core::{ComplianceStatus, JurisdictionRole};

    fn eval(code: &str, status: ComplianceStatus) -> JurisdictionEvaluation {
        JurisdictionEvaluation::new(
            JurisdictionCode::new(code).unwrap(),
            JurisdictionRole::Target,
            format!("{code}-regime"),
            status,
        )
    }

    fn deadline(action: &str, min: u32, max: u32, prereq: &[&str]) -> ActionDeadline {
        ActionDeadline {
            action: action.into(),
            min_days: min,
            max_days: max,
            prerequisites: prereq.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn blocked_versus_compliant_is_a_blocking_decision_conflict() {
        let conflicts = detect_conflicts(&[
            eval("SG", ComplianceStatus::Compliant),
            eval("DE", ComplianceStatus::Blocked),
        ]);
        assert_eq!(conflicts.len(), 1);
        let c = &conflicts[0];
        assert_eq!(c.id, "decision:DE:SG");
        assert_eq!(c.severity, ConflictSeverity::Blocking);
        assert!(!c.resolvable);
        assert_eq!(c.jurisdictions[0].as_str(), "DE");
        assert!(c.description.starts_with("DE blocks the activity"));
    }

    #[test]
    fn status_ordering_alone_is_not_a_conflict() {
        let conflicts = detect_conflicts(&[
            eval("DE", ComplianceStatus::Compliant),
            eval("SG", ComplianceStatus::RequiresAction),
            eval("FR", ComplianceStatus::NoApplicableRules),
        ]);
        assert!(conflicts.is_empty());
    }

    #[test]
    fn both_blocked_is_not_a_conflict() {
        let conflicts = detect_conflicts(&[
            eval("DE", ComplianceStatus::Blocked),
            eval("SG", ComplianceStatus::Blocked),
        ]);
        assert!(conflicts.is_empty());
    }

    #[test]
    fn same_jurisdiction_is_never_paired() {
        let conflicts = detect_conflicts(&[
            eval("DE", ComplianceStatus::Blocked),
            eval("DE", ComplianceStatus::Compliant),
        ]);
        assert!(conflicts.is_empty());
    }

    #[test]
    fn obligation_policy_findings_merge_per_pair() {
        let policy = ConflictPolicy {
            exclusive: vec![["eu_wp".into(), "sg_pr".into()]],
            forbids: vec![["local_only".into(), "foreign_custody".into()]],
            ..ConflictPolicy::default()
        };
        let conflicts = detect_conflicts_with(
            &[
                eval("SG", ComplianceStatus::RequiresAction)
                    .with_obligations(["sg_pr", "local_only"]),
                eval("EU", ComplianceStatus::RequiresAction)
                    .with_obligations(["eu_wp", "foreign_custody"]),
            ],
            &policy,
        );
        assert_eq!(conflicts.len(), 1);
        let c = &conflicts[0];
        assert_eq!(c.id, "obligation:EU:SG");
        assert_eq!(c.severity, ConflictSeverity::Blocking);
        assert!(c.description.contains("SG:local_only forbids EU:foreign_custody"));
        assert!(c.description.contains("EU:eu_wp and SG:sg_pr are mutually exclusive"));
    }

    #[test]
    fn classification_respects_equivalence() {
        let a = eval("EU", ComplianceStatus::RequiresAction).with_classification("e_money_token");
        let b = eval("SG", ComplianceStatus::RequiresAction)
            .with_classification("digital_payment_token");
        let plain = detect_conflicts(&[a.clone(), b.clone()]);
        assert_eq!(plain.len(), 1);
        assert_eq!(plain[0].conflict_type, ConflictType::Classification);
        assert_eq!(plain[0].severity, ConflictSeverity::Warning);

        let policy = ConflictPolicy {
            equivalent: vec![vec!["e_money_token".into(), "digital_payment_token".into()]],
            ..ConflictPolicy::default()
        };
        assert!(detect_conflicts_with(&[a, b], &policy).is_empty());
    }

    #[test]
    fn classification_needs_both_sides() {
        let a = eval("EU", ComplianceStatus::Compliant).with_classification("art");
        let b = eval("SG", ComplianceStatus::Compliant);
        assert!(detect_conflicts(&[a, b]).is_empty());
    }

    #[test]
    fn disjoint_windows_warn_and_partial_overlap_informs() {
        let a = eval("EU", ComplianceStatus::RequiresAction)
            .with_deadlines(vec![deadline("notify", 0, 10, &[])]);
        let b = eval("SG", ComplianceStatus::RequiresAction)
            .with_deadlines(vec![deadline("notify", 20, 30, &[])]);
        let c = detect_conflicts(&[a.clone(), b]);
        assert_eq!(c[0].severity, ConflictSeverity::Warning);
        assert_eq!(c[0].id, "timeline:EU:SG");

        let b = eval("SG", ComplianceStatus::RequiresAction)
            .with_deadlines(vec![deadline("notify", 5, 30, &[])]);
        let c = detect_conflicts(&[a.clone(), b]);
        assert_eq!(c[0].severity, ConflictSeverity::Info);
        assert!(c[0].resolvable);

        let b = eval("SG", ComplianceStatus::RequiresAction)
            .with_deadlines(vec![deadline("notify", 2, 8, &[])]);
        assert!(detect_conflicts(&[a, b]).is_empty());
    }

    #[test]
    fn prerequisite_that_opens_too_late_warns() {
        let a = eval("EU", ComplianceStatus::RequiresAction)
            .with_deadlines(vec![deadline("passport", 30, 60, &[])]);
        let b = eval("SG", ComplianceStatus::RequiresAction)
            .with_deadlines(vec![deadline("launch", 0, 20, &["passport"])]);
        let c = detect_conflicts(&[b, a]);
        assert_eq!(c.len(), 1);
        assert_eq!(c[0].severity, ConflictSeverity::Warning);
        assert!(c[0].description.contains("prerequisite opens after"));
    }

    #[test]
    fn anchors_are_unioned() {
        let a = eval("EU", ComplianceStatus::Blocked).with_anchors([NodeId::from("eu-anc")]);
        let b = eval("SG", ComplianceStatus::Compliant).with_anchors([NodeId::from("sg-anc")]);
        let c = detect_conflicts(&[a, b]);
        let ids: Vec<&str> = c[0].anchor_node_ids.iter().map(NodeId::as_str).collect();
        assert_eq!(ids, vec!["eu-anc", "sg-anc"]);
    }

    #[test]
    fn merge_obligations_dedupes() {
        let merged = merge_obligations(&[
            eval("EU", ComplianceStatus::RequiresAction).with_obligations(["b", "a"]),
            eval("SG", ComplianceStatus::RequiresAction).with_obligations(["a", "c"]),
        ]);
        assert_eq!(merged.into_iter().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    }
}
