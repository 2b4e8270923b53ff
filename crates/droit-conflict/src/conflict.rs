//! # Conflict Types
//!
//! A [`CrossBorderConflict`] describes one way two jurisdictions' decisions
//! fail to compose. Conflicts are keyed by `(type, sorted jurisdiction
//! pair)`, so a pair has at most one conflict of each type.

use std::fmt;

use serde::{Deserialize, Serialize};

use droit_core::{JurisdictionCode, NodeId};

/// How serious a conflict is. Ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictSeverity {
    /// Worth knowing; no action needed.
    Info,
    /// Needs a resolution but does not stop the activity.
    Warning,
    /// Stops the activity until resolved.
    Blocking,
}

impl ConflictSeverity {
    /// Returns the snake_case identifier, matching the serde format.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Blocking => "blocking",
        }
    }
}

impl fmt::Display for ConflictSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What kind of disagreement a conflict is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictType {
    /// One jurisdiction blocks what another permits.
    Decision,
    /// Obligations that cannot be satisfied together.
    Obligation,
    /// Different regulatory categories for the same thing.
    Classification,
    /// Deadlines that cannot be met together.
    Timeline,
}

impl ConflictType {
    /// Returns the snake_case identifier, matching the serde format.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Decision => "decision",
            Self::Obligation => "obligation",
            Self::Classification => "classification",
            Self::Timeline => "timeline",
        }
    }

    /// The resolution applied when the policy does not override it.
    pub fn default_resolution(&self) -> ResolutionStrategy {
        match self {
            Self::Decision => ResolutionStrategy::Stricter,
            Self::Obligation => ResolutionStrategy::Cumulative,
            Self::Classification => ResolutionStrategy::HomeJurisdiction,
            Self::Timeline => ResolutionStrategy::Earliest,
        }
    }
}

impl fmt::Display for ConflictType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a conflict is meant to be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionStrategy {
    /// Apply every obligation from both sides.
    Cumulative,
    /// Apply the stricter decision.
    Stricter,
    /// Defer to the issuer's home jurisdiction.
    HomeJurisdiction,
    /// Find a course of action that satisfies both sides.
    SatisfyBoth,
    /// Meet the earliest deadline.
    Earliest,
}

impl ResolutionStrategy {
    /// Returns the snake_case identifier, matching the serde format.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cumulative => "cumulative",
            Self::Stricter => "stricter",
            Self::HomeJurisdiction => "home_jurisdiction",
            Self::SatisfyBoth => "satisfy_both",
            Self::Earliest => "earliest",
        }
    }
}

impl fmt::Display for ResolutionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A conflict between two jurisdictions' decisions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossBorderConflict {
    /// `"{type}:{a}:{b}"` with `a < b`.
    pub id: String,
    /// How serious the conflict is.
    pub severity: ConflictSeverity,
    /// What kind of conflict it is.
    #[serde(rename = "type")]
    pub conflict_type: ConflictType,
    /// The two jurisdictions, sorted.
    pub jurisdictions: Vec<JurisdictionCode>,
    /// Conflict anchors either side passed through, sorted.
    pub anchor_node_ids: Vec<NodeId>,
    /// What disagrees, one clause per finding.
    pub description: String,
    /// How to resolve it.
    pub resolution_strategy: ResolutionStrategy,
    /// False only for blocking conflicts.
    pub resolvable: bool,
}

impl CrossBorderConflict {
    /// The conflict id for a type and an already sorted pair.
    pub fn make_id(
        conflict_type: ConflictType,
        a: &JurisdictionCode,
        b: &JurisdictionCode,
    ) -> String {
        format!("{conflict_type}:{a}:{b}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_orders_by_seriousness() {
        assert!(ConflictSeverity::Blocking > ConflictSeverity::Warning);
        assert!(ConflictSeverity::Warning > ConflictSeverity::Info);
        assert_eq!(
            ConflictSeverity::Info.max(ConflictSeverity::Blocking),
            ConflictSeverity::Blocking
        );
    }

    #[test]
    fn default_resolutions_by_type() {
        assert_eq!(ConflictType::Decision.default_resolution(), ResolutionStrategy::Stricter);
        assert_eq!(ConflictType::Obligation.default_resolution(), ResolutionStrategy::Cumulative);
        assert_eq!(
            ConflictType::Classification.default_resolution(),
            ResolutionStrategy::HomeJurisdiction
        );
        assert_eq!(ConflictType::Timeline.default_resolution(), ResolutionStrategy::Earliest);
    }

    #[test]
    fn wire_names_match_as_str() {
        for s in [
            ResolutionStrategy::Cumulative,
            ResolutionStrategy::Stricter,
            ResolutionStrategy::HomeJurisdiction,
            ResolutionStrategy::SatisfyBoth,
            ResolutionStrategy::Earliest,
        ] {
            assert_eq!(serde_json::to_string(&s).unwrap(), format!("\"{s}\""));
        }
        assert_eq!(serde_json::to_string(&ConflictType::Timeline).unwrap(), "\"timeline\"");
    }

    #[test]
    fn conflict_serializes_type_field() {
        let de = JurisdictionCode::new("DE").unwrap();
        let sg = JurisdictionCode::new("SG").unwrap();
        let conflict = CrossBorderConflict {
            id: CrossBorderConflict::make_id(ConflictType::Decision, &de, &sg),
            severity: ConflictSeverity::Blocking,
            conflict_type: ConflictType::Decision,
            jurisdictions: vec![de, sg],
            anchor_node_ids: Vec::new(),
            description: "x".into(),
            resolution_strategy: ResolutionStrategy::Stricter,
            resolvable: false,
        };
        let json = serde_json::to_value(&conflict).unwrap();
        assert_eq!(json["id"], "decision:DE:SG");
        assert_eq!(json["type"], "decision");
        assert_eq!(json["resolutionStrategy"], "stricter");
        assert_eq!(json["anchorNodeIds"], serde_json::json!([]));
    }
}
