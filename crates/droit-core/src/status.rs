//! # Compliance Status Lattice
//!
//! Defines [`ComplianceStatus`], the outcome a leaf assigns, with lattice
//! operations for combining outcomes across jurisdictions.
//!
//! ```text
//! Ordering (strictest → most permissive):
//!   Blocked < RequiresAction < Compliant < NoApplicableRules
//!
//! meet(a, b) = min(a, b)   pessimistic: apply the stricter status
//! join(a, b) = max(a, b)   optimistic
//! ```
//!
//! `Blocked` is absorbing under `meet`: one blocking jurisdiction blocks the
//! aggregate.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DroitError;

/// The compliance status a decision leaf assigns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceStatus {
    /// The activity may proceed as is.
    Compliant,
    /// The activity may proceed once the leaf's obligations are met.
    RequiresAction,
    /// The activity is not permitted.
    Blocked,
    /// No rule in the regime governs the activity.
    NoApplicableRules,
}

impl ComplianceStatus {
    /// All statuses, strictest first.
    pub fn all() -> &'static [ComplianceStatus] {
        &[
            Self::Blocked,
            Self::RequiresAction,
            Self::Compliant,
            Self::NoApplicableRules,
        ]
    }

    /// Lattice ordering value. Lower is stricter.
    fn ordering(self) -> u8 {
        match self {
            Self::Blocked => 0,
            Self::RequiresAction => 1,
            Self::Compliant => 2,
            Self::NoApplicableRules => 3,
        }
    }

    /// Lattice meet: the stricter of the two statuses.
    pub fn meet(self, other: Self) -> Self {
        if self.ordering() <= other.ordering() {
            self
        } else {
            other
        }
    }

    /// Lattice join: the more permissive of the two statuses.
    pub fn join(self, other: Self) -> Self {
        if self.ordering() >= other.ordering() {
            self
        } else {
            other
        }
    }

    /// Whether this status forbids the activity outright.
    pub fn is_blocking(self) -> bool {
        matches!(self, Self::Blocked)
    }

    /// Returns the snake_case identifier, matching the serde format.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Compliant => "compliant",
            Self::RequiresAction => "requires_action",
            Self::Blocked => "blocked",
            Self::NoApplicableRules => "no_applicable_rules",
        }
    }
}

impl PartialOrd for ComplianceStatus {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ComplianceStatus {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.ordering().cmp(&other.ordering())
    }
}

impl fmt::Display for ComplianceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComplianceStatus {
    type Err = DroitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "compliant" => Ok(Self::Compliant),
            "requires_action" => Ok(Self::RequiresAction),
            "blocked" => Ok(Self::Blocked),
            "no_applicable_rules" => Ok(Self::NoApplicableRules),
            other => Err(DroitError::Validation(format!(
                "unknown compliance status: {other:?}"
            ))),
        }
    }
}
