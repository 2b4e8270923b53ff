//! # Conflict Policy
//!
//! Which obligations cannot coexist, which classifications mean the same
//! thing, and which resolution each conflict type gets. Loaded from the
//! `conflicts` section of the configuration file; every field defaults to
//! empty, so the default policy only reports decision conflicts,
//! classification differences and timeline clashes.
//!
//! ```yaml
//! conflicts:
//!   exclusive:
//!     - [eu_white_paper, sg_prospectus]
//!   forbids:
//!     - [local_custody_only, foreign_custodian]
//!   equivalent:
//!     - [e_money_token, digital_payment_token]
//!   resolutions:
//!     obligation: satisfy_both
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::conflict::{ConflictType, ResolutionStrategy};

/// Rules for judging whether two decisions conflict.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConflictPolicy {
    /// Obligation pairs that cannot both be satisfied. Order is irrelevant.
    pub exclusive: Vec<[String; 2]>,
    /// `[a, b]`: obligation `a` prohibits doing `b`.
    pub forbids: Vec<[String; 2]>,
    /// Groups of classifications regarded as the same category.
    pub equivalent: Vec<Vec<String>>,
    /// Per-type overrides of the default resolution.
    pub resolutions: BTreeMap<ConflictType, ResolutionStrategy>,
}

impl ConflictPolicy {
    /// Whether two obligations are declared mutually exclusive.
    pub fn are_exclusive(&self, a: &str, b: &str) -> bool {
        self.exclusive
            .iter()
            .any(|[x, y]| (x == a && y == b) || (x == b && y == a))
    }

    /// Whether obligation `a` prohibits obligation `b`.
    pub fn forbids(&self, a: &str, b: &str) -> bool {
        self.forbids.iter().any(|[x, y]| x == a && y == b)
    }

    /// Whether two classifications name the same category.
    pub fn equivalent(&self, a: &str, b: &str) -> bool {
        a == b
            || self
                .equivalent
                .iter()
                .any(|group| group.iter().any(|c| c == a) && group.iter().any(|c| c == b))
    }

    /// The resolution for a conflict type.
    pub fn resolution_for(&self, conflict_type: ConflictType) -> ResolutionStrategy {
        self.resolutions
            .get(&conflict_type)
            .copied()
            .unwrap_or_else(|| conflict_type.default_resolution())
    }
}
