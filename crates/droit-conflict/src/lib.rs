//! # droit-conflict — Cross-Jurisdiction Conflict Detection
//!
//! Composes per-jurisdiction decisions into a cross-border view.
//!
//! - [`detect_conflicts`] / [`detect_conflicts_with`] compare every pair of
//!   distinct jurisdictions for decision, obligation, classification and
//!   timeline conflicts, deduplicated per `(type, pair)` and sorted.
//! - [`merge_obligations`] unions the obligation sets.
//! - [`evaluate_cross_border`] runs a whole [`CrossBorderScenario`]: each
//!   jurisdiction's tree against the shared facts, then conflicts, merged
//!   obligations and the pessimistic overall status.
//!
//! What counts as an obligation or classification conflict is data, not
//! code: see [`ConflictPolicy`].

pub mod conflict;
pub mod cross_border;
pub mod detect;
pub mod evaluation;
pub mod policy;

pub use conflict::{ConflictSeverity, ConflictType, CrossBorderConflict, ResolutionStrategy};
pub use cross_border::{
    evaluate_cross_border, evaluate_cross_border_with, CrossBorderEvaluation,
    CrossBorderScenario, JurisdictionRule, UndeterminedJurisdiction,
};
pub use detect::{detect_conflicts, detect_conflicts_with, merge_obligations};
pub use evaluation::JurisdictionEvaluation;
pub use policy::ConflictPolicy;
