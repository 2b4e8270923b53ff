//! # Evaluation Errors
//!
//! Evaluation refuses to run on a malformed tree and on router nodes it
//! cannot resolve. Everything else (missing facts, type mismatches) is data
//! in the result, not an error.

use droit_core::{JurisdictionCode, JurisdictionRole, TreeError};
use thiserror::Error;

/// Errors raised while evaluating a rule tree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    /// The tree failed structural validation.
    #[error("malformed rule tree: {0}")]
    Malformed(#[from] TreeError),

    /// A router node was reached without a jurisdiction to route on.
    #[error("router '{node_id}' reached outside a jurisdiction context")]
    RouterOutsideJurisdiction {
        /// The router's id.
        node_id: String,
    },

    /// A router has no branch for the jurisdiction under evaluation.
    #[error("router '{node_id}' has no branch for {jurisdiction} ({role})")]
    NoRouterBranch {
        /// The router's id.
        node_id: String,
        /// The jurisdiction being evaluated.
        jurisdiction: JurisdictionCode,
        /// Its role.
        role: JurisdictionRole,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        let err = EvalError::RouterOutsideJurisdiction {
            node_id: "r".into(),
        };
        assert_eq!(
            err.to_string(),
            "router 'r' reached outside a jurisdiction context"
        );

        let err = EvalError::NoRouterBranch {
            node_id: "r".into(),
            jurisdiction: JurisdictionCode::new("SG").unwrap(),
            role: JurisdictionRole::Target,
        };
        assert_eq!(err.to_string(), "router 'r' has no branch for SG (target)");
    }

    #[test]
    fn tree_errors_convert() {
        let err: EvalError = TreeError::Cycle {
            node_id: "g".into(),
        }
        .into();
        assert!(matches!(err, EvalError::Malformed(_)));
    }
}
