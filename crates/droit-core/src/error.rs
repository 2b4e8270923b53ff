//! # Error Hierarchy
//!
//! Structured error types for the rules engine, built with `thiserror`.
//! No `Box<dyn Error>`, no `.unwrap()` outside tests.
//!
//! Only two classes of failure are ever surfaced as errors: a structurally
//! invalid rule tree, and a caller misusing an API contract. Missing facts
//! and type-mismatched comparisons are absorbed into evaluation results.

use thiserror::Error;

/// Top-level error type for the rules engine.
#[derive(Error, Debug)]
pub enum DroitError {
    /// The rule tree failed structural validation.
    #[error("malformed rule tree: {0}")]
    Tree(#[from] TreeError),

    /// Canonicalization failure during digest computation.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// Domain primitive validation failure.
    #[error("validation error: {0}")]
    Validation(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Structural defects that make a rule tree unsafe to walk.
///
/// Raised at index-build time, before any evaluation begins.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// Two nodes share the same id.
    #[error("duplicate node id '{node_id}'")]
    DuplicateNodeId {
        /// The repeated id.
        node_id: String,
    },

    /// A node references an id that does not exist in the tree.
    #[error("node '{from}' references unknown node '{target}' via {field}")]
    DanglingReference {
        /// Id of the referencing node.
        from: String,
        /// The unresolved id.
        target: String,
        /// Which field carried the reference (`entryNodeId`, `targetNodeId`, ...).
        field: &'static str,
    },

    /// Following references from a node leads back to it.
    #[error("cycle detected through node '{node_id}'")]
    Cycle {
        /// A node on the cycle.
        node_id: String,
    },

    /// A node id is empty.
    #[error("empty node id under parent '{parent}'")]
    EmptyNodeId {
        /// Id of the enclosing node, or `<root>`.
        parent: String,
    },
}

/// Errors during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// JSON serialization failed during canonicalization.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}
