//! Shared fixtures for the cross-crate integration tests.

use std::path::PathBuf;

use droit_core::{ComplianceStatus, Condition, ConditionOp, DecisionNode, LeafNode};
use serde_json::json;

/// Workspace root, where `rules/`, `scenarios/` and `schemas/` live.
pub fn repo_root() -> PathBuf {
    // crates/droit-integration-tests -> crates -> workspace root
    let mut dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    dir.pop();
    dir.pop();
    dir
}

/// Path of a sample rule under `rules/`.
pub fn sample_rule(name: &str) -> PathBuf {
    repo_root().join("rules").join(name)
}

/// One condition on `instrument.type == "security_token"`: registration
/// required when true, compliant otherwise.
pub fn security_token_tree() -> DecisionNode {
    droit_core::tree::condition_node(
        "is-security-token",
        Condition::new("instrument.type", ConditionOp::Eq, json!("security_token")),
        LeafNode::new("register", "Registration required", ComplianceStatus::RequiresAction)
            .with_obligations(["register"]),
        LeafNode::new("exempt", "No registration needed", ComplianceStatus::Compliant),
    )
}
