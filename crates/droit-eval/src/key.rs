//! # Evaluation Keys
//!
//! A content digest identifying one (tree, facts) pair. Two evaluations with
//! equal keys produce equal results, so external caches can memoize on it.
//! Key order in the facts does not affect the key. Number spelling does:
//! `1` and `1.0` can evaluate differently under `matches`.

use serde::Serialize;

use droit_core::{
    sha256_digest, CanonicalBytes, CanonicalizationError, ContentDigest, DecisionNode, Facts,
};

#[derive(Serialize)]
struct KeyInput<'a> {
    tree: &'a DecisionNode,
    facts: &'a Facts,
}

/// SHA-256 over the canonical JSON of `{tree, facts}`.
pub fn evaluation_key(
    root: &DecisionNode,
    facts: &Facts,
) -> Result<ContentDigest, CanonicalizationError> {
    let bytes = CanonicalBytes::new(&KeyInput { tree: root, facts })?;
    Ok(sha256_digest(&bytes))
}
