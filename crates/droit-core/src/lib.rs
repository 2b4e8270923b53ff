//! # droit-core — Foundational Types for the Droit Rules Engine
//!
//! This crate is the bedrock of the workspace. It defines the rule-tree data
//! model and the primitives every other crate builds on. Every other crate in
//! the workspace depends on `droit-core`; it depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Tagged node variants.** [`DecisionNode`] is a closed enum over the five
//!    node kinds. Every traversal matches exhaustively, so adding a kind is a
//!    compile error until each walker handles it.
//!
//! 2. **Index once, reuse everywhere.** [`TreeIndex`] maps node ids to nodes
//!    and validates the tree (unique ids, no dangling references, no cycles)
//!    in a single pass. Evaluators and layout code look nodes up through it
//!    instead of deep-searching the tree.
//!
//! 3. **Absence is data.** [`Facts::resolve`] returns `Option`, never an
//!    error. Missing facts drive partial evaluation downstream.
//!
//! 4. **`CanonicalBytes` newtype.** Digests of trees and fact bags are only
//!    computed from canonical bytes, so two callers hashing the same logical
//!    input always agree.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `droit-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod digest;
pub mod error;
pub mod facts;
pub mod identity;
pub mod index;
pub mod jurisdiction;
pub mod rule;
pub mod status;
pub mod temporal;
pub mod tree;

// Re-export primary types for ergonomic imports.
pub use canonical::CanonicalBytes;
pub use digest::{sha256_digest, sha256_hex, ContentDigest, DigestAlgorithm};
pub use error::{CanonicalizationError, DroitError, TreeError};
pub use facts::Facts;
pub use identity::{JurisdictionCode, NodeId};
pub use index::TreeIndex;
pub use jurisdiction::{JurisdictionContext, JurisdictionRole};
pub use rule::{RuleDefinition, RuleMetadata, SourceReference};
pub use status::ComplianceStatus;
pub use temporal::Timestamp;
pub use tree::{
    ActionDeadline, Condition, ConditionNode, ConditionOp, ConflictAnchorNode, DecisionNode,
    GroupNode, LeafNode, NodeKind, RouterBranch, RouterNode,
};
