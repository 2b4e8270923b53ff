//! # droit-eval — Decision-Tree Evaluation
//!
//! Evaluates rule trees from [`droit_core`] against a fact bag.
//!
//! - [`evaluate_condition`] applies one operator and reports a missing fact
//!   as `None`.
//! - [`evaluate_tree`] / [`evaluate_for_jurisdiction`] walk a single path to
//!   a leaf, producing an [`Evaluation`]: decided with a trace, or
//!   undetermined with the leaves still reachable and the facts that block.
//! - [`evaluate_partial`] always returns the partial view, which is what an
//!   interactive fact-collection UI needs.
//! - [`count_nodes`], [`collect_fact_paths`] and [`evaluation_key`] answer
//!   structural questions without evaluating.
//!
//! Every entry point builds (or is given) a [`TreeIndex`](droit_core::TreeIndex)
//! first; a malformed tree is rejected before any condition runs. Evaluation
//! is a pure function of tree, facts and jurisdiction: no clock, no I/O, no
//! shared state.

pub mod condition;
pub mod error;
pub mod evaluator;
pub mod introspect;
pub mod key;
pub mod trace;

pub use condition::{evaluate_condition, values_equal};
pub use error::EvalError;
pub use evaluator::{
    evaluate_for_jurisdiction, evaluate_indexed, evaluate_partial,
    evaluate_partial_for_jurisdiction, evaluate_partial_indexed, evaluate_tree,
};
pub use introspect::{collect_fact_paths, count_nodes};
pub use key::evaluation_key;
pub use trace::{
    Evaluation, EvaluationResult, EvaluationTrace, PartialEvaluationResult, TraceNode,
};
