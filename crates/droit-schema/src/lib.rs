//! # droit-schema — Rule Document Validation
//!
//! Rule definitions arrive as YAML or JSON files written by people. This
//! crate checks them against `schemas/rule-definition.schema.json` before
//! anything decodes them, so authors get a JSON Pointer to the offending
//! field instead of a serde error from deep inside a tagged enum.
//!
//! ## Responsibilities
//!
//! - **Schema validation:** [`SchemaValidator`] loads `*.schema.json` files
//!   (or the bundled rule schema) and validates values against them.
//! - **Rule loading:** [`load_rule`] reads a document, validates it, decodes
//!   it into a [`droit_core::RuleDefinition`] and runs the structural checks
//!   (unique ids, resolvable references, no cycles).

pub mod document;
pub mod validate;

// Re-export primary types.
pub use document::{load_document, load_rule, parse_document, RuleLoadError};
pub use validate::{
    SchemaValidationDetail, SchemaValidationError, SchemaValidator, RULE_SCHEMA_ID,
};
