//! # Validate Subcommand
//!
//! Checks rule documents against the rule schema, then decodes them and
//! runs the structural checks. Reports one line per document and lists
//! every schema violation under a failing one.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;

use droit_core::RuleDefinition;
use droit_schema::{load_rule, RuleLoadError, SchemaValidationError, SchemaValidator};

use crate::CliContext;

/// Arguments for `droit validate`.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Rule documents to validate (YAML or JSON).
    #[arg(value_name = "RULE", required = true)]
    pub rules: Vec<PathBuf>,
}

/// Execute the validate subcommand.
///
/// Returns exit code: 0 when every document is valid, 1 otherwise.
pub fn run_validate(args: &ValidateArgs, ctx: &CliContext) -> Result<u8> {
    let validator = ctx.validator()?;
    tracing::info!(schema_count = validator.schema_count(), "loaded schema registry");

    let mut failed = 0usize;
    for path in &args.rules {
        if !validate_one(&validator, path) {
            failed += 1;
        }
    }

    if failed > 0 {
        println!("\n{failed} of {} rule(s) failed validation.", args.rules.len());
        Ok(1)
    } else {
        Ok(0)
    }
}

fn validate_one(validator: &SchemaValidator, path: &Path) -> bool {
    match load_rule(validator, path) {
        Ok(rule) => {
            println!("OK: {} ({})", path.display(), describe(&rule));
            true
        }
        Err(RuleLoadError::Schema(SchemaValidationError::ValidationFailed { details, .. })) => {
            println!("FAIL: {}", path.display());
            for detail in details {
                println!("  {detail}");
            }
            false
        }
        Err(e) => {
            println!("FAIL: {}: {e}", path.display());
            false
        }
    }
}

fn describe(rule: &RuleDefinition) -> String {
    let nodes = droit_eval::count_nodes(&rule.tree);
    match rule.tree_digest() {
        Ok(digest) => format!("{}@{}, {nodes} nodes, {digest}", rule.id, rule.version),
        Err(_) => format!("{}@{}, {nodes} nodes", rule.id, rule.version),
    }
}
