//! # Evaluate and Partial Subcommands
//!
//! `droit evaluate` runs a full evaluation and prints the decided result or,
//! when facts are missing, the partial result with the facts still needed.
//! `droit partial` always prints the partial view.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use droit_core::{Facts, RuleDefinition, Timestamp, TreeIndex};
use droit_eval::{evaluate_indexed, evaluate_partial_indexed, Evaluation, EvaluationTrace};

use crate::{load_facts, CliContext, JurisdictionArgs};

/// Arguments for `droit evaluate`.
#[derive(Args, Debug)]
pub struct EvaluateArgs {
    /// Rule document to evaluate.
    #[arg(value_name = "RULE")]
    pub rule: PathBuf,

    /// Fact file (YAML or JSON mapping).
    #[arg(long, value_name = "FILE")]
    pub facts: PathBuf,

    /// Wrap a decided result in an audit record with rule id, version and
    /// timestamp.
    #[arg(long)]
    pub audit: bool,

    #[command(flatten)]
    pub scope: JurisdictionArgs,
}

/// Arguments for `droit partial`.
#[derive(Args, Debug)]
pub struct PartialArgs {
    /// Rule document to evaluate.
    #[arg(value_name = "RULE")]
    pub rule: PathBuf,

    /// Fact file (YAML or JSON mapping). Omit to evaluate with no facts.
    #[arg(long, value_name = "FILE")]
    pub facts: Option<PathBuf>,

    #[command(flatten)]
    pub scope: JurisdictionArgs,
}

/// Execute the evaluate subcommand.
///
/// Returns exit code: 0 when decided, 1 when undetermined.
pub fn run_evaluate(args: &EvaluateArgs, ctx: &CliContext) -> Result<u8> {
    let rule = ctx.load_rule(&args.rule)?;
    warn_if_not_in_force(&rule);
    let facts = load_facts(&args.facts)?;
    let context = args.scope.context()?;

    let index = TreeIndex::build(&rule.tree)
        .with_context(|| format!("rule {} is malformed", rule.id))?;
    let outcome = evaluate_indexed(&index, &facts, context.as_ref())
        .with_context(|| format!("failed to evaluate {}", rule.id))?;

    match outcome {
        Evaluation::Decided(result) if args.audit => {
            tracing::info!(rule = %rule.id, leaf = %result.leaf.node_id, "decided");
            ctx.emit(&EvaluationTrace::new(&rule, result, Timestamp::now()))?;
            Ok(0)
        }
        Evaluation::Decided(result) => {
            tracing::info!(rule = %rule.id, leaf = %result.leaf.node_id, "decided");
            ctx.emit(&Evaluation::Decided(result))?;
            Ok(0)
        }
        undetermined @ Evaluation::Undetermined(_) => {
            tracing::info!(
                rule = %rule.id,
                missing = ?undetermined.missing_facts(),
                "undetermined"
            );
            ctx.emit(&undetermined)?;
            Ok(1)
        }
    }
}

/// Execute the partial subcommand.
pub fn run_partial(args: &PartialArgs, ctx: &CliContext) -> Result<u8> {
    let rule = ctx.load_rule(&args.rule)?;
    warn_if_not_in_force(&rule);
    let facts = match &args.facts {
        Some(path) => load_facts(path)?,
        None => Facts::new(),
    };
    let context = args.scope.context()?;

    let index = TreeIndex::build(&rule.tree)
        .with_context(|| format!("rule {} is malformed", rule.id))?;
    let partial = evaluate_partial_indexed(&index, &facts, context.as_ref())
        .with_context(|| format!("failed to evaluate {}", rule.id))?;
    ctx.emit(&partial)?;
    Ok(0)
}

fn warn_if_not_in_force(rule: &RuleDefinition) {
    let today = chrono::Utc::now().date_naive();
    if !rule.is_effective_on(today) {
        tracing::warn!(
            rule = %rule.id,
            effective = %rule.metadata.effective_date,
            "rule is not in force today"
        );
    }
}
