//! # Layout Subcommand
//!
//! Prints node and edge positions for a rule tree, with SVG path data for
//! every edge. With `--facts`, a decided evaluation's path is highlighted.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use droit_core::NodeId;
use droit_eval::{evaluate_indexed, Evaluation};
use droit_layout::{calculate_layout, generate_edge_path, TreeLayout};

use crate::{load_facts, CliContext, JurisdictionArgs};

/// Arguments for `droit layout`.
#[derive(Args, Debug)]
pub struct LayoutArgs {
    /// Rule document to lay out.
    #[arg(value_name = "RULE")]
    pub rule: PathBuf,

    /// Evaluate against these facts and highlight the path taken.
    #[arg(long, value_name = "FILE")]
    pub facts: Option<PathBuf>,

    #[command(flatten)]
    pub scope: JurisdictionArgs,
}

/// What `droit layout` prints.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutOutput {
    #[serde(flatten)]
    pub layout: TreeLayout,
    /// SVG `d` attribute per edge id.
    pub edge_paths: BTreeMap<String, String>,
}

impl LayoutOutput {
    fn new(layout: TreeLayout) -> Self {
        let edge_paths = layout
            .edges
            .iter()
            .map(|e| (e.id.clone(), generate_edge_path(e)))
            .collect();
        Self { layout, edge_paths }
    }
}

/// Execute the layout subcommand.
pub fn run_layout(args: &LayoutArgs, ctx: &CliContext) -> Result<u8> {
    let rule = ctx.load_rule(&args.rule)?;
    let config = &ctx.config.layout;
    config.validate().context("invalid layout configuration")?;

    let path = match &args.facts {
        Some(facts_path) => {
            let facts = load_facts(facts_path)?;
            let index = droit_core::TreeIndex::build(&rule.tree)
                .with_context(|| format!("rule {} is malformed", rule.id))?;
            match evaluate_indexed(&index, &facts, args.scope.context()?.as_ref())? {
                Evaluation::Decided(result) => result.path_node_ids(),
                Evaluation::Undetermined(partial) => {
                    tracing::warn!(
                        missing = ?partial.missing_facts,
                        "evaluation undetermined; no path highlighted"
                    );
                    BTreeSet::<NodeId>::new()
                }
            }
        }
        None => BTreeSet::new(),
    };

    let layout = calculate_layout(&rule.tree, config, &path);
    tracing::info!(
        nodes = layout.nodes.len(),
        width = layout.width,
        height = layout.height,
        "layout computed"
    );
    ctx.emit(&LayoutOutput::new(layout))?;
    Ok(0)
}
