//! # Inspect Subcommand
//!
//! Summarizes a rule: metadata, node counts by kind, the fact paths a
//! front end should prompt for, and the tree digest.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Args;
use serde::Serialize;

use droit_core::{ComplianceStatus, NodeKind, RuleDefinition};
use droit_eval::{collect_fact_paths, count_nodes};

use crate::CliContext;

/// Arguments for `droit inspect`.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Rule document to inspect.
    #[arg(value_name = "RULE")]
    pub rule: PathBuf,

    /// Report whether the rule is in force on this date (YYYY-MM-DD).
    /// Defaults to today in UTC.
    #[arg(long, value_name = "DATE")]
    pub on: Option<NaiveDate>,
}

/// What `droit inspect` prints.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleSummary {
    pub id: String,
    pub version: String,
    pub name: String,
    pub jurisdiction: String,
    pub framework: String,
    pub effective_on: NaiveDate,
    pub in_force: bool,
    pub node_count: usize,
    pub nodes_by_kind: BTreeMap<NodeKind, usize>,
    pub outcomes: BTreeSet<ComplianceStatus>,
    pub fact_paths: BTreeSet<String>,
    pub tree_digest: String,
}

impl RuleSummary {
    /// Summarize `rule` as of `date`.
    pub fn new(rule: &RuleDefinition, date: NaiveDate) -> Result<Self> {
        let mut nodes_by_kind = BTreeMap::new();
        let mut outcomes = BTreeSet::new();
        for node in rule.tree.descendants() {
            *nodes_by_kind.entry(node.kind()).or_insert(0) += 1;
            if let Some(leaf) = node.as_leaf() {
                outcomes.insert(leaf.status);
            }
        }
        let digest = rule
            .tree_digest()
            .with_context(|| format!("failed to digest rule {}", rule.id))?;
        Ok(Self {
            id: rule.id.clone(),
            version: rule.version.clone(),
            name: rule.name.clone(),
            jurisdiction: rule.metadata.jurisdiction.to_string(),
            framework: rule.metadata.framework.clone(),
            effective_on: date,
            in_force: rule.is_effective_on(date),
            node_count: count_nodes(&rule.tree),
            nodes_by_kind,
            outcomes,
            fact_paths: collect_fact_paths(&rule.tree),
            tree_digest: digest.to_string(),
        })
    }
}

/// Execute the inspect subcommand.
pub fn run_inspect(args: &InspectArgs, ctx: &CliContext) -> Result<u8> {
    let rule = ctx.load_rule(&args.rule)?;
    let date = args.on.unwrap_or_else(|| chrono::Utc::now().date_naive());
    ctx.emit(&RuleSummary::new(&rule, date)?)?;
    Ok(0)
}
