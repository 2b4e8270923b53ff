//! # Cross-Border Subcommand
//!
//! Reads a scenario file naming the participating jurisdictions, their
//! roles and rule documents, plus the shared facts, and prints the composed
//! evaluation with conflicts.
//!
//! ```yaml
//! facts:
//!   token: { referencesFiat: true }
//! jurisdictions:
//!   - { jurisdiction: EU, role: home, rule: rules/eu-mica.yaml }
//!   - { jurisdiction: SG, role: target, rule: rules/sg-psa.yaml, regime: PSA }
//! ```
//!
//! Rule and fact paths are relative to the scenario file.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use serde::{Deserialize, Serialize};

use droit_conflict::{evaluate_cross_border_with, CrossBorderScenario, JurisdictionRule};
use droit_core::{Facts, JurisdictionCode, JurisdictionRole};
use droit_schema::load_document;

use crate::{load_facts, resolve_relative, CliContext};

/// Arguments for `droit cross-border`.
#[derive(Args, Debug)]
pub struct CrossBorderArgs {
    /// Scenario file (YAML or JSON).
    #[arg(value_name = "SCENARIO")]
    pub scenario: PathBuf,
}

/// On-disk scenario document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ScenarioFile {
    /// Inline facts.
    #[serde(default)]
    pub facts: Option<Facts>,
    /// Facts in a separate file. Mutually exclusive with `facts`.
    #[serde(default)]
    pub facts_file: Option<PathBuf>,
    /// Participating jurisdictions, in evaluation order.
    pub jurisdictions: Vec<ScenarioJurisdiction>,
}

/// One jurisdiction entry of a scenario file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ScenarioJurisdiction {
    pub jurisdiction: JurisdictionCode,
    pub role: JurisdictionRole,
    /// Rule document for this jurisdiction's regime.
    pub rule: PathBuf,
    /// Regime label in the output. Defaults to the rule's framework.
    #[serde(default)]
    pub regime: Option<String>,
}

impl ScenarioFile {
    /// Read a scenario document.
    pub fn load(path: &Path) -> Result<Self> {
        let value = load_document(path)?;
        serde_json::from_value(value)
            .with_context(|| format!("invalid scenario file {}", path.display()))
    }

    /// Load every referenced rule and the facts into an engine scenario.
    pub fn resolve(self, base: &Path, ctx: &CliContext) -> Result<CrossBorderScenario> {
        let facts = match (self.facts, self.facts_file) {
            (Some(_), Some(_)) => bail!("scenario sets both facts and factsFile"),
            (Some(facts), None) => facts,
            (None, Some(file)) => load_facts(&resolve_relative(&file, base))?,
            (None, None) => Facts::new(),
        };

        let validator = ctx.validator()?;
        let mut rules = Vec::with_capacity(self.jurisdictions.len());
        for entry in self.jurisdictions {
            let path = resolve_relative(&entry.rule, base);
            let rule = droit_schema::load_rule(&validator, &path)
                .with_context(|| format!("jurisdiction {}", entry.jurisdiction))?;
            if rule.metadata.jurisdiction != entry.jurisdiction {
                tracing::debug!(
                    jurisdiction = %entry.jurisdiction,
                    rule = %rule.id,
                    rule_jurisdiction = %rule.metadata.jurisdiction,
                    "rule authored for another jurisdiction"
                );
            }
            rules.push(JurisdictionRule {
                jurisdiction: entry.jurisdiction,
                role: entry.role,
                regime_id: entry.regime.unwrap_or(rule.metadata.framework),
                tree: rule.tree,
            });
        }
        Ok(CrossBorderScenario { facts, rules })
    }
}

/// Execute the cross-border subcommand.
///
/// Returns exit code: 0 when every jurisdiction decided, 1 when any is
/// undetermined.
pub fn run_cross_border(args: &CrossBorderArgs, ctx: &CliContext) -> Result<u8> {
    let base = args
        .scenario
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    let scenario = ScenarioFile::load(&args.scenario)?.resolve(&base, ctx)?;
    let evaluation = evaluate_cross_border_with(&scenario, &ctx.config.conflicts)
        .context("cross-border evaluation failed")?;

    tracing::info!(
        overall = %evaluation.overall_status,
        conflicts = evaluation.conflicts.len(),
        blocking = evaluation.blocking_count,
        "cross-border evaluation"
    );
    ctx.emit(&evaluation)?;
    Ok(if evaluation.undetermined.is_empty() { 0 } else { 1 })
}
