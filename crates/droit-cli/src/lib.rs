//! # droit-cli — The `droit` Command-Line Tool
//!
//! Thin shell over the engine crates. Every subcommand reads rule documents
//! and fact files from disk, calls one engine entry point, and writes JSON
//! to stdout or `--output`.
//!
//! ## Subcommands
//!
//! - `droit validate` — schema and structural validation of rule documents.
//! - `droit inspect` — node counts, fact paths and the tree digest.
//! - `droit evaluate` — full evaluation, optionally wrapped in an audit record.
//! - `droit partial` — partial evaluation over incomplete facts.
//! - `droit cross-border` — multi-jurisdiction evaluation with conflicts.
//! - `droit layout` — node and edge positions for renderers.
//!
//! ## Exit Codes
//!
//! `0` success, `1` a rule failed validation or an evaluation was
//! undetermined, `2` an operational error (unreadable file, malformed tree).

pub mod config;
pub mod cross_border;
pub mod evaluate;
pub mod inspect;
pub mod layout;
pub mod validate;

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use serde::Serialize;

use droit_core::{Facts, JurisdictionCode, JurisdictionContext, JurisdictionRole, RuleDefinition};
use droit_schema::{load_document, load_rule, SchemaValidator};

pub use config::DroitConfig;

/// State shared by every subcommand.
#[derive(Debug, Clone, Default)]
pub struct CliContext {
    /// Loaded configuration.
    pub config: DroitConfig,
    /// Where JSON output goes. `None` means stdout.
    pub output: Option<PathBuf>,
}

impl CliContext {
    /// The schema registry rule documents are checked against.
    pub fn validator(&self) -> Result<SchemaValidator> {
        match &self.config.schema_dir {
            Some(dir) => SchemaValidator::new(dir)
                .with_context(|| format!("failed to load schemas from {}", dir.display())),
            None => SchemaValidator::bundled().context("failed to load bundled rule schema"),
        }
    }

    /// Load and fully validate one rule document.
    pub fn load_rule(&self, path: &Path) -> Result<RuleDefinition> {
        let validator = self.validator()?;
        Ok(load_rule(&validator, path)?)
    }

    /// Write `value` as pretty JSON to the configured destination.
    pub fn emit<T: Serialize>(&self, value: &T) -> Result<()> {
        let mut text =
            serde_json::to_string_pretty(value).context("failed to serialize output")?;
        text.push('\n');
        match &self.output {
            Some(path) => std::fs::write(path, text)
                .with_context(|| format!("failed to write {}", path.display())),
            None => {
                let mut stdout = std::io::stdout().lock();
                stdout
                    .write_all(text.as_bytes())
                    .context("failed to write to stdout")
            }
        }
    }
}

/// Read a YAML or JSON fact file. The document must be a mapping.
pub fn load_facts(path: &Path) -> Result<Facts> {
    let value = load_document(path)?;
    match Facts::from_value(value) {
        Some(facts) => Ok(facts),
        None => bail!("facts file {} must contain a mapping", path.display()),
    }
}

/// Resolve `path` against `base` unless it is already absolute.
pub fn resolve_relative(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// Parse a jurisdiction role in its serialized spelling (`home`,
/// `third_country`, ...).
pub fn parse_role(s: &str) -> std::result::Result<JurisdictionRole, String> {
    serde_json::from_value(serde_json::Value::String(s.to_string())).map_err(|_| {
        format!("unknown role {s:?} (expected home, target, passport or third_country)")
    })
}

/// `--jurisdiction` / `--role` pair accepted by the single-rule subcommands.
#[derive(Args, Debug, Clone)]
pub struct JurisdictionArgs {
    /// Evaluate on behalf of this jurisdiction. Required when the tree
    /// contains router nodes.
    #[arg(long, value_name = "CODE")]
    pub jurisdiction: Option<String>,

    /// Role of that jurisdiction in the scenario.
    #[arg(long, value_parser = parse_role, default_value = "home", requires = "jurisdiction")]
    pub role: JurisdictionRole,
}

impl JurisdictionArgs {
    /// The evaluation context, if a jurisdiction was given.
    pub fn context(&self) -> Result<Option<JurisdictionContext>> {
        let Some(code) = self.jurisdiction.as_deref() else {
            return Ok(None);
        };
        let code = JurisdictionCode::new(code)?;
        Ok(Some(JurisdictionContext::new(code, self.role)))
    }
}

impl Default for JurisdictionArgs {
    fn default() -> Self {
        Self {
            jurisdiction: None,
            role: JurisdictionRole::Home,
        }
    }
}
