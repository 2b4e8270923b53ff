//! # Rule Definitions
//!
//! A [`RuleDefinition`] wraps a rule tree with its identity, version and
//! regulatory metadata. It is the unit rule authors write (YAML or JSON) and
//! the unit audit records point back to.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::canonical::CanonicalBytes;
use crate::digest::{sha256_digest, ContentDigest};
use crate::error::{CanonicalizationError, DroitError};
use crate::identity::JurisdictionCode;
use crate::index::TreeIndex;
use crate::tree::DecisionNode;

/// A citation into a regulatory document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceReference {
    /// Document identifier, e.g. `"MiCA"` or `"32023R1114"`.
    pub document_id: String,
    /// Article number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub article: Option<String>,
    /// Paragraph within the article.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paragraph: Option<String>,
    /// Link to the published text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl std::fmt::Display for SourceReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.document_id)?;
        if let Some(article) = &self.article {
            write!(f, " Art. {article}")?;
        }
        if let Some(paragraph) = &self.paragraph {
            write!(f, "({paragraph})")?;
        }
        Ok(())
    }
}

/// Regulatory context of a rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleMetadata {
    /// Jurisdiction whose law the rule encodes.
    pub jurisdiction: JurisdictionCode,
    /// Regulatory framework, e.g. `"MiCA"`.
    pub framework: String,
    /// Date the rule takes effect.
    pub effective_date: NaiveDate,
    /// Date the rule stops applying.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_date: Option<NaiveDate>,
    /// Free-form tags.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// A versioned rule: metadata plus its decision tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleDefinition {
    /// Rule identifier.
    pub id: String,
    /// Rule version.
    pub version: String,
    /// Display name.
    pub name: String,
    /// Longer description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Regulatory metadata.
    pub metadata: RuleMetadata,
    /// The decision tree.
    pub tree: DecisionNode,
}

impl RuleDefinition {
    /// Whether the rule is in force on `date`. The expiry date is exclusive.
    pub fn is_effective_on(&self, date: NaiveDate) -> bool {
        date >= self.metadata.effective_date
            && self.metadata.expires_date.map_or(true, |end| date < end)
    }

    /// Validate the rule's metadata and tree structure.
    ///
    /// # Errors
    ///
    /// Returns [`DroitError::Validation`] for empty identifiers or an expiry
    /// that does not follow the effective date, and [`DroitError::Tree`] for
    /// structural tree defects.
    pub fn validate(&self) -> Result<(), DroitError> {
        if self.id.trim().is_empty() {
            return Err(DroitError::Validation("rule id must not be empty".into()));
        }
        if self.version.trim().is_empty() {
            return Err(DroitError::Validation(format!(
                "rule '{}' has an empty version",
                self.id
            )));
        }
        if let Some(end) = self.metadata.expires_date {
            if end <= self.metadata.effective_date {
                return Err(DroitError::Validation(format!(
                    "rule '{}' expires ({end}) on or before it takes effect ({})",
                    self.id, self.metadata.effective_date
                )));
            }
        }
        TreeIndex::build(&self.tree)?;
        Ok(())
    }

    /// Content digest of the tree alone, independent of metadata edits.
    pub fn tree_digest(&self) -> Result<ContentDigest, CanonicalizationError> {
        Ok(sha256_digest(&CanonicalBytes::new(&self.tree)?))
    }
}
