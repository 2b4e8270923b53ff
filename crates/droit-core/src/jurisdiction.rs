//! # Jurisdiction Types
//!
//! Roles a jurisdiction plays in a cross-border scenario, and the context a
//! router node needs to pick its branch.
//!
//! The [`JurisdictionCode`] type itself lives in [`crate::identity`] alongside
//! the other identifier newtypes.

use std::fmt;

use serde::{Deserialize, Serialize};

pub use crate::identity::JurisdictionCode;

/// The role a jurisdiction plays relative to an issuance or activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JurisdictionRole {
    /// The issuer's home jurisdiction.
    Home,
    /// A jurisdiction where the instrument is offered or the activity occurs.
    Target,
    /// A jurisdiction reached through passporting from another authorization.
    Passport,
    /// A jurisdiction outside the passporting area whose third-country rules apply.
    ThirdCountry,
}

impl JurisdictionRole {
    /// Returns the snake_case identifier, matching the serde format.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Target => "target",
            Self::Passport => "passport",
            Self::ThirdCountry => "third_country",
        }
    }
}

impl fmt::Display for JurisdictionRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The jurisdiction an evaluation runs on behalf of.
///
/// Router nodes are only meaningful inside such a context: the evaluator
/// follows the branch tagged with this jurisdiction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JurisdictionContext {
    /// The jurisdiction under evaluation.
    pub jurisdiction: JurisdictionCode,
    /// The role it plays in the scenario.
    pub role: JurisdictionRole,
}

impl JurisdictionContext {
    /// Create a context.
    pub fn new(jurisdiction: JurisdictionCode, role: JurisdictionRole) -> Self {
        Self { jurisdiction, role }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_serde_matches_as_str() {
        for role in [
            JurisdictionRole::Home,
            JurisdictionRole::Target,
            JurisdictionRole::Passport,
            JurisdictionRole::ThirdCountry,
        ] {
            let json = serde_json::to_string(&role).unwrap();
            assert_eq!(json, format!("\"{}\"", role.as_str()));
        }
    }

    #[test]
    fn context_round_trips() {
        let ctx = JurisdictionContext::new(
            JurisdictionCode::new("DE").unwrap(),
            JurisdictionRole::Target,
        );
        let json = serde_json::to_value(&ctx).unwrap();
        assert_eq!(json, serde_json::json!({"jurisdiction": "DE", "role": "target"}));
        let back: JurisdictionContext = serde_json::from_value(json).unwrap();
        assert_eq!(back, ctx);
    }
}
