//! # Identity Newtypes
//!
//! Domain-primitive newtypes for identifiers. A [`NodeId`] cannot be passed
//! where a [`JurisdictionCode`] is expected.
//!
//! ## Validation
//!
//! [`JurisdictionCode`] is validated at construction and on deserialization
//! (non-empty, no whitespace). [`NodeId`] uniqueness and non-emptiness are
//! tree-level properties, checked by [`TreeIndex`](crate::TreeIndex).

use std::borrow::Borrow;

use serde::{Deserialize, Serialize};

use crate::error::DroitError;

/// Identifier of a node, unique within one rule tree.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Create a node identifier.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Access the identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for NodeId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A jurisdiction code, typically an ISO 3166-1 alpha-2 code ("DE", "SG")
/// or a supranational code ("EU").
///
/// # Validation
///
/// Must be non-empty and contain no whitespace. No further format
/// restrictions are imposed because regulators use mixed conventions.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct JurisdictionCode(String);

impl JurisdictionCode {
    /// Create a jurisdiction code, validating its format.
    ///
    /// # Errors
    ///
    /// Returns [`DroitError::Validation`] if the string is empty or contains
    /// whitespace.
    pub fn new(value: impl Into<String>) -> Result<Self, DroitError> {
        let s = value.into();
        if s.is_empty() || s.chars().any(char::is_whitespace) {
            return Err(DroitError::Validation(format!(
                "invalid jurisdiction code {s:?} (expected a non-empty code without whitespace)"
            )));
        }
        Ok(Self(s))
    }

    /// Access the code string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for JurisdictionCode {
    type Error = DroitError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<JurisdictionCode> for String {
    fn from(code: JurisdictionCode) -> Self {
        code.0
    }
}

impl std::fmt::Display for JurisdictionCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jurisdiction_code_valid() {
        let code = JurisdictionCode::new("EU").unwrap();
        assert_eq!(code.as_str(), "EU");
        assert_eq!(code.to_string(), "EU");
    }

    #[test]
    fn jurisdiction_code_rejects_empty_and_whitespace() {
        assert!(JurisdictionCode::new("").is_err());
        assert!(JurisdictionCode::new("U K").is_err());
        assert!(JurisdictionCode::new(" ").is_err());
    }

    #[test]
    fn jurisdiction_code_deserialization_validates() {
        let ok: JurisdictionCode = serde_json::from_str("\"SG\"").unwrap();
        assert_eq!(ok.as_str(), "SG");
        assert!(serde_json::from_str::<JurisdictionCode>("\"\"").is_err());
    }

    #[test]
    fn node_id_is_transparent_in_json() {
        let id = NodeId::from("root");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"root\"");
    }

    #[test]
    fn node_id_borrows_as_str_for_map_lookup() {
        let mut map = std::collections::HashMap::new();
        map.insert(NodeId::from("a"), 1);
        assert_eq!(map.get("a"), Some(&1));
    }
}
