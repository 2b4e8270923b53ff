//! # Rule Document Loading
//!
//! Reads a rule document from disk, validates it against the rule schema,
//! decodes it and runs the structural checks. Files ending in `.json` are
//! parsed as JSON, everything else as YAML.

use std::path::Path;

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use droit_core::{DroitError, RuleDefinition};

use crate::validate::{SchemaValidationError, SchemaValidator};

/// Errors from [`load_rule`].
#[derive(Error, Debug)]
pub enum RuleLoadError {
    /// The document could not be read or failed the schema.
    #[error(transparent)]
    Schema(#[from] SchemaValidationError),

    /// The document passed the schema but did not decode.
    #[error("failed to decode rule {path}: {reason}")]
    Decode {
        /// Path to the document.
        path: String,
        /// Decoder message.
        reason: String,
    },

    /// The decoded rule is structurally invalid.
    #[error("invalid rule {path}: {source}")]
    Invalid {
        /// Path to the document.
        path: String,
        /// The structural error.
        #[source]
        source: DroitError,
    },
}

/// Parse document text into a JSON value.
///
/// `json` selects the JSON parser; otherwise the text is read as YAML.
pub fn parse_document(text: &str, json: bool) -> Result<Value, String> {
    if json {
        serde_json::from_str(text).map_err(|e| format!("JSON parse error: {e}"))
    } else {
        serde_yaml::from_str(text).map_err(|e| format!("YAML parse error: {e}"))
    }
}

/// Read a YAML or JSON document from disk into a JSON value.
pub fn load_document(path: &Path) -> Result<Value, SchemaValidationError> {
    let load_error = |reason: String| SchemaValidationError::DocumentLoadError {
        path: path.display().to_string(),
        reason,
    };
    let text = std::fs::read_to_string(path).map_err(|e| load_error(e.to_string()))?;
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    parse_document(&text, is_json).map_err(load_error)
}

/// Load, schema-validate, decode and structurally validate a rule document.
pub fn load_rule(
    validator: &SchemaValidator,
    path: &Path,
) -> Result<RuleDefinition, RuleLoadError> {
    let value = load_document(path)?;
    validator.validate_rule_value(&value)?;
    let rule: RuleDefinition =
        serde_json::from_value(value).map_err(|e| RuleLoadError::Decode {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
    rule.validate().map_err(|source| RuleLoadError::Invalid {
        path: path.display().to_string(),
        source,
    })?;
    debug!(path = %path.display(), rule = %rule.id, version = %rule.version, "rule loaded");
    Ok(rule)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yaml_and_json_parse_to_the_same_value() {
        let yaml = parse_document("a: 1\nb: [x, y]\n", false).unwrap();
        let json = parse_document(r#"{"a": 1, "b": ["x", "y"]}"#, true).unwrap();
        assert_eq!(yaml, json);
    }

    #[test]
    fn parse_errors_name_the_format() {
        assert!(parse_document("{", true).unwrap_err().starts_with("JSON"));
        assert!(parse_document("a: [", false).unwrap_err().starts_with("YAML"));
    }

    #[test]
    fn missing_file_is_a_document_error() {
        let err = load_document(Path::new("/nonexistent/rule.yaml")).unwrap_err();
        assert!(matches!(err, SchemaValidationError::DocumentLoadError { .. }));
    }
}
