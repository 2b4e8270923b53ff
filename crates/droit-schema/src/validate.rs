//! # Runtime Schema Validation
//!
//! Validates JSON/YAML documents against JSON Schema (Draft 2020-12)
//! definitions. Resolves `$ref` URIs internally by mapping
//! `https://schemas.droit-rules.org/droit/{name}` to loaded schema files.
//!
//! ## Design
//!
//! The [`SchemaValidator`] loads schema files at construction time and builds
//! a URI → schema map for `$ref` resolution. Validation errors carry the
//! schema `$id`, the JSON Pointer to the violating field, and a
//! human-readable message.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// One schema violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaValidationDetail {
    /// The JSON Schema `$id` that was violated.
    pub schema_path: String,
    /// The JSON Pointer to the field that failed validation.
    pub instance_path: String,
    /// Human-readable description of the violation.
    pub message: String,
}

impl std::fmt::Display for SchemaValidationDetail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let path = if self.instance_path.is_empty() {
            "/"
        } else {
            &self.instance_path
        };
        write!(f, "{path}: {}", self.message)
    }
}

/// Errors returned by schema validation operations.
#[derive(Error, Debug)]
pub enum SchemaValidationError {
    /// The schema file could not be read or parsed.
    #[error("failed to load schema {path}: {reason}")]
    SchemaLoadError {
        /// Path or identifier of the schema that failed to load.
        path: String,
        /// Human-readable reason for the failure.
        reason: String,
    },

    /// The target document could not be loaded.
    #[error("failed to load document {path}: {reason}")]
    DocumentLoadError {
        /// Path to the document that failed to load.
        path: String,
        /// Human-readable reason for the failure.
        reason: String,
    },

    /// The schema could not be compiled into a validator.
    #[error("failed to compile schema {schema_id}: {reason}")]
    SchemaCompileError {
        /// The schema `$id`.
        schema_id: String,
        /// Human-readable reason.
        reason: String,
    },

    /// The document failed validation against its schema.
    #[error("{count} validation error(s) against {schema_id}")]
    ValidationFailed {
        /// The schema that was violated.
        schema_id: String,
        /// Number of violations found.
        count: usize,
        /// Individual violation details.
        details: Vec<SchemaValidationDetail>,
    },

    /// The requested schema was not found in the registry.
    #[error("schema not found: {0}")]
    SchemaNotFound(String),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Schema retriever for $ref resolution
// ---------------------------------------------------------------------------

/// URI prefix used by all Droit schemas.
const SCHEMA_URI_PREFIX: &str = "https://schemas.droit-rules.org/droit/";

/// `$id` of the rule definition schema.
pub const RULE_SCHEMA_ID: &str =
    "https://schemas.droit-rules.org/droit/rule-definition.schema.json";

const RULE_SCHEMA_FILENAME: &str = "rule-definition.schema.json";

/// The rule definition schema, bundled so a validator works without a
/// `schemas/` directory on disk.
const BUNDLED_RULE_SCHEMA: &str = include_str!("../../../schemas/rule-definition.schema.json");

/// Resolves `$ref` URIs against the pre-loaded schema map.
struct LocalSchemaRetriever {
    schemas: HashMap<String, Value>,
}

impl jsonschema::Retrieve for LocalSchemaRetriever {
    fn retrieve(
        &self,
        uri: &jsonschema::Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        let uri_str = uri.as_str();
        self.schemas
            .get(uri_str)
            .cloned()
            .ok_or_else(|| format!("schema not found for URI: {uri_str}").into())
    }
}

// ---------------------------------------------------------------------------
// SchemaValidator
// ---------------------------------------------------------------------------

/// A registry of JSON schemas keyed by `$id`.
pub struct SchemaValidator {
    /// Where the schemas were loaded from. `None` for the bundled set.
    schema_dir: Option<PathBuf>,
    /// Pre-loaded schemas indexed by their `$id` URI.
    schema_map: HashMap<String, Value>,
    /// Map from schema filename (e.g. `rule-definition.schema.json`) to its `$id`.
    filename_to_id: HashMap<String, String>,
}

impl std::fmt::Debug for SchemaValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaValidator")
            .field("schema_dir", &self.schema_dir)
            .field("schema_count", &self.schema_map.len())
            .finish()
    }
}

impl SchemaValidator {
    /// Load every `*.schema.json` file under `schema_dir`, recursively.
    ///
    /// Each schema is registered by its `$id`, or by a URI derived from its
    /// path relative to `schema_dir` when it has none. A missing directory
    /// yields an empty registry.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaValidationError::SchemaLoadError`] if any schema file
    /// cannot be read or parsed as JSON.
    pub fn new(schema_dir: impl Into<PathBuf>) -> Result<Self, SchemaValidationError> {
        let schema_dir = schema_dir.into();
        let mut validator = Self {
            schema_dir: Some(schema_dir.clone()),
            schema_map: HashMap::new(),
            filename_to_id: HashMap::new(),
        };

        if !schema_dir.is_dir() {
            return Ok(validator);
        }

        let mut seen_paths = HashSet::new();
        for path in Self::glob_schemas(&schema_dir)? {
            if !seen_paths.insert(path.clone()) {
                continue;
            }
            let content = std::fs::read_to_string(&path).map_err(|e| {
                SchemaValidationError::SchemaLoadError {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                }
            })?;
            let rel = path.strip_prefix(&schema_dir).unwrap_or(&path);
            let derived = format!("{SCHEMA_URI_PREFIX}{}", rel.display());
            let filename = path
                .file_name()
                .and_then(|f| f.to_str())
                .map(str::to_string);
            validator.register(&path.display().to_string(), &content, derived, filename)?;
        }

        debug!(
            dir = %schema_dir.display(),
            count = validator.schema_map.len(),
            "schemas loaded"
        );
        Ok(validator)
    }

    /// A validator holding only the bundled rule definition schema.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaValidationError::SchemaLoadError`] if the bundled
    /// schema does not parse.
    pub fn bundled() -> Result<Self, SchemaValidationError> {
        let mut validator = Self {
            schema_dir: None,
            schema_map: HashMap::new(),
            filename_to_id: HashMap::new(),
        };
        validator.register(
            RULE_SCHEMA_FILENAME,
            BUNDLED_RULE_SCHEMA,
            RULE_SCHEMA_ID.to_string(),
            Some(RULE_SCHEMA_FILENAME.to_string()),
        )?;
        Ok(validator)
    }

    /// Returns the number of schemas loaded into the registry.
    pub fn schema_count(&self) -> usize {
        self.schema_map.len()
    }

    /// Returns the directory the schemas were loaded from, if any.
    pub fn schema_dir(&self) -> Option<&Path> {
        self.schema_dir.as_deref()
    }

    /// Returns all registered schema `$id` URIs, sorted.
    pub fn schema_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.schema_map.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Look up a schema by its `$id` URI.
    pub fn get_schema(&self, schema_id: &str) -> Option<&Value> {
        self.schema_map.get(schema_id)
    }

    /// Validate a JSON value against a schema identified by its `$id` URI.
    ///
    /// Returns `Ok(())` if the value is valid, or a
    /// [`SchemaValidationError::ValidationFailed`] with all violation details.
    pub fn validate_value(
        &self,
        value: &Value,
        schema_id: &str,
    ) -> Result<(), SchemaValidationError> {
        let schema = self
            .schema_map
            .get(schema_id)
            .ok_or_else(|| SchemaValidationError::SchemaNotFound(schema_id.to_string()))?;

        let retriever = LocalSchemaRetriever {
            schemas: self.schema_map.clone(),
        };

        let validator = jsonschema::options()
            .with_draft(jsonschema::Draft::Draft202012)
            .with_retriever(retriever)
            .build(schema)
            .map_err(|e| SchemaValidationError::SchemaCompileError {
                schema_id: schema_id.to_string(),
                reason: e.to_string(),
            })?;

        let errors: Vec<SchemaValidationDetail> = validator
            .iter_errors(value)
            .map(|err| SchemaValidationDetail {
                schema_path: schema_id.to_string(),
                instance_path: err.instance_path.to_string(),
                message: err.to_string(),
            })
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            debug!(schema = schema_id, count = errors.len(), "document failed validation");
            Err(SchemaValidationError::ValidationFailed {
                schema_id: schema_id.to_string(),
                count: errors.len(),
                details: errors,
            })
        }
    }

    /// Validate a JSON value against a schema identified by filename.
    pub fn validate_value_by_filename(
        &self,
        value: &Value,
        filename: &str,
    ) -> Result<(), SchemaValidationError> {
        let schema_id = self
            .filename_to_id
            .get(filename)
            .ok_or_else(|| SchemaValidationError::SchemaNotFound(filename.to_string()))?;
        self.validate_value(value, schema_id)
    }

    /// Validate a value as a rule definition document.
    pub fn validate_rule_value(&self, value: &Value) -> Result<(), SchemaValidationError> {
        self.validate_value(value, RULE_SCHEMA_ID)
    }

    // -----------------------------------------------------------------------
    // Private helpers
    // -----------------------------------------------------------------------

    fn register(
        &mut self,
        origin: &str,
        content: &str,
        derived_id: String,
        filename: Option<String>,
    ) -> Result<(), SchemaValidationError> {
        let schema: Value =
            serde_json::from_str(content).map_err(|e| SchemaValidationError::SchemaLoadError {
                path: origin.to_string(),
                reason: e.to_string(),
            })?;
        let schema_id = schema
            .get("$id")
            .and_then(Value::as_str)
            .map_or(derived_id, str::to_string);
        if let Some(filename) = filename {
            self.filename_to_id.insert(filename, schema_id.clone());
        }
        self.schema_map.insert(schema_id, schema);
        Ok(())
    }

    /// Recursively collect `*.schema.json` file paths, sorted.
    fn glob_schemas(dir: &Path) -> Result<Vec<PathBuf>, SchemaValidationError> {
        let mut results = Vec::new();
        Self::walk_for_schemas(dir, &mut results)?;
        results.sort();
        Ok(results)
    }

    fn walk_for_schemas(dir: &Path, acc: &mut Vec<PathBuf>) -> Result<(), SchemaValidationError> {
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_dir() {
                Self::walk_for_schemas(&path, acc)?;
            } else if path
                .file_name()
                .and_then(|f| f.to_str())
                .is_some_and(|name| name.ends_with(".schema.json"))
            {
                acc.push(path);
            }
        }
        Ok(())
    }
}
