//! JSON schema validation for export documents.
//!
//! Schemas live as JSON files in a schema directory and are interpreted
//! directly over `serde_json::Value` (the subset the export schemas
//! use: `type`, `required`, `properties`, `additionalProperties`,
//! `items`, `enum`, `oneOf`). The `validate_*` entry points are total:
//! every failure, including a missing or broken schema file, lands in
//! the returned report instead of propagating. `load_schema` is the
//! only fallible operation here.

use crate::errors::IngestError;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Outcome of validating one document against one schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    /// True when no findings were recorded
    pub valid: bool,
    /// One entry per finding, each prefixed with its location
    pub errors: Vec<String>,
}

impl ValidationReport {
    fn ok() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
        }
    }

    fn failed(errors: Vec<String>) -> Self {
        Self {
            valid: false,
            errors,
        }
    }
}

/// Validates parsed documents and files against named schemas.
#[derive(Debug, Clone)]
pub struct SchemaValidator {
    schema_dir: PathBuf,
}

impl SchemaValidator {
    /// Create a validator rooted at the given schema directory.
    pub fn new(schema_dir: impl AsRef<Path>) -> Self {
        Self {
            schema_dir: schema_dir.as_ref().to_path_buf(),
        }
    }

    /// Load a schema document by name (`.json` suffix optional).
    pub fn load_schema(&self, name: &str) -> Result<Value, IngestError> {
        let file_name = if name.ends_with(".json") {
            name.to_string()
        } else {
            format!("{}.json", name)
        };
        let path = self.schema_dir.join(file_name);
        if !path.exists() {
            return Err(IngestError::SchemaNotFound { path });
        }
        let contents = fs::read_to_string(&path)?;
        serde_json::from_str(&contents).map_err(|source| IngestError::SchemaParse {
            name: name.to_string(),
            source,
        })
    }

    /// Validate a parsed document against a named schema. Never fails:
    /// a schema that cannot be loaded becomes a single synthetic entry
    /// in the report.
    pub fn validate_data(&self, document: &Value, schema_name: &str) -> ValidationReport {
        let schema = match self.load_schema(schema_name) {
            Ok(schema) => schema,
            Err(err) => return ValidationReport::failed(vec![format!("schema error: {}", err)]),
        };
        let mut errors = Vec::new();
        check(&schema, document, "$", &mut errors);
        if errors.is_empty() {
            ValidationReport::ok()
        } else {
            ValidationReport::failed(errors)
        }
    }

    /// Validate a JSON file against a named schema. Like
    /// [`validate_data`](Self::validate_data) this never fails; a
    /// missing or unparseable file is reported as its own finding.
    pub fn validate_file(&self, path: &Path, schema_name: &str) -> ValidationReport {
        if !path.exists() {
            return ValidationReport::failed(vec![format!("file not found: {}", path.display())]);
        }
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) => {
                return ValidationReport::failed(vec![format!(
                    "failed to read {}: {}",
                    path.display(),
                    err
                )])
            }
        };
        let document: Value = match serde_json::from_str(&contents) {
            Ok(document) => document,
            Err(err) => {
                return ValidationReport::failed(vec![format!(
                    "invalid JSON in {}: {}",
                    path.display(),
                    err
                )])
            }
        };
        self.validate_data(&document, schema_name)
    }
}

/// Walk schema and document together, appending findings to `errors`.
fn check(schema: &Value, data: &Value, location: &str, errors: &mut Vec<String>) {
    if let Some(variants) = schema.get("oneOf").and_then(Value::as_array) {
        let matched = variants.iter().any(|variant| {
            let mut scratch = Vec::new();
            check(variant, data, location, &mut scratch);
            scratch.is_empty()
        });
        if !matched {
            errors.push(format!("{}: does not match any allowed variant", location));
        }
        return;
    }

    if let Some(expected) = schema.get("type").and_then(Value::as_str) {
        if !type_matches(expected, data) {
            errors.push(format!(
                "{}: expected {}, got {}",
                location,
                expected,
                type_name(data)
            ));
            // No point descending into a value of the wrong shape.
            return;
        }
    }

    if let Some(allowed) = schema.get("enum").and_then(Value::as_array) {
        if !allowed.contains(data) {
            errors.push(format!("{}: value is not one of the allowed set", location));
        }
    }

    if let Some(object) = data.as_object() {
        if let Some(required) = schema.get("required").and_then(Value::as_array) {
            for name in required.iter().filter_map(Value::as_str) {
                if !object.contains_key(name) {
                    errors.push(format!("{}: missing required property '{}'", location, name));
                }
            }
        }
        let declared = schema.get("properties").and_then(Value::as_object);
        if let Some(properties) = declared {
            for (name, subschema) in properties {
                if let Some(value) = object.get(name) {
                    check(subschema, value, &format!("{}.{}", location, name), errors);
                }
            }
        }
        if let Some(extra) = schema.get("additionalProperties") {
            if extra.is_object() {
                for (name, value) in object {
                    let is_declared = declared.map(|p| p.contains_key(name)).unwrap_or(false);
                    if !is_declared {
                        check(extra, value, &format!("{}.{}", location, name), errors);
                    }
                }
            }
        }
    }

    if let Some(elements) = data.as_array() {
        if let Some(items) = schema.get("items") {
            for (index, element) in elements.iter().enumerate() {
                check(items, element, &format!("{}[{}]", location, index), errors);
            }
        }
    }
}

fn type_matches(expected: &str, data: &Value) -> bool {
    match expected {
        "object" => data.is_object(),
        "array" => data.is_array(),
        "string" => data.is_string(),
        "integer" => data.is_i64() || data.is_u64(),
        "number" => data.is_number(),
        "boolean" => data.is_boolean(),
        "null" => data.is_null(),
        // Unknown type keyword: accept rather than reject.
        _ => true,
    }
}

fn type_name(data: &Value) -> &'static str {
    match data {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
