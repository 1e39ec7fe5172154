//! # Structural Validation
//!
//! Validation of JSON documents against contract schemas (Draft-07).
//!
//! ## Semantics
//!
//! - Every violation of a document is collected; validation never stops at
//!   the first error.
//! - Violations are sorted by instance path, then schema path, then
//!   message, so unchanged input always yields identical output.
//! - A `required` violation is reported at the missing property's path
//!   (`/execution_result/status`), not at its parent object.
//!
//! ## Schema Resolution
//!
//! Internal `$ref`s of the form `#/definitions/<name>` are resolved by the
//! jsonschema crate natively. Contracts are self-contained, so any other
//! reference is refused by [`OfflineRetriever`] instead of being fetched.

use std::fmt;

use jsonschema::error::ValidationErrorKind;
use jsonschema::{Draft, Retrieve, Uri, ValidationOptions, Validator};
use serde_json::Value;
use thiserror::Error;

use astra_core::LoadError;

use crate::store::Schema;

/// Host of the JSON Schema meta-schemas.
const META_SCHEMA_HOST: &str = "json-schema.org";

/// Refuses every external `$ref`.
///
/// Meta-schema URIs resolve to a permissive schema so a `$schema` keyword
/// never causes a network request.
struct OfflineRetriever;

impl Retrieve for OfflineRetriever {
    fn retrieve(
        &self,
        uri: &Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        let uri_str = uri.as_str();
        if uri_str.contains(META_SCHEMA_HOST) {
            return Ok(serde_json::json!({}));
        }
        Err(format!("external reference '{uri_str}' cannot be resolved offline").into())
    }
}

/// Error while preparing validation.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// The schema or document could not be loaded.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// The schema does not compile as a Draft-07 schema.
    #[error("schema '{schema}' is not a valid Draft-07 schema: {reason}")]
    InvalidSchema {
        /// Relative path of the schema.
        schema: String,
        /// Compiler message.
        reason: String,
    },
}

/// One step into a JSON document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

/// Location of a value inside a validated document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstancePath(Vec<PathSegment>);

impl InstancePath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Decode a JSON pointer, using `instance` to tell array indices from
    /// object keys that happen to be numeric.
    pub fn from_pointer(pointer: &str, instance: &Value) -> Self {
        let mut segments = Vec::new();
        let mut current = Some(instance);

        for raw in pointer.split('/').skip(1) {
            let token = raw.replace("~1", "/").replace("~0", "~");
            let index = match current {
                Some(Value::Array(_)) => token.parse::<usize>().ok(),
                _ => None,
            };
            match index {
                Some(i) => {
                    current = current.and_then(|v| v.get(i));
                    segments.push(PathSegment::Index(i));
                }
                None => {
                    current = current.and_then(|v| v.get(token.as_str()));
                    segments.push(PathSegment::Key(token));
                }
            }
        }
        Self(segments)
    }

    pub fn push(&mut self, segment: PathSegment) {
        self.0.push(segment);
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// The final key, if the path ends in one.
    pub fn last_key(&self) -> Option<&str> {
        match self.0.last() {
            Some(PathSegment::Key(key)) => Some(key),
            _ => None,
        }
    }
}

impl fmt::Display for InstancePath {
    /// JSON pointer form.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.0 {
            match segment {
                PathSegment::Key(key) => write!(f, "/{}", key.replace('~', "~0").replace('/', "~1"))?,
                PathSegment::Index(i) => write!(f, "/{i}")?,
            }
        }
        Ok(())
    }
}

/// A single structural violation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Violation {
    /// Where in the document the violation is.
    pub path: InstancePath,
    /// JSON pointer into the schema of the failing keyword.
    pub schema_path: String,
    /// Human-readable description.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_root() {
            write!(f, "(root): {}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Draft-07 validator backed by the `jsonschema` crate.
///
/// Stateless; schemas are compiled per call since contract documents are
/// small.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuralValidator;

impl StructuralValidator {
    pub fn new() -> Self {
        Self
    }

    fn options() -> ValidationOptions {
        let mut opts = jsonschema::options();
        opts.with_draft(Draft::Draft7);
        // `format` is an annotation under Draft-07, not an assertion.
        opts.should_validate_formats(false);
        opts.with_retriever(OfflineRetriever);
        opts
    }

    /// Compile a raw schema value. `label` names it in errors.
    ///
    /// # Errors
    ///
    /// [`SchemaError::InvalidSchema`] if the schema does not compile.
    pub fn compile_value(&self, schema: &Value, label: &str) -> Result<Validator, SchemaError> {
        Self::options()
            .build(schema)
            .map_err(|e| SchemaError::InvalidSchema {
                schema: label.to_string(),
                reason: e.to_string(),
            })
    }

    /// Compile a loaded schema.
    pub fn compile(&self, schema: &Schema) -> Result<Validator, SchemaError> {
        self.compile_value(schema.document(), &schema.relative_path())
    }

    /// Validate `document` against `schema`. An empty list means the
    /// document conforms.
    ///
    /// # Errors
    ///
    /// [`SchemaError::InvalidSchema`] if the schema does not compile.
    pub fn validate(&self, document: &Value, schema: &Schema) -> Result<Vec<Violation>, SchemaError> {
        let validator = self.compile(schema)?;
        Ok(collect_violations(&validator, document))
    }

    /// [`Self::validate`] against a raw schema value.
    pub fn validate_value(
        &self,
        document: &Value,
        schema: &Value,
        label: &str,
    ) -> Result<Vec<Violation>, SchemaError> {
        let validator = self.compile_value(schema, label)?;
        Ok(collect_violations(&validator, document))
    }
}

fn collect_violations(validator: &Validator, instance: &Value) -> Vec<Violation> {
    let mut violations: Vec<Violation> = validator
        .iter_errors(instance)
        .map(|e| {
            let mut path = InstancePath::from_pointer(&e.instance_path.to_string(), instance);
            if let ValidationErrorKind::Required { property } = &e.kind {
                if let Some(name) = property.as_str() {
                    path.push(PathSegment::Key(name.to_string()));
                }
            }
            Violation {
                path,
                schema_path: e.schema_path.to_string(),
                message: e.to_string(),
            }
        })
        .collect();
    violations.sort();
    violations.dedup();
    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SchemaId;
    use serde_json::json;

    fn response_schema() -> Schema {
        Schema::new(
            SchemaId::core_api("execute_run", astra_core::Direction::Response),
            json!({
                "$schema": "http://json-schema.org/draft-07/schema#",
                "type": "object",
                "additionalProperties": false,
                "required": ["execution_result"],
                "properties": {
                    "execution_result": {
                        "type": "object",
                        "required": ["status"],
                        "properties": {
                            "status": {"type": "string", "enum": ["succeeded", "failed"]},
                            "reason_code": {"type": "string"}
                        }
                    }
                }
            }),
        )
    }

    #[test]
    fn conforming_document_has_no_violations() {
        let doc = json!({"execution_result": {"status": "succeeded"}});
        let violations = StructuralValidator::new().validate(&doc, &response_schema()).unwrap();
        assert!(violations.is_empty(), "{violations:?}");
    }

    #[test]
    fn missing_required_field_points_at_field() {
        let doc = json!({"execution_result": {"reason_code": "EXECUTION_FAILED"}});
        let violations = StructuralValidator::new().validate(&doc, &response_schema()).unwrap();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].path.to_string(), "/execution_result/status");
        assert_eq!(violations[0].path.last_key(), Some("status"));
        assert!(violations[0].message.contains("status"));
    }

    #[test]
    fn all_violations_are_collected() {
        let doc = json!({
            "execution_result": {"status": "paused", "reason_code": 7},
            "extra": true
        });
        let violations = StructuralValidator::new().validate(&doc, &response_schema()).unwrap();
        assert!(violations.len() >= 3, "{violations:?}");
    }

    #[test]
    fn violations_are_sorted_and_repeatable() {
        let doc = json!({
            "execution_result": {"status": 1, "reason_code": false},
            "zzz": 1,
            "aaa": 2
        });
        let validator = StructuralValidator::new();
        let first = validator.validate(&doc, &response_schema()).unwrap();
        let second = validator.validate(&doc, &response_schema()).unwrap();
        assert_eq!(first, second);
        let mut sorted = first.clone();
        sorted.sort();
        assert_eq!(first, sorted);
    }

    #[test]
    fn array_indices_are_decoded() {
        let schema = json!({
            "type": "object",
            "properties": {"items": {"type": "array", "items": {"type": "string"}}}
        });
        let doc = json!({"items": ["a", 2]});
        let violations = StructuralValidator::new()
            .validate_value(&doc, &schema, "inline")
            .unwrap();
        assert_eq!(violations.len(), 1);
        assert_eq!(
            violations[0].path.segments(),
            &[PathSegment::Key("items".into()), PathSegment::Index(1)]
        );
    }

    #[test]
    fn internal_refs_resolve() {
        let schema = json!({
            "type": "object",
            "required": ["token"],
            "properties": {"token": {"$ref": "#/definitions/token"}},
            "definitions": {
                "token": {"type": "object", "required": ["token_id"], "properties": {"token_id": {"type": "string"}}}
            }
        });
        let violations = StructuralValidator::new()
            .validate_value(&json!({"token": {}}), &schema, "inline")
            .unwrap();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].path.to_string(), "/token/token_id");
    }

    #[test]
    fn formats_are_annotations() {
        let schema = json!({
            "type": "object",
            "properties": {"occurred_at": {"type": "string", "format": "date-time"}}
        });
        let violations = StructuralValidator::new()
            .validate_value(&json!({"occurred_at": "2025-01-14 09:30:00"}), &schema, "inline")
            .unwrap();
        assert!(violations.is_empty(), "{violations:?}");

        let violations = StructuralValidator::new()
            .validate_value(&json!({"occurred_at": 1736847000}), &schema, "inline")
            .unwrap();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].path.to_string(), "/occurred_at");
    }

    #[test]
    fn external_refs_are_refused() {
        let schema = json!({"$ref": "https://example.invalid/other.schema.json"});
        let err = StructuralValidator::new()
            .validate_value(&json!({}), &schema, "inline")
            .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidSchema { .. }), "got: {err}");
    }

    #[test]
    fn pointer_decoding_unescapes_and_keeps_numeric_keys() {
        let doc = json!({"a/b": {"0": {"x": 1}}});
        let path = InstancePath::from_pointer("/a~1b/0/x", &doc);
        assert_eq!(
            path.segments(),
            &[
                PathSegment::Key("a/b".into()),
                PathSegment::Key("0".into()),
                PathSegment::Key("x".into()),
            ]
        );
        assert_eq!(path.to_string(), "/a~1b/0/x");
    }

    #[test]
    fn violation_display_root() {
        let v = Violation {
            path: InstancePath::root(),
            schema_path: "/required".to_string(),
            message: r#""execution_result" is a required property"#.to_string(),
        };
        assert!(v.to_string().starts_with("(root): "));
    }
}
