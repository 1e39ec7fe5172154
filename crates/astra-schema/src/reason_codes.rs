//! # Reason Codes
//!
//! `reason_codes.json` is the closed vocabulary of failure and decision
//! codes. Any schema property named `reason_code` must enumerate a
//! non-empty subset of it.
//!
//! Constraints are found by walking the raw schema value rather than the
//! compiled validator, so nested and `$ref`-indirected declarations are
//! reported at the pointer where the `reason_code` key appears.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use astra_core::document::read_json_as;
use astra_core::{Finding, FindingKind, LoadError};

use crate::store::{Schema, SchemaStore};

/// Key that marks a reason-code constraint.
pub const REASON_CODE_KEY: &str = "reason_code";

/// Upper bound on `$ref` hops while resolving one constraint.
const MAX_REF_DEPTH: usize = 16;

#[derive(Deserialize)]
struct RegistryDocument {
    reason_codes: Vec<String>,
}

/// Error loading the registry.
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error(transparent)]
    Load(#[from] LoadError),

    /// Codes listed more than once. Each appears once, sorted.
    #[error("duplicate reason codes in registry: {}", duplicates.join(", "))]
    Duplicate { duplicates: Vec<String> },
}

/// The closed set of valid reason codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReasonCodeRegistry {
    codes: Vec<String>,
    members: BTreeSet<String>,
}

impl ReasonCodeRegistry {
    /// Load `reason_codes.json`.
    ///
    /// # Errors
    ///
    /// [`RegistryError::Load`] when the document is missing, is not JSON,
    /// or has no string-array `reason_codes`; [`RegistryError::Duplicate`]
    /// when a code repeats.
    pub fn load(path: &Path) -> Result<Self, RegistryError> {
        let document: RegistryDocument = read_json_as(path)?;
        let registry = Self::from_codes(document.reason_codes)?;
        tracing::debug!(path = %path.display(), codes = registry.len(), "loaded reason code registry");
        Ok(registry)
    }

    /// Build a registry, preserving declaration order.
    pub fn from_codes<I, S>(codes: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let codes: Vec<String> = codes.into_iter().map(Into::into).collect();
        let mut members = BTreeSet::new();
        let mut duplicates = BTreeSet::new();
        for code in &codes {
            if !members.insert(code.clone()) {
                duplicates.insert(code.clone());
            }
        }
        if !duplicates.is_empty() {
            return Err(RegistryError::Duplicate {
                duplicates: duplicates.into_iter().collect(),
            });
        }
        Ok(Self { codes, members })
    }

    pub fn contains(&self, code: &str) -> bool {
        self.members.contains(code)
    }

    /// Codes in declaration order.
    pub fn codes(&self) -> &[String] {
        &self.codes
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

/// A `reason_code` declaration found in a schema.
#[derive(Debug, Clone, PartialEq)]
pub struct ReasonCodeConstraint {
    /// JSON pointer to the `reason_code` key.
    pub pointer: String,
    /// 0-based discovery order within the schema.
    pub ordinal: usize,
    /// The resolved `enum` array, or `None` when there is none.
    pub enumeration: Option<Vec<Value>>,
}

/// Collect every object-valued `reason_code` key in `schema`, depth first
/// with object keys in sorted order and array items by index.
pub fn find_constraints(schema: &Value) -> Vec<ReasonCodeConstraint> {
    let mut found = Vec::new();
    walk(schema, schema, String::new(), &mut found);
    found
}

fn walk(root: &Value, node: &Value, pointer: String, found: &mut Vec<ReasonCodeConstraint>) {
    match node {
        Value::Object(map) => {
            for (key, child) in map {
                let child_pointer = format!("{pointer}/{}", escape(key));
                if key == REASON_CODE_KEY && child.is_object() {
                    found.push(ReasonCodeConstraint {
                        pointer: child_pointer.clone(),
                        ordinal: found.len(),
                        enumeration: enumeration(root, child),
                    });
                }
                walk(root, child, child_pointer, found);
            }
        }
        Value::Array(items) => {
            for (i, child) in items.iter().enumerate() {
                walk(root, child, format!("{pointer}/{i}"), found);
            }
        }
        _ => {}
    }
}

/// The `enum` of a constraint, following same-document `$ref`s.
fn enumeration(root: &Value, constraint: &Value) -> Option<Vec<Value>> {
    let mut current = constraint;
    for _ in 0..MAX_REF_DEPTH {
        if let Some(values) = current.get("enum") {
            return values.as_array().cloned();
        }
        let target = current
            .get("$ref")
            .and_then(Value::as_str)
            .and_then(|r| r.strip_prefix('#'))?;
        current = root.pointer(target)?;
    }
    None
}

fn escape(key: &str) -> String {
    key.replace('~', "~0").replace('/', "~1")
}

/// Where a constraint lives: schema relative path plus pointer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConstraintLocation {
    pub schema: String,
    pub ordinal: usize,
    pub pointer: String,
}

impl fmt::Display for ConstraintLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.schema, self.pointer)
    }
}

/// Outcome of cross-checking schemas against the registry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReasonCodeReport {
    /// Constraints with no usable enumeration.
    pub empty_enumerations: Vec<ConstraintLocation>,
    /// Values outside the registry, per constraint.
    pub invalid_values: BTreeMap<ConstraintLocation, BTreeSet<String>>,
    /// Number of constraints inspected.
    pub constraints_checked: usize,
}

impl ReasonCodeReport {
    pub fn is_clean(&self) -> bool {
        self.empty_enumerations.is_empty() && self.invalid_values.is_empty()
    }

    pub fn merge(&mut self, other: ReasonCodeReport) {
        self.empty_enumerations.extend(other.empty_enumerations);
        self.empty_enumerations.sort();
        self.invalid_values.extend(other.invalid_values);
        self.constraints_checked += other.constraints_checked;
    }

    /// Empty enumerations first, then invalid values.
    pub fn into_findings(self) -> Vec<Finding> {
        let empty = self.empty_enumerations.into_iter().map(|location| {
            Finding::new(
                FindingKind::Referential,
                location.to_string(),
                "reason_code enumeration is empty",
            )
        });
        let invalid = self.invalid_values.into_iter().map(|(location, values)| {
            let values: Vec<String> = values.into_iter().collect();
            Finding::new(
                FindingKind::Referential,
                location.to_string(),
                format!("reason_code values not in registry: {}", values.join(", ")),
            )
        });
        empty.chain(invalid).collect()
    }
}

/// Cross-check one schema.
pub fn check_schema(schema: &Schema, registry: &ReasonCodeRegistry) -> ReasonCodeReport {
    let relative_path = schema.relative_path();
    let mut report = ReasonCodeReport::default();

    for constraint in find_constraints(schema.document()) {
        report.constraints_checked += 1;
        let location = ConstraintLocation {
            schema: relative_path.clone(),
            ordinal: constraint.ordinal,
            pointer: constraint.pointer,
        };
        let values = match constraint.enumeration {
            Some(values) if !values.is_empty() => values,
            _ => {
                report.empty_enumerations.push(location);
                continue;
            }
        };
        let invalid: BTreeSet<String> = values
            .iter()
            .filter(|v| !v.as_str().is_some_and(|code| registry.contains(code)))
            .map(|v| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect();
        if !invalid.is_empty() {
            report.invalid_values.insert(location, invalid);
        }
    }

    report
}

/// Cross-check every schema in the store.
pub fn check_store(store: &SchemaStore, registry: &ReasonCodeRegistry) -> ReasonCodeReport {
    let mut report = ReasonCodeReport::default();
    for schema in store.schemas() {
        report.merge(check_schema(schema, registry));
    }
    tracing::debug!(
        schemas = store.len(),
        constraints = report.constraints_checked,
        "reason code cross-check complete"
    );
    report
}
