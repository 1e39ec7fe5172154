//! # Event Logs
//!
//! A run's lifecycle is recorded as newline-delimited JSON: one event
//! object per line, blank lines ignored, file order equal to emission
//! order. Records keep both their physical line number and their record
//! position so diagnostics can point back into the file.
//!
//! Parsing only checks that each line is a JSON object. Whether the
//! `event_type` is known and whether the record matches its schema are
//! separate checks with their own findings.

use std::path::Path;

use serde_json::{Map, Value};

use crate::document::read_text;
use crate::error::LoadError;

/// Projection of a record that carries no string `event_type`.
pub const MISSING_EVENT_TYPE: &str = "<missing>";

/// One event object from a log.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRecord {
    line: usize,
    position: usize,
    value: Value,
}

impl EventRecord {
    /// 1-based line number in the source text.
    pub fn line(&self) -> usize {
        self.line
    }

    /// 1-based position among the log's records (blank lines excluded).
    pub fn position(&self) -> usize {
        self.position
    }

    /// The full record.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// The record's `event_type`, if it is a string.
    pub fn event_type(&self) -> Option<&str> {
        self.value.get("event_type").and_then(Value::as_str)
    }

    /// The record's `payload` object, if present.
    pub fn payload(&self) -> Option<&Map<String, Value>> {
        self.value.get("payload").and_then(Value::as_object)
    }

    /// Look up a field by JSON pointer (e.g. `/payload/policy_snapshot_hash`).
    pub fn field(&self, pointer: &str) -> Option<&Value> {
        self.value.pointer(pointer)
    }
}

/// An ordered event log.
#[derive(Debug, Clone, PartialEq)]
pub struct EventLog {
    source: String,
    records: Vec<EventRecord>,
}

impl EventLog {
    /// Parse newline-delimited JSON. `source` labels diagnostics.
    ///
    /// # Errors
    ///
    /// [`LoadError::Malformed`] naming the first line that is not a JSON
    /// object.
    pub fn parse(source: impl Into<String>, text: &str) -> Result<Self, LoadError> {
        let source = source.into();
        let mut records = Vec::new();

        for (index, line) in text.lines().enumerate() {
            let line_number = index + 1;
            if line.trim().is_empty() {
                continue;
            }
            let value: Value = serde_json::from_str(line).map_err(|e| {
                LoadError::malformed(&source, format!("line {line_number}: invalid JSON: {e}"))
            })?;
            if !value.is_object() {
                return Err(LoadError::malformed(
                    &source,
                    format!("line {line_number}: expected a JSON object"),
                ));
            }
            records.push(EventRecord {
                line: line_number,
                position: records.len() + 1,
                value,
            });
        }

        tracing::debug!(source = %source, records = records.len(), "parsed event log");
        Ok(Self { source, records })
    }

    /// Read and parse a log file.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let text = read_text(path)?;
        Self::parse(path.display().to_string(), &text)
    }

    /// Build a log from in-memory records; line and position both count
    /// from 1 in iteration order.
    pub fn from_values(source: impl Into<String>, values: impl IntoIterator<Item = Value>) -> Self {
        let records = values
            .into_iter()
            .enumerate()
            .map(|(i, value)| EventRecord {
                line: i + 1,
                position: i + 1,
                value,
            })
            .collect();
        Self {
            source: source.into(),
            records,
        }
    }

    /// Label used in diagnostics (usually the file path).
    pub fn source(&self) -> &str {
        &self.source
    }

    /// File name of the source, or the whole label when it has none.
    pub fn source_name(&self) -> &str {
        Path::new(&self.source)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(&self.source)
    }

    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// `event_type` of every record in order; records without one project
    /// as [`MISSING_EVENT_TYPE`].
    pub fn event_types(&self) -> Vec<&str> {
        self.records
            .iter()
            .map(|r| r.event_type().unwrap_or(MISSING_EVENT_TYPE))
            .collect()
    }
}
