//! # Snapshot Continuity
//!
//! Every event of a run that references the policy decision must carry the
//! same policy snapshot hash. The first record with a non-null value sets
//! the expectation; the first record that differs fails the check.
//!
//! The field is optional per event, not per log: records without it (or
//! with `null`) are skipped, and a log where no record carries it passes.

use std::borrow::Cow;

use serde_json::Value;

use crate::event::EventLog;
use crate::report::{Finding, FindingKind};

/// JSON pointer of the policy snapshot hash within an event record.
pub const SNAPSHOT_HASH_FIELD: &str = "/payload/policy_snapshot_hash";

/// Result of a continuity check.
#[derive(Debug, Clone, PartialEq)]
pub enum ContinuityOutcome {
    /// Every carrier agrees (or there are none).
    Ok,
    /// First divergence from the established value.
    Mismatch {
        /// 1-based line in the source text.
        line: usize,
        /// 1-based record position.
        position: usize,
        /// Value established by the first carrier.
        expected: Value,
        /// Value found at the divergent record.
        actual: Value,
    },
}

impl ContinuityOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }

    /// Zero or one finding; the subject is `<subject>:<line>`.
    pub fn into_findings(self, subject: &str, field: &str) -> Vec<Finding> {
        match self {
            Self::Ok => Vec::new(),
            Self::Mismatch {
                line,
                position,
                expected,
                actual,
            } => vec![Finding::new(
                FindingKind::Continuity,
                format!("{subject}:{line}"),
                format!(
                    "{field} mismatch at record {position}: has {}, expected {}",
                    render(&actual),
                    render(&expected)
                ),
            )],
        }
    }
}

/// Normalize a field name to a JSON pointer. Bare names refer to payload
/// fields, so `policy_snapshot_hash` becomes `/payload/policy_snapshot_hash`.
pub fn field_pointer(field: &str) -> Cow<'_, str> {
    if field.starts_with('/') {
        Cow::Borrowed(field)
    } else {
        Cow::Owned(format!("/payload/{field}"))
    }
}

/// Check that `field` (a JSON pointer) holds one value across `log`.
pub fn check_continuity(log: &EventLog, field: &str) -> ContinuityOutcome {
    let mut established: Option<&Value> = None;

    for record in log.records() {
        let current = match record.field(field) {
            None | Some(Value::Null) => continue,
            Some(value) => value,
        };
        match established {
            None => established = Some(current),
            Some(expected) if expected != current => {
                return ContinuityOutcome::Mismatch {
                    line: record.line(),
                    position: record.position(),
                    expected: expected.clone(),
                    actual: current.clone(),
                };
            }
            Some(_) => {}
        }
    }

    ContinuityOutcome::Ok
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(snapshot: Option<&str>) -> Value {
        match snapshot {
            Some(hash) => json!({"event_type": "run.created", "payload": {"run_id": "r", "policy_snapshot_hash": hash}}),
            None => json!({"event_type": "run.started", "payload": {"run_id": "r"}}),
        }
    }

    #[test]
    fn shared_value_passes() {
        let log = EventLog::from_values(
            "lifecycle.ndjson",
            [event(Some("abc123")), event(None), event(Some("abc123"))],
        );
        assert_eq!(check_continuity(&log, SNAPSHOT_HASH_FIELD), ContinuityOutcome::Ok);
    }

    #[test]
    fn divergence_reports_exact_position() {
        let log = EventLog::from_values(
            "lifecycle.ndjson",
            [
                event(Some("abc123")),
                event(None),
                event(Some("abc123")),
                event(Some("xyz999")),
                event(Some("other")),
            ],
        );
        match check_continuity(&log, SNAPSHOT_HASH_FIELD) {
            ContinuityOutcome::Mismatch {
                line,
                position,
                expected,
                actual,
            } => {
                assert_eq!(line, 4);
                assert_eq!(position, 4);
                assert_eq!(expected, json!("abc123"));
                assert_eq!(actual, json!("xyz999"));
            }
            ContinuityOutcome::Ok => panic!("divergence accepted"),
        }
    }

    #[test]
    fn no_carriers_is_vacuously_ok() {
        let log = EventLog::from_values("log", [event(None), event(None)]);
        assert!(check_continuity(&log, SNAPSHOT_HASH_FIELD).is_ok());
        assert!(check_continuity(&EventLog::from_values("log", []), SNAPSHOT_HASH_FIELD).is_ok());
    }

    #[test]
    fn null_is_treated_as_absent() {
        let log = EventLog::from_values(
            "log",
            [
                json!({"event_type": "run.created", "payload": {"policy_snapshot_hash": null}}),
                event(Some("abc123")),
                json!({"event_type": "run.started", "payload": {"policy_snapshot_hash": null}}),
                event(Some("abc123")),
            ],
        );
        assert!(check_continuity(&log, SNAPSHOT_HASH_FIELD).is_ok());
    }

    #[test]
    fn line_numbers_account_for_blank_lines() {
        let text = concat!(
            "{\"event_type\":\"run.created\",\"payload\":{\"policy_snapshot_hash\":\"abc123\"}}\n",
            "\n",
            "{\"event_type\":\"run.approved\",\"payload\":{\"policy_snapshot_hash\":\"xyz999\"}}\n",
        );
        let log = EventLog::parse("lifecycle.ndjson", text).unwrap();
        let findings = check_continuity(&log, SNAPSHOT_HASH_FIELD)
            .into_findings(log.source_name(), SNAPSHOT_HASH_FIELD);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].subject, "lifecycle.ndjson:3");
        assert_eq!(
            findings[0].detail,
            "/payload/policy_snapshot_hash mismatch at record 2: has xyz999, expected abc123"
        );
    }

    #[test]
    fn bare_field_names_resolve_under_payload() {
        assert_eq!(field_pointer("policy_snapshot_hash"), SNAPSHOT_HASH_FIELD);
        assert_eq!(field_pointer("/correlation_id"), "/correlation_id");
    }

    #[test]
    fn other_fields_can_be_checked() {
        let log = EventLog::from_values(
            "log",
            [
                json!({"event_type": "run.created", "correlation_id": "corr_1", "payload": {}}),
                json!({"event_type": "run.started", "correlation_id": "corr_2", "payload": {}}),
            ],
        );
        match check_continuity(&log, "/correlation_id") {
            ContinuityOutcome::Mismatch { position, .. } => assert_eq!(position, 2),
            ContinuityOutcome::Ok => panic!("correlation divergence accepted"),
        }
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    proptest! {
        /// Changing one carrier's value is reported at exactly that record,
        /// provided an earlier carrier established the expectation.
        #[test]
        fn single_divergence_is_located(
            carriers in prop::collection::vec(any::<bool>(), 2..20),
            pick in any::<usize>(),
        ) {
            let mut values: Vec<Value> = carriers
                .iter()
                .map(|carries| if *carries {
                    json!({"event_type": "run.created", "payload": {"policy_snapshot_hash": "abc123"}})
                } else {
                    json!({"event_type": "run.started", "payload": {}})
                })
                .collect();
            // Force the first record to carry the value so the expectation
            // is set before the divergent record.
            values[0] = json!({"event_type": "run.created", "payload": {"policy_snapshot_hash": "abc123"}});
            let target = 1 + pick % (values.len() - 1);
            values[target] = json!({"event_type": "run.approved", "payload": {"policy_snapshot_hash": "xyz999"}});

            let log = EventLog::from_values("lifecycle.ndjson", values);
            match check_continuity(&log, SNAPSHOT_HASH_FIELD) {
                ContinuityOutcome::Mismatch { position, actual, expected, .. } => {
                    prop_assert_eq!(position, target + 1);
                    prop_assert_eq!(actual, json!("xyz999"));
                    prop_assert_eq!(expected, json!("abc123"));
                }
                ContinuityOutcome::Ok => prop_assert!(false, "divergence at {} accepted", target),
            }
        }
    }
}
