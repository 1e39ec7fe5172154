//! # Event Log Validation
//!
//! Each record of a log is matched to the event schema named by its
//! `event_type` and validated in full. A record whose type has no schema is
//! an [`FindingKind::UnknownEventType`] finding, never a structural one, so
//! a typo in the type is not buried under envelope violations.
//!
//! Findings are labelled `<file>:<line>` and come out in file order.

use astra_core::{EventLog, EventRecord, Finding, FindingKind};
use astra_schema::{SchemaError, StructuralValidator};

use crate::context::CheckContext;

/// Validate every record of `log` against its event schema.
///
/// # Errors
///
/// [`SchemaError`] if an event schema fails to compile.
pub fn validate_event_log(ctx: &CheckContext, log: &EventLog) -> Result<Vec<Finding>, SchemaError> {
    let validator = StructuralValidator::new();
    let mut findings = Vec::new();

    for record in log.records() {
        findings.extend(validate_record(ctx, &validator, log.source_name(), record)?);
    }

    tracing::debug!(
        log = log.source(),
        records = log.len(),
        findings = findings.len(),
        "validated event log"
    );
    Ok(findings)
}

fn validate_record(
    ctx: &CheckContext,
    validator: &StructuralValidator,
    source: &str,
    record: &EventRecord,
) -> Result<Vec<Finding>, SchemaError> {
    let label = format!("{source}:{}", record.line());

    let Some(event_type) = record.event_type() else {
        return Ok(vec![Finding::new(
            FindingKind::UnknownEventType,
            label,
            "record has no string event_type",
        )]);
    };
    let Some(schema) = ctx.store().event(event_type) else {
        return Ok(vec![Finding::new(
            FindingKind::UnknownEventType,
            label,
            format!("unknown event type '{event_type}'"),
        )]);
    };

    let violations = validator.validate(record.value(), schema)?;
    Ok(violations
        .into_iter()
        .map(|v| Finding::new(FindingKind::Structural, label.clone(), format!("{event_type} {v}")))
        .collect())
}
