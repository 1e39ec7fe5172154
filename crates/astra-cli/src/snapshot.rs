//! # Snapshot Subcommand
//!
//! Checks that the policy snapshot hash (or any other `--field`) holds one
//! value across each log. Log selection matches `astra lifecycle`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use astra_core::snapshot::field_pointer;
use astra_core::{check_continuity, ContractLayout, EventLog, Report, SNAPSHOT_HASH_FIELD};

use crate::lifecycle::targets;
use crate::{emit, CheckOutcome};

/// Arguments for the `astra snapshot` subcommand.
#[derive(Args, Debug, Default)]
pub struct SnapshotArgs {
    /// Event log to check instead of the shipped lifecycle fixtures.
    #[arg(long, value_name = "PATH")]
    pub log: Option<PathBuf>,

    /// Field to check: a JSON pointer, or a bare payload field name.
    #[arg(long, value_name = "FIELD")]
    pub field: Option<String>,
}

/// Check each target log for a single value of the field.
pub fn check_snapshot(args: &SnapshotArgs, layout: &ContractLayout) -> Result<CheckOutcome> {
    let field = field_pointer(args.field.as_deref().unwrap_or(SNAPSHOT_HASH_FIELD));
    let mut report = Report::new("Snapshot hash divergence");

    for (log_path, _) in targets(args.log.as_ref(), None, layout) {
        let log = EventLog::load(&log_path)
            .with_context(|| format!("failed to load event log {}", log_path.display()))?;
        let outcome = check_continuity(&log, &field);
        tracing::debug!(log = log.source(), field = %field, ok = outcome.is_ok(), "checked continuity");
        report.extend(outcome.into_findings(log.source_name(), &field));
    }

    Ok(CheckOutcome::from_report(
        report,
        "Snapshot hashes are consistent across lifecycle fixtures.",
    ))
}

/// Execute the snapshot subcommand.
pub fn run_snapshot(args: &SnapshotArgs, layout: &ContractLayout) -> Result<u8> {
    Ok(emit(&check_snapshot(args, layout)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{scratch, shipped};

    #[test]
    fn shipped_fixtures_pass() {
        let outcome = check_snapshot(&SnapshotArgs::default(), &shipped()).unwrap();
        assert!(!outcome.is_failure(), "{outcome}");
    }

    #[test]
    fn divergence_names_line_and_values() {
        let (dir, layout) = scratch();
        let log = dir.path().join("run.ndjson");
        std::fs::write(
            &log,
            concat!(
                "{\"event_type\":\"run.created\",\"payload\":{\"policy_snapshot_hash\":\"abc123\"}}\n",
                "{\"event_type\":\"run.started\",\"payload\":{}}\n",
                "{\"event_type\":\"run.completed\",\"payload\":{\"policy_snapshot_hash\":\"xyz999\"}}\n",
            ),
        )
        .unwrap();
        let args = SnapshotArgs {
            log: Some(log),
            field: Some("policy_snapshot_hash".into()),
        };
        let outcome = check_snapshot(&args, &layout).unwrap();
        assert_eq!(
            outcome.to_string(),
            "Snapshot hash divergence:\n\
             - run.ndjson:3: /payload/policy_snapshot_hash mismatch at record 3: has xyz999, expected abc123"
        );
    }

    #[test]
    fn other_fields_can_be_checked() {
        let layout = shipped();
        let args = SnapshotArgs {
            log: None,
            field: Some("/correlation_id".into()),
        };
        assert!(!check_snapshot(&args, &layout).unwrap().is_failure());
    }
}
