//! # Events Subcommand
//!
//! Validates a locally recorded event log (default
//! `.astraai/local/events.ndjson`) against the event schemas. Developers
//! without a local log are not failed: a missing log is a skip.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use astra_conformance::{validate_event_log, CheckContext};
use astra_core::{ContractLayout, EventLog, Report};

use crate::{emit, resolve_path, CheckOutcome};

/// Arguments for the `astra events` subcommand.
#[derive(Args, Debug, Default)]
pub struct EventsArgs {
    /// Event log to validate (default: .astraai/local/events.ndjson).
    #[arg(long, value_name = "PATH")]
    pub log: Option<PathBuf>,
}

/// Validate the local event log, or skip when there is none.
pub fn check_events(args: &EventsArgs, layout: &ContractLayout) -> Result<CheckOutcome> {
    let log_path = args
        .log
        .as_deref()
        .map(|p| resolve_path(p, layout.root()))
        .unwrap_or_else(|| layout.local_events_path());

    if !log_path.exists() {
        tracing::warn!(path = %log_path.display(), "no local event log");
        return Ok(CheckOutcome::Skipped(format!(
            "No local {} found. Skipping validation.",
            file_name(&log_path)
        )));
    }

    let log = EventLog::load(&log_path)
        .with_context(|| format!("failed to load event log {}", log_path.display()))?;
    let ctx = CheckContext::load(layout.clone()).context("failed to load contracts")?;
    let findings = validate_event_log(&ctx, &log).context("event schema failed to compile")?;
    tracing::info!(records = log.len(), findings = findings.len(), "event log validated");

    let name = file_name(&log_path);
    let mut report = Report::new(format!("Event log violations in {name}"));
    report.extend(findings);
    Ok(CheckOutcome::from_report(
        report,
        format!("Local {name} validated successfully."),
    ))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Execute the events subcommand.
pub fn run_events(args: &EventsArgs, layout: &ContractLayout) -> Result<u8> {
    Ok(emit(&check_events(args, layout)?))
}
