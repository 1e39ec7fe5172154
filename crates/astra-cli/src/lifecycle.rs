//! # Lifecycle Subcommand
//!
//! Checks that event logs follow a canonical lifecycle path exactly. With
//! no flags, every shipped lifecycle fixture is checked against its own
//! path. `--log` checks one recorded log (against `--path`, default
//! `completed`); `--path` alone checks the shipped fixture for that path.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use astra_conformance::LifecycleFixture;
use astra_core::lifecycle::check_path;
use astra_core::{ContractLayout, EventLog, LifecyclePath, Report};

use crate::{emit, resolve_path, CheckOutcome};

/// Arguments for the `astra lifecycle` subcommand.
#[derive(Args, Debug, Default)]
pub struct LifecycleArgs {
    /// Event log to check instead of the shipped fixtures.
    #[arg(long, value_name = "PATH")]
    pub log: Option<PathBuf>,

    /// Canonical path the log must follow: completed, failed, or blocked.
    #[arg(long, value_name = "NAME")]
    pub path: Option<LifecyclePath>,
}

/// The logs to check and the path each must follow.
pub(crate) fn targets(
    log: Option<&PathBuf>,
    path: Option<LifecyclePath>,
    layout: &ContractLayout,
) -> Vec<(PathBuf, LifecyclePath)> {
    let fixtures = LifecycleFixture::defaults();
    match (log, path) {
        (Some(log), path) => vec![(
            resolve_path(log, layout.root()),
            path.unwrap_or(LifecyclePath::Completed),
        )],
        (None, Some(path)) => fixtures
            .into_iter()
            .filter(|f| f.path == path)
            .map(|f| (layout.fixture_path(&f.file), f.path))
            .collect(),
        (None, None) => fixtures
            .into_iter()
            .map(|f| (layout.fixture_path(&f.file), f.path))
            .collect(),
    }
}

/// Check each target log's event order.
pub fn check_lifecycle(args: &LifecycleArgs, layout: &ContractLayout) -> Result<CheckOutcome> {
    let mut report = Report::new("Lifecycle sequence mismatch");

    for (log_path, path) in targets(args.log.as_ref(), args.path, layout) {
        let log = EventLog::load(&log_path)
            .with_context(|| format!("failed to load event log {}", log_path.display()))?;
        let outcome = check_path(&log, path);
        tracing::debug!(log = log.source(), %path, ok = outcome.is_ok(), "checked lifecycle sequence");
        report.extend(outcome.into_findings(log.source_name()));
    }

    Ok(CheckOutcome::from_report(
        report,
        "Lifecycle sequence matches expected order.",
    ))
}

/// Execute the lifecycle subcommand.
pub fn run_lifecycle(args: &LifecycleArgs, layout: &ContractLayout) -> Result<u8> {
    Ok(emit(&check_lifecycle(args, layout)?))
}
