//! # Validate Subcommand
//!
//! Runs the fixture conformance runner: core-API fixtures, lifecycle
//! fixture structure, reason codes, lifecycle order, and snapshot
//! continuity, stopping at the first failing category.

use anyhow::{Context, Result};
use clap::Args;

use astra_conformance::{CheckContext, FixtureRunner};
use astra_core::ContractLayout;

use crate::{emit, CheckOutcome};

/// Arguments for the `astra validate` subcommand.
#[derive(Args, Debug, Default)]
pub struct ValidateArgs {}

/// Run the fixture conformance runner.
pub fn check_validate(_args: &ValidateArgs, layout: &ContractLayout) -> Result<CheckOutcome> {
    let ctx = CheckContext::load(layout.clone()).context("failed to load contracts")?;
    let outcome = FixtureRunner::new(&ctx)
        .run()
        .context("fixture conformance run aborted")?;
    tracing::info!(categories = outcome.completed.len(), "fixture conformance finished");
    Ok(CheckOutcome::from_report(
        outcome.report,
        "Contracts validated successfully.",
    ))
}

/// Execute the validate subcommand.
///
/// Returns exit code: 0 on success, 1 on findings.
pub fn run_validate(args: &ValidateArgs, layout: &ContractLayout) -> Result<u8> {
    Ok(emit(&check_validate(args, layout)?))
}
