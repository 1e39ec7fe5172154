//! # Reason Codes Subcommand
//!
//! Loads the registry and cross-checks every `reason_code` enumeration in
//! the schemas against it. Duplicate registry entries are reported as
//! findings rather than aborting, since the registry itself is under test.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use astra_core::{ContractLayout, Finding, FindingKind, Report};
use astra_schema::{check_store, ReasonCodeRegistry, RegistryError, SchemaStore};

use crate::{emit, resolve_path, CheckOutcome};

/// Arguments for the `astra reason-codes` subcommand.
#[derive(Args, Debug, Default)]
pub struct ReasonCodesArgs {
    /// Registry document (default: contracts/reason_codes.json).
    #[arg(long, value_name = "PATH")]
    pub registry: Option<PathBuf>,
}

/// Check the registry and every schema's reason code enumerations.
pub fn check_reason_codes(args: &ReasonCodesArgs, layout: &ContractLayout) -> Result<CheckOutcome> {
    let registry_path = args
        .registry
        .as_deref()
        .map(|p| resolve_path(p, layout.root()))
        .unwrap_or_else(|| layout.reason_codes_path());

    let registry = match ReasonCodeRegistry::load(&registry_path) {
        Ok(registry) => registry,
        Err(RegistryError::Duplicate { duplicates }) => {
            let subject = layout.relative_to_contracts(&registry_path);
            let mut report = Report::new(format!("Duplicate reason codes detected in {subject}"));
            report.extend(duplicates.into_iter().map(|code| {
                Finding::new(FindingKind::Referential, subject.clone(), format!("{code} is listed more than once"))
            }));
            return Ok(CheckOutcome::Fail(report));
        }
        Err(e) => return Err(e).context("failed to load reason code registry"),
    };

    let store = SchemaStore::discover(layout).context("failed to load contract schemas")?;
    let result = check_store(&store, &registry);
    tracing::info!(
        codes = registry.len(),
        constraints = result.constraints_checked,
        "reason codes checked"
    );

    let mut report = Report::new("Reason code violations");
    report.extend(result.into_findings());
    Ok(CheckOutcome::from_report(
        report,
        "Reason codes validated across schemas.",
    ))
}

/// Execute the reason-codes subcommand.
pub fn run_reason_codes(args: &ReasonCodesArgs, layout: &ContractLayout) -> Result<u8> {
    Ok(emit(&check_reason_codes(args, layout)?))
}
