//! # All Subcommand
//!
//! Runs every check with default paths and prints each outcome in turn.
//! Unlike the fixture runner, a failing check does not stop the others;
//! a load error does.

use anyhow::Result;
use clap::Args;

use astra_core::ContractLayout;

use crate::contract_map::{check_contract_map_cmd, ContractMapArgs};
use crate::events::{check_events, EventsArgs};
use crate::lifecycle::{check_lifecycle, LifecycleArgs};
use crate::reason_codes::{check_reason_codes, ReasonCodesArgs};
use crate::snapshot::{check_snapshot, SnapshotArgs};
use crate::validate::{check_validate, ValidateArgs};
use crate::{CheckOutcome, EXIT_OK, EXIT_VIOLATIONS};

/// Arguments for the `astra all` subcommand.
#[derive(Args, Debug, Default)]
pub struct AllArgs {}

/// Every check in order, labelled by its subcommand name.
pub fn check_all(_args: &AllArgs, layout: &ContractLayout) -> Result<Vec<(&'static str, CheckOutcome)>> {
    Ok(vec![
        ("validate", check_validate(&ValidateArgs::default(), layout)?),
        ("reason-codes", check_reason_codes(&ReasonCodesArgs::default(), layout)?),
        ("lifecycle", check_lifecycle(&LifecycleArgs::default(), layout)?),
        ("snapshot", check_snapshot(&SnapshotArgs::default(), layout)?),
        ("contract-map", check_contract_map_cmd(&ContractMapArgs::default(), layout)?),
        ("events", check_events(&EventsArgs::default(), layout)?),
    ])
}

/// Execute the all subcommand.
pub fn run_all(args: &AllArgs, layout: &ContractLayout) -> Result<u8> {
    let outcomes = check_all(args, layout)?;
    let failed: Vec<&str> = outcomes
        .iter()
        .filter(|(_, outcome)| outcome.is_failure())
        .map(|(name, _)| *name)
        .collect();

    for (_, outcome) in &outcomes {
        println!("{outcome}");
    }

    if failed.is_empty() {
        println!("All {} contract checks passed.", outcomes.len());
        Ok(EXIT_OK)
    } else {
        println!("{} of {} checks failed: {}", failed.len(), outcomes.len(), failed.join(", "));
        Ok(EXIT_VIOLATIONS)
    }
}
