//! # Contract Map Subcommand

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use astra_core::document::read_text;
use astra_core::{ContractLayout, Report};
use astra_schema::{check_contract_map, SchemaStore};

use crate::{emit, resolve_path, CheckOutcome};

/// Arguments for the `astra contract-map` subcommand.
#[derive(Args, Debug, Default)]
pub struct ContractMapArgs {
    /// Contract map document (default: contracts/CONTRACT_MAP.md).
    #[arg(long, value_name = "PATH")]
    pub map: Option<PathBuf>,
}

/// Check that the map mentions every schema and event type.
pub fn check_contract_map_cmd(args: &ContractMapArgs, layout: &ContractLayout) -> Result<CheckOutcome> {
    let map_path = args
        .map
        .as_deref()
        .map(|p| resolve_path(p, layout.root()))
        .unwrap_or_else(|| layout.contract_map_path());
    let map_text = read_text(&map_path).context("failed to read contract map")?;
    let store = SchemaStore::discover(layout).context("failed to load contract schemas")?;

    let missing = check_contract_map(&map_text, &store);
    tracing::info!(schemas = store.len(), missing = missing.len(), "contract map checked");

    let name = map_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| map_path.display().to_string());
    let mut report = Report::new(format!("Missing entries in {name}"));
    report.extend(missing.into_iter().map(|m| m.into_finding()));
    Ok(CheckOutcome::from_report(
        report,
        format!("{name} contains all schema entries."),
    ))
}

/// Execute the contract-map subcommand.
pub fn run_contract_map(args: &ContractMapArgs, layout: &ContractLayout) -> Result<u8> {
    Ok(emit(&check_contract_map_cmd(args, layout)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{scratch, shipped};

    #[test]
    fn shipped_map_is_complete() {
        let outcome = check_contract_map_cmd(&ContractMapArgs::default(), &shipped()).unwrap();
        assert_eq!(outcome, CheckOutcome::Pass("CONTRACT_MAP.md contains all schema entries.".into()));
    }

    #[test]
    fn unmapped_event_schema_is_reported() {
        let (_dir, layout) = scratch();
        std::fs::write(
            layout.events_dir().join("run.cancelled.schema.json"),
            r#"{"type": "object"}"#,
        )
        .unwrap();
        let outcome = check_contract_map_cmd(&ContractMapArgs::default(), &layout).unwrap();
        assert_eq!(
            outcome.to_string(),
            "Missing entries in CONTRACT_MAP.md:\n\
             - events/run.cancelled.schema.json: schema path not mentioned in contract map\n\
             - run.cancelled (events/run.cancelled.schema.json): event type not mentioned in contract map"
        );
    }

    #[test]
    fn missing_map_is_an_error() {
        let (_dir, layout) = scratch();
        std::fs::remove_file(layout.contract_map_path()).unwrap();
        assert!(check_contract_map_cmd(&ContractMapArgs::default(), &layout).is_err());
    }
}
