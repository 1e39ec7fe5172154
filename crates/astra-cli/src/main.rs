//! # astra CLI entry point
//!
//! Parses command-line arguments, resolves the contract layout, and
//! dispatches to subcommand handlers.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use astra_cli::all::{run_all, AllArgs};
use astra_cli::contract_map::{run_contract_map, ContractMapArgs};
use astra_cli::events::{run_events, EventsArgs};
use astra_cli::lifecycle::{run_lifecycle, LifecycleArgs};
use astra_cli::reason_codes::{run_reason_codes, ReasonCodesArgs};
use astra_cli::snapshot::{run_snapshot, SnapshotArgs};
use astra_cli::validate::{run_validate, ValidateArgs};
use astra_cli::{resolve_path, EXIT_ERROR};
use astra_core::ContractLayout;

/// Contract conformance checks for the Astra run lifecycle.
///
/// Verifies that the core API and lifecycle event schemas, the reason code
/// registry, the contract map, and the shipped fixtures agree.
#[derive(Parser, Debug)]
#[command(name = "astra", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Repository root (default: nearest ancestor containing contracts/reason_codes.json).
    #[arg(long, global = true, value_name = "DIR")]
    root: Option<PathBuf>,

    /// Contracts directory, relative to the root (default: contracts).
    #[arg(long, global = true, value_name = "DIR")]
    contracts_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the fixture conformance runner over every shipped fixture.
    Validate(ValidateArgs),

    /// Check the reason code registry and every reason_code enumeration.
    ReasonCodes(ReasonCodesArgs),

    /// Check that event logs follow a canonical lifecycle path.
    Lifecycle(LifecycleArgs),

    /// Check that the policy snapshot hash is constant within each log.
    Snapshot(SnapshotArgs),

    /// Check that CONTRACT_MAP.md mentions every schema and event type.
    ContractMap(ContractMapArgs),

    /// Validate the local recorded event log, if there is one.
    Events(EventsArgs),

    /// Run every check.
    All(AllArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter(cli.verbose))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let layout = layout(&cli);
    tracing::debug!(
        root = %layout.root().display(),
        contracts = %layout.contracts_dir().display(),
        "resolved contract layout"
    );

    let result = match &cli.command {
        Commands::Validate(args) => run_validate(args, &layout),
        Commands::ReasonCodes(args) => run_reason_codes(args, &layout),
        Commands::Lifecycle(args) => run_lifecycle(args, &layout),
        Commands::Snapshot(args) => run_snapshot(args, &layout),
        Commands::ContractMap(args) => run_contract_map(args, &layout),
        Commands::Events(args) => run_events(args, &layout),
        Commands::All(args) => run_all(args, &layout),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// Log filter for a `-v` count.
fn env_filter(verbose: u8) -> EnvFilter {
    match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    }
}

/// Build the layout from `--root` and `--contracts-dir`.
fn layout(cli: &Cli) -> ContractLayout {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let root = match &cli.root {
        Some(root) => resolve_path(root, &cwd),
        None => resolve_repo_root(&cwd),
    };
    let layout = ContractLayout::from_root(&root);
    match &cli.contracts_dir {
        Some(dir) => layout.with_contracts_dir(resolve_path(dir, &root)),
        None => layout,
    }
}

/// Walk up from `cwd` to the repository root, falling back to `cwd`.
fn resolve_repo_root(cwd: &Path) -> PathBuf {
    ContractLayout::discover_root(cwd).unwrap_or_else(|| {
        tracing::warn!("Could not locate repository root; using current directory");
        cwd.to_path_buf()
    })
}
