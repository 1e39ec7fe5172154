//! # astra-cli — Contract Conformance Checks
//!
//! Provides the `astra` command-line interface. Each subcommand runs one
//! check and is usable on its own in CI; `astra all` runs every check.
//!
//! ```bash
//! astra validate
//! astra reason-codes
//! astra lifecycle --log runs/run_42.ndjson --path failed
//! astra snapshot --field policy_snapshot_hash
//! astra contract-map
//! astra events
//! astra all
//! ```
//!
//! ## Output and Exit Status
//!
//! A passing check prints one line and exits 0. A failing check prints a
//! header line followed by one `- ` line per finding and exits 1. A
//! missing or malformed document is an operational error: it is logged and
//! the process exits 2. Logs go to stderr so stdout carries only results.

pub mod all;
pub mod contract_map;
pub mod events;
pub mod lifecycle;
pub mod reason_codes;
pub mod snapshot;
pub mod validate;

use std::fmt;
use std::path::{Path, PathBuf};

use astra_core::Report;

/// Every check passed (or was skipped).
pub const EXIT_OK: u8 = 0;
/// At least one check reported findings.
pub const EXIT_VIOLATIONS: u8 = 1;
/// A document could not be loaded.
pub const EXIT_ERROR: u8 = 2;

/// Result of one check, ready to print.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// Conformant; carries the success line.
    Pass(String),
    /// Findings to report.
    Fail(Report),
    /// Nothing to check; carries the reason.
    Skipped(String),
}

impl CheckOutcome {
    /// `Pass(success)` for a clean report, `Fail(report)` otherwise.
    pub fn from_report(report: Report, success: impl Into<String>) -> Self {
        if report.is_clean() {
            Self::Pass(success.into())
        } else {
            Self::Fail(report)
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Pass(_) | Self::Skipped(_) => EXIT_OK,
            Self::Fail(_) => EXIT_VIOLATIONS,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Fail(_))
    }
}

impl fmt::Display for CheckOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pass(line) | Self::Skipped(line) => f.write_str(line),
            Self::Fail(report) => write!(f, "{report}"),
        }
    }
}

/// Print an outcome to stdout and return its exit code.
pub fn emit(outcome: &CheckOutcome) -> u8 {
    println!("{outcome}");
    outcome.exit_code()
}

/// Resolve a path that may be relative to the repository root.
///
/// Absolute paths are returned as-is. A relative path that exists under
/// `repo_root` resolves there; otherwise it stays relative to the current
/// directory.
pub fn resolve_path(path: &Path, repo_root: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    let repo_relative = repo_root.join(path);
    if repo_relative.exists() {
        repo_relative
    } else {
        path.to_path_buf()
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use astra_core::{Finding, FindingKind};

    #[test]
    fn outcome_exit_codes() {
        assert_eq!(CheckOutcome::Pass("ok".into()).exit_code(), EXIT_OK);
        assert_eq!(CheckOutcome::Skipped("none".into()).exit_code(), EXIT_OK);
        let mut report = Report::new("Missing entries in CONTRACT_MAP.md");
        report.push(Finding::new(FindingKind::Completeness, "events/run.blocked.schema.json", "x"));
        let outcome = CheckOutcome::from_report(report, "unused");
        assert_eq!(outcome.exit_code(), EXIT_VIOLATIONS);
        assert_eq!(
            outcome.to_string(),
            "Missing entries in CONTRACT_MAP.md:\n- events/run.blocked.schema.json: x"
        );
    }

    #[test]
    fn clean_report_passes() {
        let outcome = CheckOutcome::from_report(Report::new("t"), "All good.");
        assert_eq!(outcome, CheckOutcome::Pass("All good.".into()));
    }

    #[test]
    fn resolve_path_prefers_repo_relative() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("log.ndjson"), "").unwrap();
        assert_eq!(
            resolve_path(Path::new("log.ndjson"), dir.path()),
            dir.path().join("log.ndjson")
        );
        assert_eq!(
            resolve_path(Path::new("absent.ndjson"), dir.path()),
            PathBuf::from("absent.ndjson")
        );
        let absolute = dir.path().join("elsewhere");
        assert_eq!(resolve_path(&absolute, Path::new("/unused")), absolute);
    }
}
