//! # Contract Layout
//!
//! Every path the checker reads, derived from one repository root. Commands
//! override individual paths; everything else falls back to the fixed
//! project-relative layout:
//!
//! ```text
//! <root>/contracts/
//!   core_api/<operation>.<request|response>.schema.json
//!   events/<event.type>.schema.json
//!   reason_codes.json
//!   fixtures/<operation>.<request|response>.json
//!   fixtures/lifecycle*.ndjson
//!   CONTRACT_MAP.md
//! <root>/.astraai/local/events.ndjson
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

/// Directory under the root holding every contract document.
pub const CONTRACTS_DIR: &str = "contracts";
/// Core-API schema family directory, relative to the contracts directory.
pub const CORE_API_DIR: &str = "core_api";
/// Event schema family directory, relative to the contracts directory.
pub const EVENTS_DIR: &str = "events";
/// Fixture directory, relative to the contracts directory.
pub const FIXTURES_DIR: &str = "fixtures";
/// Reason code registry file name.
pub const REASON_CODES_FILE: &str = "reason_codes.json";
/// Contract map file name.
pub const CONTRACT_MAP_FILE: &str = "CONTRACT_MAP.md";
/// Suffix shared by every schema file.
pub const SCHEMA_SUFFIX: &str = ".schema.json";
/// Recorded local event log, relative to the root.
pub const LOCAL_EVENTS_PATH: &str = ".astraai/local/events.ndjson";

/// Core-API operations, in the order the orchestrator calls them.
pub const CORE_API_OPERATIONS: [&str; 3] = ["evaluate_policy", "issue_approval_token", "execute_run"];

/// Request or response half of a core-API operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    /// Payload sent to the core.
    Request,
    /// Payload returned by the core.
    Response,
}

impl Direction {
    /// Both directions, request first.
    pub const ALL: [Direction; 2] = [Direction::Request, Direction::Response];

    /// Name used in schema and fixture file names.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Request => "request",
            Self::Response => "response",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved paths for one checker run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractLayout {
    root: PathBuf,
    contracts_dir: PathBuf,
    contract_map: Option<PathBuf>,
    reason_codes: Option<PathBuf>,
    local_events: Option<PathBuf>,
}

impl ContractLayout {
    /// Default layout under `root`.
    pub fn from_root(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let contracts_dir = root.join(CONTRACTS_DIR);
        Self {
            root,
            contracts_dir,
            contract_map: None,
            reason_codes: None,
            local_events: None,
        }
    }

    /// Walk up from `start` to the first directory that contains
    /// `contracts/reason_codes.json`.
    pub fn discover_root(start: &Path) -> Option<PathBuf> {
        let mut dir = start;
        loop {
            if dir.join(CONTRACTS_DIR).join(REASON_CODES_FILE).is_file() {
                return Some(dir.to_path_buf());
            }
            dir = dir.parent()?;
        }
    }

    /// Override the contracts directory. Schema, fixture, registry and map
    /// paths follow it unless overridden themselves.
    pub fn with_contracts_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.contracts_dir = dir.into();
        self
    }

    /// Override the contract map document.
    pub fn with_contract_map(mut self, path: impl Into<PathBuf>) -> Self {
        self.contract_map = Some(path.into());
        self
    }

    /// Override the reason code registry document.
    pub fn with_reason_codes(mut self, path: impl Into<PathBuf>) -> Self {
        self.reason_codes = Some(path.into());
        self
    }

    /// Override the recorded local event log.
    pub fn with_local_events(mut self, path: impl Into<PathBuf>) -> Self {
        self.local_events = Some(path.into());
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn contracts_dir(&self) -> &Path {
        &self.contracts_dir
    }

    pub fn core_api_dir(&self) -> PathBuf {
        self.contracts_dir.join(CORE_API_DIR)
    }

    pub fn events_dir(&self) -> PathBuf {
        self.contracts_dir.join(EVENTS_DIR)
    }

    pub fn fixtures_dir(&self) -> PathBuf {
        self.contracts_dir.join(FIXTURES_DIR)
    }

    pub fn reason_codes_path(&self) -> PathBuf {
        self.reason_codes
            .clone()
            .unwrap_or_else(|| self.contracts_dir.join(REASON_CODES_FILE))
    }

    pub fn contract_map_path(&self) -> PathBuf {
        self.contract_map
            .clone()
            .unwrap_or_else(|| self.contracts_dir.join(CONTRACT_MAP_FILE))
    }

    pub fn local_events_path(&self) -> PathBuf {
        self.local_events
            .clone()
            .unwrap_or_else(|| self.root.join(LOCAL_EVENTS_PATH))
    }

    /// Path of a fixture file by name (e.g. `lifecycle.ndjson`).
    pub fn fixture_path(&self, name: &str) -> PathBuf {
        self.fixtures_dir().join(name)
    }

    /// Fixture file for one half of a core-API operation.
    pub fn core_api_fixture(&self, operation: &str, direction: Direction) -> PathBuf {
        self.fixture_path(&format!("{operation}.{direction}.json"))
    }

    /// `path` relative to the contracts directory, `/`-separated. Paths
    /// outside the contracts directory are rendered as given.
    pub fn relative_to_contracts(&self, path: &Path) -> String {
        let Ok(relative) = path.strip_prefix(&self.contracts_dir) else {
            return path.display().to_string();
        };
        relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}
