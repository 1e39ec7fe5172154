//! # astra-core — Foundational Types for the Contract Checker
//!
//! Leaf crate of the workspace. Every other `astra-*` crate depends on it;
//! it depends on nothing internal.
//!
//! ## Contents
//!
//! - [`error`] — `LoadError`, the single fatal error class. A missing or
//!   malformed document is a broken environment, not a finding.
//! - [`document`] — reading text and JSON documents into memory.
//! - [`layout`] — `ContractLayout`, the project-relative path configuration
//!   shared by every check.
//! - [`event`] — newline-delimited event logs (`EventLog`, `EventRecord`).
//! - [`lifecycle`] — the run lifecycle vocabulary, its canonical paths, and
//!   the exact-sequence checker.
//! - [`snapshot`] — the policy snapshot hash continuity checker.
//! - [`report`] — `Finding` and `Report`, the non-fatal result taxonomy.
//!
//! ## Crate Policy
//!
//! - Every check is a pure function of already-loaded documents.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - Findings are produced in a deterministic order so repeated runs over
//!   unchanged input render byte-identical output.

pub mod document;
pub mod error;
pub mod event;
pub mod layout;
pub mod lifecycle;
pub mod report;
pub mod snapshot;

pub use error::LoadError;
pub use event::{EventLog, EventRecord};
pub use layout::{ContractLayout, Direction, CORE_API_OPERATIONS};
pub use lifecycle::{check_sequence, LifecycleEvent, LifecyclePath, SequenceOutcome};
pub use report::{Finding, FindingKind, Report};
pub use snapshot::{check_continuity, ContinuityOutcome, SNAPSHOT_HASH_FIELD};
