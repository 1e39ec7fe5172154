//! # astra-conformance — Composed Contract Checks
//!
//! Composes the per-document checks of `astra-core` and `astra-schema` into
//! whole-repository runs.
//!
//! - [`CheckContext`] loads the schema store and reason code registry once
//!   and is passed by reference to every check.
//! - [`validate_event_log`] validates any recorded event log against the
//!   event schemas.
//! - [`FixtureRunner`] proves the shipped fixtures conform, category by
//!   category, stopping at the first failing category.

pub mod context;
pub mod events;
pub mod runner;

pub use context::{CheckContext, ConformanceError};
pub use events::validate_event_log;
pub use runner::{Category, FixtureRunner, LifecycleFixture, RunOutcome, RUNNER_TITLE};
