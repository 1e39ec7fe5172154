//! # astra-schema — Contract Schemas and Cross-Checks
//!
//! Loads the contract schemas and runs every check that reads them.
//!
//! ## Schema Store (`store`)
//!
//! [`SchemaStore::discover`] loads every `*.schema.json` in the `core_api`
//! and `events` families once per run. Core-API schemas are named
//! `<operation>.<request|response>`; event schemas are named by event type.
//!
//! ## Structural Validation (`validate`)
//!
//! [`StructuralValidator`] wraps the `jsonschema` crate with Draft-07
//! semantics. All violations are collected (never fail-fast) and returned
//! sorted by instance path.
//!
//! ## Reason Codes (`reason_codes`)
//!
//! [`ReasonCodeRegistry`] is the closed vocabulary; [`check_store`] walks
//! every schema for `reason_code` enumerations and reports empty ones and
//! values outside the registry.
//!
//! ## Contract Map (`contract_map`)
//!
//! [`check_contract_map`] verifies `CONTRACT_MAP.md` mentions every schema
//! path and event type. It is a substring check on purpose: the map is
//! free-form documentation.
//!
//! ## Crate Policy
//!
//! - Depends only on `astra-core` internally.
//! - Validation never touches the network; external `$ref`s are refused.

pub mod contract_map;
pub mod reason_codes;
pub mod store;
pub mod validate;

pub use contract_map::{check_contract_map, MissingEntry};
pub use reason_codes::{
    check_schema, check_store, find_constraints, ConstraintLocation, ReasonCodeConstraint,
    ReasonCodeRegistry, ReasonCodeReport, RegistryError,
};
pub use store::{Schema, SchemaFamily, SchemaId, SchemaStore};
pub use validate::{InstancePath, PathSegment, SchemaError, StructuralValidator, Violation};
