//! Per-run cache of loaded contracts.

use thiserror::Error;

use astra_core::{ContractLayout, LoadError};
use astra_schema::{ReasonCodeRegistry, RegistryError, SchemaError, SchemaStore};

/// Fatal error of a composed check.
#[derive(Error, Debug)]
pub enum ConformanceError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Everything a check reads that is shared across documents: the layout,
/// every schema, and the reason code registry. Loaded once per run.
#[derive(Debug, Clone)]
pub struct CheckContext {
    layout: ContractLayout,
    store: SchemaStore,
    registry: ReasonCodeRegistry,
}

impl CheckContext {
    /// Load the schema store and registry described by `layout`.
    ///
    /// # Errors
    ///
    /// Any schema or registry that is missing or malformed, or a registry
    /// with duplicate codes.
    pub fn load(layout: ContractLayout) -> Result<Self, ConformanceError> {
        let store = SchemaStore::discover(&layout)?;
        let registry = ReasonCodeRegistry::load(&layout.reason_codes_path())?;
        tracing::info!(
            schemas = store.len(),
            reason_codes = registry.len(),
            contracts = %layout.contracts_dir().display(),
            "loaded contracts"
        );
        Ok(Self::from_parts(layout, store, registry))
    }

    pub fn from_parts(layout: ContractLayout, store: SchemaStore, registry: ReasonCodeRegistry) -> Self {
        Self {
            layout,
            store,
            registry,
        }
    }

    pub fn layout(&self) -> &ContractLayout {
        &self.layout
    }

    pub fn store(&self) -> &SchemaStore {
        &self.store
    }

    pub fn registry(&self) -> &ReasonCodeRegistry {
        &self.registry
    }
}
