//! # Schema Store
//!
//! Pure lookup over the contract schemas. Two families live side by side:
//!
//! - `core_api/<operation>.<request|response>.schema.json`
//! - `events/<event.type>.schema.json`
//!
//! A schema's identity is derived from its file name by stripping the
//! `.schema.json` suffix. [`SchemaStore::discover`] reads both families once
//! and is the run's cache; [`SchemaStore::load`] reads a single schema on
//! demand.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use astra_core::document::read_json;
use astra_core::layout::{CORE_API_DIR, EVENTS_DIR, SCHEMA_SUFFIX};
use astra_core::{ContractLayout, Direction, LoadError};
use serde_json::Value;

/// Which directory a schema belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SchemaFamily {
    CoreApi,
    Events,
}

impl SchemaFamily {
    pub const ALL: [SchemaFamily; 2] = [SchemaFamily::CoreApi, SchemaFamily::Events];

    /// Directory name under the contracts directory.
    pub fn dir_name(self) -> &'static str {
        match self {
            Self::CoreApi => CORE_API_DIR,
            Self::Events => EVENTS_DIR,
        }
    }

    fn dir(self, layout: &ContractLayout) -> PathBuf {
        match self {
            Self::CoreApi => layout.core_api_dir(),
            Self::Events => layout.events_dir(),
        }
    }
}

/// Stable identity of a schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SchemaId {
    /// One half of a core-API operation.
    CoreApi {
        operation: String,
        direction: Direction,
    },
    /// A lifecycle event, named by its `event_type`.
    Event(String),
}

impl SchemaId {
    pub fn core_api(operation: impl Into<String>, direction: Direction) -> Self {
        Self::CoreApi {
            operation: operation.into(),
            direction,
        }
    }

    pub fn event(event_type: impl Into<String>) -> Self {
        Self::Event(event_type.into())
    }

    /// Parse the name part of a schema file (file name minus suffix).
    ///
    /// Core-API names must end in `.request` or `.response`.
    pub fn parse(family: SchemaFamily, name: &str) -> Option<Self> {
        match family {
            SchemaFamily::CoreApi => {
                let (operation, direction) = name.rsplit_once('.')?;
                let direction = Direction::ALL
                    .into_iter()
                    .find(|d| d.as_str() == direction)?;
                if operation.is_empty() {
                    return None;
                }
                Some(Self::core_api(operation, direction))
            }
            SchemaFamily::Events => (!name.is_empty()).then(|| Self::event(name)),
        }
    }

    pub fn family(&self) -> SchemaFamily {
        match self {
            Self::CoreApi { .. } => SchemaFamily::CoreApi,
            Self::Event(_) => SchemaFamily::Events,
        }
    }

    /// `<operation>.<direction>` or the event type.
    pub fn name(&self) -> String {
        match self {
            Self::CoreApi {
                operation,
                direction,
            } => format!("{operation}.{direction}"),
            Self::Event(event_type) => event_type.clone(),
        }
    }

    /// Schema file name.
    pub fn file_name(&self) -> String {
        format!("{}{SCHEMA_SUFFIX}", self.name())
    }

    /// Path relative to the contracts directory, `/`-separated.
    pub fn relative_path(&self) -> String {
        format!("{}/{}", self.family().dir_name(), self.file_name())
    }
}

impl fmt::Display for SchemaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// A loaded schema document. Immutable once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    id: SchemaId,
    document: Value,
}

impl Schema {
    pub fn new(id: SchemaId, document: Value) -> Self {
        Self { id, document }
    }

    pub fn id(&self) -> &SchemaId {
        &self.id
    }

    /// Path relative to the contracts directory (e.g.
    /// `events/run.created.schema.json`).
    pub fn relative_path(&self) -> String {
        self.id.relative_path()
    }

    pub fn document(&self) -> &Value {
        &self.document
    }
}

/// Every schema of one run, keyed by identity.
#[derive(Debug, Clone, Default)]
pub struct SchemaStore {
    schemas: BTreeMap<SchemaId, Schema>,
}

impl SchemaStore {
    /// Load every `*.schema.json` of both families.
    ///
    /// # Errors
    ///
    /// [`LoadError::NotFound`] if a family directory is missing,
    /// [`LoadError::Malformed`] if a schema is not a JSON object.
    ///
    /// Core-API files without a `.request`/`.response` direction (shared
    /// definitions) are skipped with a warning.
    pub fn discover(layout: &ContractLayout) -> Result<Self, LoadError> {
        let mut schemas = BTreeMap::new();
        for family in SchemaFamily::ALL {
            for path in schema_files(&family.dir(layout))? {
                let Some(id) = schema_id(family, &path) else {
                    tracing::warn!(
                        path = %path.display(),
                        "skipping core-API schema without a request/response direction"
                    );
                    continue;
                };
                let schema = read_schema(id, &path)?;
                schemas.insert(schema.id.clone(), schema);
            }
        }
        tracing::debug!(count = schemas.len(), "loaded schema store");
        Ok(Self { schemas })
    }

    /// Load one schema by identity.
    ///
    /// # Errors
    ///
    /// [`LoadError::NotFound`] if no document exists at the expected path,
    /// [`LoadError::Malformed`] if it is not a JSON object.
    pub fn load(layout: &ContractLayout, id: &SchemaId) -> Result<Schema, LoadError> {
        read_schema(id.clone(), &id.family().dir(layout).join(id.file_name()))
    }

    /// Build a store from already-loaded schemas.
    pub fn from_schemas(schemas: impl IntoIterator<Item = Schema>) -> Self {
        Self {
            schemas: schemas.into_iter().map(|s| (s.id.clone(), s)).collect(),
        }
    }

    pub fn get(&self, id: &SchemaId) -> Option<&Schema> {
        self.schemas.get(id)
    }

    /// The schema for one half of a core-API operation.
    ///
    /// # Errors
    ///
    /// [`LoadError::NotFound`] naming the expected file when the store has
    /// no such schema.
    pub fn core_api(&self, operation: &str, direction: Direction) -> Result<&Schema, LoadError> {
        let id = SchemaId::core_api(operation, direction);
        self.schemas.get(&id).ok_or_else(|| LoadError::NotFound {
            path: PathBuf::from(id.relative_path()),
        })
    }

    /// The schema for an event type, if one exists.
    pub fn event(&self, event_type: &str) -> Option<&Schema> {
        self.schemas.get(&SchemaId::event(event_type))
    }

    /// Every event schema with its event type, sorted by event type.
    pub fn events(&self) -> impl Iterator<Item = (&str, &Schema)> {
        self.schemas.iter().filter_map(|(id, schema)| match id {
            SchemaId::Event(event_type) => Some((event_type.as_str(), schema)),
            SchemaId::CoreApi { .. } => None,
        })
    }

    /// Every schema, sorted by relative path.
    pub fn schemas(&self) -> Vec<&Schema> {
        let mut all: Vec<&Schema> = self.schemas.values().collect();
        all.sort_by_key(|s| s.relative_path());
        all
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

/// `*.schema.json` files in `dir`, sorted.
fn schema_files(dir: &Path) -> Result<Vec<PathBuf>, LoadError> {
    let entries = std::fs::read_dir(dir).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => LoadError::NotFound {
            path: dir.to_path_buf(),
        },
        _ => LoadError::Io {
            path: dir.to_path_buf(),
            source: e,
        },
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|e| LoadError::Io {
                path: dir.to_path_buf(),
                source: e,
            })?
            .path();
        let is_schema = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(SCHEMA_SUFFIX));
        if is_schema && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Identity from a file name, or `None` if the name carries none.
fn schema_id(family: SchemaFamily, path: &Path) -> Option<SchemaId> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .and_then(|n| n.strip_suffix(SCHEMA_SUFFIX))?;
    SchemaId::parse(family, name)
}

fn read_schema(id: SchemaId, path: &Path) -> Result<Schema, LoadError> {
    let document = read_json(path)?;
    if !document.is_object() {
        return Err(LoadError::malformed(path, "schema root must be a JSON object"));
    }
    tracing::trace!(schema = %id, "loaded schema");
    Ok(Schema::new(id, document))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn write(path: &Path, content: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    fn scratch_layout() -> (tempfile::TempDir, ContractLayout) {
        let dir = tempfile::tempdir().unwrap();
        let layout = ContractLayout::from_root(dir.path());
        write(
            &layout.core_api_dir().join("execute_run.request.schema.json"),
            r#"{"type": "object"}"#,
        );
        write(
            &layout.core_api_dir().join("execute_run.response.schema.json"),
            r#"{"type": "object"}"#,
        );
        write(
            &layout.events_dir().join("run.created.schema.json"),
            r#"{"type": "object"}"#,
        );
        write(&layout.events_dir().join("README.md"), "not a schema");
        (dir, layout)
    }

    #[test]
    fn discover_loads_both_families() {
        let (_dir, layout) = scratch_layout();
        let store = SchemaStore::discover(&layout).unwrap();
        assert_eq!(store.len(), 3);
        assert!(store.core_api("execute_run", Direction::Request).is_ok());
        assert!(store.event("run.created").is_some());
        let events: Vec<&str> = store.events().map(|(t, _)| t).collect();
        assert_eq!(events, vec!["run.created"]);
    }

    #[test]
    fn schemas_are_sorted_by_relative_path() {
        let (_dir, layout) = scratch_layout();
        let store = SchemaStore::discover(&layout).unwrap();
        let paths: Vec<String> = store.schemas().iter().map(|s| s.relative_path()).collect();
        assert_eq!(
            paths,
            vec![
                "core_api/execute_run.request.schema.json",
                "core_api/execute_run.response.schema.json",
                "events/run.created.schema.json",
            ]
        );
    }

    #[test]
    fn load_missing_schema_is_not_found() {
        let (_dir, layout) = scratch_layout();
        let err = SchemaStore::load(&layout, &SchemaId::event("run.blocked")).unwrap_err();
        assert!(matches!(err, LoadError::NotFound { .. }), "got: {err}");
    }

    #[test]
    fn load_malformed_schema_is_malformed() {
        let (_dir, layout) = scratch_layout();
        write(&layout.events_dir().join("run.failed.schema.json"), "{ not json");
        let err = SchemaStore::load(&layout, &SchemaId::event("run.failed")).unwrap_err();
        assert!(matches!(err, LoadError::Malformed { .. }), "got: {err}");
        // The same file aborts discovery.
        assert!(SchemaStore::discover(&layout).is_err());
    }

    #[test]
    fn non_object_schema_is_malformed() {
        let (_dir, layout) = scratch_layout();
        write(&layout.events_dir().join("run.started.schema.json"), "[]");
        let err = SchemaStore::load(&layout, &SchemaId::event("run.started")).unwrap_err();
        assert!(err.to_string().contains("JSON object"));
    }

    #[test]
    fn core_api_name_requires_direction() {
        assert_eq!(
            SchemaId::parse(SchemaFamily::CoreApi, "evaluate_policy.response"),
            Some(SchemaId::core_api("evaluate_policy", Direction::Response))
        );
        assert_eq!(SchemaId::parse(SchemaFamily::CoreApi, "evaluate_policy"), None);
        assert_eq!(SchemaId::parse(SchemaFamily::CoreApi, "evaluate_policy.reply"), None);
        assert_eq!(
            SchemaId::parse(SchemaFamily::Events, "run.paused.awaiting_approval"),
            Some(SchemaId::event("run.paused.awaiting_approval"))
        );
    }

    #[test]
    fn discover_skips_core_api_files_without_direction() {
        let (_dir, layout) = scratch_layout();
        write(
            &layout.core_api_dir().join("common.schema.json"),
            r#"{"definitions": {}}"#,
        );
        let store = SchemaStore::discover(&layout).unwrap();
        assert_eq!(store.len(), 3);
        let paths: Vec<String> = store.schemas().iter().map(|s| s.relative_path()).collect();
        assert!(!paths.iter().any(|p| p.contains("common")), "{paths:?}");
    }

    #[test]
    fn missing_family_directory_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ContractLayout::from_root(dir.path());
        let err = SchemaStore::discover(&layout).unwrap_err();
        assert!(matches!(err, LoadError::NotFound { .. }));
    }

    #[test]
    fn core_api_lookup_names_expected_file() {
        let store = SchemaStore::from_schemas([Schema::new(
            SchemaId::event("run.created"),
            json!({}),
        )]);
        let err = store.core_api("evaluate_policy", Direction::Request).unwrap_err();
        assert!(err
            .to_string()
            .contains("core_api/evaluate_policy.request.schema.json"));
    }
}
