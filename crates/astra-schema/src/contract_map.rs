//! Contract map completeness.
//!
//! `CONTRACT_MAP.md` is hand-written documentation. It must mention the
//! relative path of every schema and, for events, the bare event type as
//! well. Only substring containment is checked; tables, code spans, and
//! prose all count.

use std::fmt;

use astra_core::{Finding, FindingKind};

use crate::store::{SchemaId, SchemaStore};

/// A requirement the contract map does not meet.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum MissingEntry {
    /// The schema's relative path does not appear.
    SchemaPath { relative_path: String },
    /// The event type name does not appear.
    EventType {
        event_type: String,
        relative_path: String,
    },
}

impl MissingEntry {
    pub fn into_finding(self) -> Finding {
        let detail = match &self {
            Self::SchemaPath { .. } => "schema path not mentioned in contract map",
            Self::EventType { .. } => "event type not mentioned in contract map",
        };
        Finding::new(FindingKind::Completeness, self.to_string(), detail)
    }
}

impl fmt::Display for MissingEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SchemaPath { relative_path } => f.write_str(relative_path),
            Self::EventType {
                event_type,
                relative_path,
            } => write!(f, "{event_type} ({relative_path})"),
        }
    }
}

/// Every requirement `map_text` fails. Core-API schemas come first, then
/// events, each sorted; an event missing both its path and its name yields
/// two entries.
pub fn check_contract_map(map_text: &str, store: &SchemaStore) -> Vec<MissingEntry> {
    let mut core_api = Vec::new();
    let mut events = Vec::new();

    for schema in store.schemas() {
        let relative_path = schema.relative_path();
        let path_missing = !map_text.contains(&relative_path);
        match schema.id() {
            SchemaId::CoreApi { .. } => {
                if path_missing {
                    core_api.push(MissingEntry::SchemaPath { relative_path });
                }
            }
            SchemaId::Event(event_type) => {
                if path_missing {
                    events.push(MissingEntry::SchemaPath {
                        relative_path: relative_path.clone(),
                    });
                }
                if !map_text.contains(event_type.as_str()) {
                    events.push(MissingEntry::EventType {
                        event_type: event_type.clone(),
                        relative_path,
                    });
                }
            }
        }
    }

    tracing::debug!(
        schemas = store.len(),
        missing = core_api.len() + events.len(),
        "contract map checked"
    );
    core_api.extend(events);
    core_api
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Schema;
    use astra_core::Direction;
    use serde_json::json;

    fn store() -> SchemaStore {
        SchemaStore::from_schemas([
            Schema::new(SchemaId::core_api("execute_run", Direction::Request), json!({})),
            Schema::new(SchemaId::core_api("execute_run", Direction::Response), json!({})),
            Schema::new(SchemaId::event("run.created"), json!({})),
            Schema::new(SchemaId::event("run.completed"), json!({})),
        ])
    }

    const COMPLETE: &str = "\
| ExecuteRun | `core_api/execute_run.request.schema.json` | `core_api/execute_run.response.schema.json` |
| `run.created` | `events/run.created.schema.json` |
| `run.completed` | `events/run.completed.schema.json` |
";

    #[test]
    fn complete_map_has_no_missing_entries() {
        assert!(check_contract_map(COMPLETE, &store()).is_empty());
    }

    #[test]
    fn missing_schema_path_is_reported() {
        let map = COMPLETE.replace("`core_api/execute_run.response.schema.json` ", "");
        let missing = check_contract_map(&map, &store());
        assert_eq!(
            missing,
            vec![MissingEntry::SchemaPath {
                relative_path: "core_api/execute_run.response.schema.json".into()
            }]
        );
    }

    #[test]
    fn event_missing_path_and_name_yields_two_entries() {
        let map = COMPLETE.replace("| `run.completed` | `events/run.completed.schema.json` |\n", "");
        let missing = check_contract_map(&map, &store());
        assert_eq!(missing.len(), 2);
        assert_eq!(missing[0].to_string(), "events/run.completed.schema.json");
        assert_eq!(missing[1].to_string(), "run.completed (events/run.completed.schema.json)");
    }

    #[test]
    fn core_api_entries_precede_events() {
        let missing = check_contract_map("", &store());
        assert_eq!(missing.len(), 6);
        assert!(matches!(missing[0], MissingEntry::SchemaPath { ref relative_path } if relative_path.starts_with("core_api/")));
        assert!(matches!(missing[1], MissingEntry::SchemaPath { ref relative_path } if relative_path.starts_with("core_api/")));
        assert!(missing[2..].iter().all(|m| m.to_string().contains("events/")));
    }

    #[test]
    fn findings_are_completeness_kind() {
        let finding = MissingEntry::EventType {
            event_type: "run.blocked".into(),
            relative_path: "events/run.blocked.schema.json".into(),
        }
        .into_finding();
        assert_eq!(finding.kind, FindingKind::Completeness);
        assert_eq!(
            finding.to_string(),
            "run.blocked (events/run.blocked.schema.json): event type not mentioned in contract map"
        );
    }
}
