//! Storage ports and the ranked backend.
//!
//! Two ports back persistence: a required key-value [`StoragePort`] and an
//! optional, preferred [`DatasetStore`]. [`Backend`] ranks them explicitly —
//! dataset operations go through the store when one is wired and a context
//! id is known, otherwise they fall back to whole-dataset key-value storage.
//! Settings always live in key-value storage. Adapters must hand back values
//! independent of their internal state (deep copies), so callers can never
//! alias stored data.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::error::{Result, TableViewError};
use crate::types::{Dataset, Record, Settings};

/// Key under which the fallback whole-dataset document is stored.
pub const DATASET_KEY: &str = "tableview:dataset";
/// Key under which user settings are stored.
pub const SETTINGS_KEY: &str = "tableview:settings";

/// Required key-value storage port.
///
/// `get`/`set`/`del` are mandatory (the trait makes missing methods a
/// compile-time error rather than a call-time one); `list` is an optional
/// capability with an `Unsupported` default.
pub trait StoragePort {
    fn get(&self, key: &str) -> Result<Option<Value>>;
    fn set(&mut self, key: &str, value: Value) -> Result<()>;
    fn del(&mut self, key: &str) -> Result<()>;

    /// Enumerate entries under a key prefix, when the adapter supports it.
    fn list(&self, _prefix: &str) -> Result<Vec<(String, Value)>> {
        Err(TableViewError::Unsupported("list"))
    }
}

/// How `upsert_records` treats existing records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertMode {
    /// Replace the context's records wholesale (the engine owns ordering).
    Replace,
    /// Append to the existing records.
    Append,
}

/// Optional dataset store port, preferred over raw key-value storage.
pub trait DatasetStore {
    fn get_dataset(&self, context_id: &str) -> Result<Dataset>;
    fn upsert_records(&mut self, context_id: &str, records: &[Record], mode: UpsertMode)
        -> Result<()>;
}

/// In-memory key-value adapter (tests, CLI, single-process hosts).
#[derive(Debug, Default)]
pub struct MemoryStorage {
    db: BTreeMap<String, Value>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StoragePort for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        // Clone = deep copy: callers never alias stored values.
        Ok(self.db.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: Value) -> Result<()> {
        self.db.insert(key.to_string(), value);
        Ok(())
    }

    fn del(&mut self, key: &str) -> Result<()> {
        self.db.remove(key);
        Ok(())
    }

    fn list(&self, prefix: &str) -> Result<Vec<(String, Value)>> {
        Ok(self
            .db
            .range(prefix.to_string()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }
}

/// The ranked persistence backend for one host wiring.
///
/// Failed calls propagate without mutating anything in memory: the caller's
/// prior Settings/Dataset state stays the source of truth (no partial
/// commit).
pub struct Backend {
    storage: Box<dyn StoragePort>,
    dataset_store: Option<Box<dyn DatasetStore>>,
    dataset_key: String,
    settings_key: String,
}

impl Backend {
    /// Wire a backend over the required key-value port.
    pub fn new(storage: Box<dyn StoragePort>) -> Self {
        Self {
            storage,
            dataset_store: None,
            dataset_key: DATASET_KEY.to_string(),
            settings_key: SETTINGS_KEY.to_string(),
        }
    }

    /// Wire the preferred dataset store port.
    #[must_use]
    pub fn with_dataset_store(mut self, store: Box<dyn DatasetStore>) -> Self {
        self.dataset_store = Some(store);
        self
    }

    /// Override the fallback storage keys (multi-table hosts).
    #[must_use]
    pub fn with_keys(mut self, dataset_key: &str, settings_key: &str) -> Self {
        self.dataset_key = dataset_key.to_string();
        self.settings_key = settings_key.to_string();
        self
    }

    /// Which port dataset operations will use for the given context.
    pub fn dataset_port_name(&self, context_id: Option<&str>) -> &'static str {
        if self.dataset_store.is_some() && context_id.is_some() {
            "dataset-store"
        } else {
            "key-value"
        }
    }

    /// Load settings, merging a partial stored document over defaults.
    pub fn load_settings(&self) -> Result<Settings> {
        match self.storage.get(&self.settings_key)? {
            Some(value) => Ok(serde_json::from_value(value)?),
            None => Ok(Settings::default()),
        }
    }

    /// Persist settings.
    pub fn save_settings(&mut self, settings: &Settings) -> Result<()> {
        let value = serde_json::to_value(settings)?;
        self.storage.set(&self.settings_key, value)
    }

    /// Load the dataset through the highest-ranked available port.
    ///
    /// Missing data yields an empty dataset, not an error.
    pub fn load_dataset(&self, context_id: Option<&str>) -> Result<Dataset> {
        if let (Some(store), Some(context)) = (&self.dataset_store, context_id) {
            return store.get_dataset(context);
        }
        log::debug!("dataset store unavailable, falling back to key-value storage");
        match self.storage.get(&self.dataset_key)? {
            Some(value) => Ok(serde_json::from_value(value)?),
            None => Ok(Dataset::default()),
        }
    }

    /// Persist the dataset through the highest-ranked available port.
    ///
    /// The store path replaces records wholesale (the engine owns ordering);
    /// the fallback writes the whole dataset document under one key.
    pub fn save_dataset(&mut self, context_id: Option<&str>, dataset: &Dataset) -> Result<()> {
        if let (Some(store), Some(context)) = (&mut self.dataset_store, context_id) {
            return store.upsert_records(context, &dataset.records, UpsertMode::Replace);
        }
        let value = serde_json::to_value(dataset)?;
        self.storage.set(&self.dataset_key, value)
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn memory_storage_round_trips_independent_values() {
        let mut storage = MemoryStorage::new();
        storage.set("k", json!({"a": 1})).unwrap();

        let mut fetched = storage.get("k").unwrap().unwrap();
        fetched["a"] = json!(2);

        // Mutating the fetched copy must not leak back into storage.
        assert_eq!(storage.get("k").unwrap().unwrap()["a"], json!(1));
    }

    #[test]
    fn list_filters_by_prefix() {
        let mut storage = MemoryStorage::new();
        storage.set("tableview:a", json!(1)).unwrap();
        storage.set("tableview:b", json!(2)).unwrap();
        storage.set("other:c", json!(3)).unwrap();

        let entries = storage.list("tableview:").unwrap();
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn del_removes_entry() {
        let mut storage = MemoryStorage::new();
        storage.set("k", json!(1)).unwrap();
        storage.del("k").unwrap();
        assert!(storage.get("k").unwrap().is_none());
    }

    #[test]
    fn settings_load_merges_partial_document_over_defaults() {
        let mut storage = MemoryStorage::new();
        storage
            .set(SETTINGS_KEY, json!({"filter": {"global": "ann"}}))
            .unwrap();
        let backend = Backend::new(Box::new(storage));

        let settings = backend.load_settings().unwrap();
        assert_eq!(settings.filter.global, "ann");
        assert!(settings.expanded_row_ids.is_empty());
        assert!(settings.columns.order.is_none());
    }

    #[test]
    fn settings_load_accepts_cleared_widths() {
        // Hosts store a cleared width as JSON null; one null must not cost
        // the whole settings document.
        let mut storage = MemoryStorage::new();
        storage
            .set(
                SETTINGS_KEY,
                json!({"columns": {"widths": {"a": null, "b": 120.0}}, "filter": {"global": "ann"}}),
            )
            .unwrap();
        let backend = Backend::new(Box::new(storage));

        let settings = backend.load_settings().unwrap();
        assert_eq!(settings.columns.widths.get("a"), Some(&None));
        assert_eq!(settings.columns.widths.get("b"), Some(&Some(120.0)));
        assert_eq!(settings.filter.global, "ann");
    }

    #[test]
    fn missing_dataset_loads_empty() {
        let backend = Backend::new(Box::new(MemoryStorage::new()));
        let dataset = backend.load_dataset(None).unwrap();
        assert!(dataset.records.is_empty());
        assert!(dataset.merges.is_empty());
    }

    #[test]
    fn fallback_port_is_reported() {
        let backend = Backend::new(Box::new(MemoryStorage::new()));
        assert_eq!(backend.dataset_port_name(Some("j1")), "key-value");
        assert_eq!(backend.dataset_port_name(None), "key-value");
    }
}
