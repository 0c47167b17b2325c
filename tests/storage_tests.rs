//! Backend ranking and persistence-failure tests: the dataset store wins
//! over key-value fallback when wired, and a failed save leaves prior state
//! authoritative.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use common::{text_schema, DatasetBuilder};
use tableview::engine::TableEngine;
use tableview::error::TableViewError;
use tableview::storage::{Backend, DatasetStore, MemoryStorage, StoragePort, UpsertMode};
use tableview::types::{Dataset, Record, Settings};

/// Dataset store keeping per-context records in memory.
#[derive(Default)]
struct FakeDatasetStore {
    contexts: Rc<RefCell<HashMap<String, Vec<Record>>>>,
}

impl DatasetStore for FakeDatasetStore {
    fn get_dataset(&self, context_id: &str) -> tableview::Result<Dataset> {
        let records = self
            .contexts
            .borrow()
            .get(context_id)
            .cloned()
            .unwrap_or_default();
        Ok(Dataset {
            records,
            merges: Vec::new(),
        })
    }

    fn upsert_records(
        &mut self,
        context_id: &str,
        records: &[Record],
        mode: UpsertMode,
    ) -> tableview::Result<()> {
        let mut contexts = self.contexts.borrow_mut();
        let slot = contexts.entry(context_id.to_string()).or_default();
        match mode {
            UpsertMode::Replace => *slot = records.to_vec(),
            UpsertMode::Append => slot.extend(records.iter().cloned()),
        }
        Ok(())
    }
}

/// Storage adapter whose writes always fail.
struct FailingStorage;

impl StoragePort for FailingStorage {
    fn get(&self, _key: &str) -> tableview::Result<Option<serde_json::Value>> {
        Ok(None)
    }

    fn set(&mut self, _key: &str, _value: serde_json::Value) -> tableview::Result<()> {
        Err(TableViewError::Storage("disk full".to_string()))
    }

    fn del(&mut self, _key: &str) -> tableview::Result<()> {
        Err(TableViewError::Storage("disk full".to_string()))
    }
}

#[test]
fn dataset_store_outranks_key_value_fallback() {
    let contexts = Rc::new(RefCell::new(HashMap::new()));
    let store = FakeDatasetStore {
        contexts: Rc::clone(&contexts),
    };
    let mut backend =
        Backend::new(Box::new(MemoryStorage::new())).with_dataset_store(Box::new(store));
    assert_eq!(backend.dataset_port_name(Some("j1")), "dataset-store");

    let dataset = DatasetBuilder::new().record("1", None, &[("name", "Ann")]).build();
    backend.save_dataset(Some("j1"), &dataset).unwrap();

    // Records landed in the store, not in key-value storage
    assert_eq!(contexts.borrow().get("j1").unwrap().len(), 1);
    let loaded = backend.load_dataset(Some("j1")).unwrap();
    assert_eq!(loaded.records.len(), 1);
}

#[test]
fn missing_context_falls_back_to_key_value() {
    let mut backend = Backend::new(Box::new(MemoryStorage::new()))
        .with_dataset_store(Box::new(FakeDatasetStore::default()));

    let dataset = DatasetBuilder::new().record("1", None, &[]).build();
    backend.save_dataset(None, &dataset).unwrap();
    assert_eq!(backend.load_dataset(None).unwrap().records.len(), 1);
}

#[test]
fn contexts_are_isolated_in_the_store() {
    let mut backend = Backend::new(Box::new(MemoryStorage::new()))
        .with_dataset_store(Box::new(FakeDatasetStore::default()));

    let dataset = DatasetBuilder::new().record("1", None, &[]).build();
    backend.save_dataset(Some("j1"), &dataset).unwrap();
    assert!(backend.load_dataset(Some("j2")).unwrap().records.is_empty());
}

#[test]
fn failed_save_leaves_prior_state_authoritative() {
    let mut backend = Backend::new(Box::new(FailingStorage));
    let mut engine = TableEngine::new(text_schema("tpl:t", &["name"]), Settings::default());
    let dataset = DatasetBuilder::new().record("1", None, &[("name", "Ann")]).build();
    engine.set_dataset(dataset.clone());

    engine.begin_edit("1", "name");
    let patch = engine.apply_edit("Anna").unwrap();

    let mut candidate = dataset.clone();
    candidate.apply_patch(&patch);
    assert!(backend.save_dataset(None, &candidate).is_err());

    // The caller keeps the pre-patch dataset as the source of truth.
    engine.set_dataset(dataset);
    let view = engine.compute();
    assert_eq!(
        view.rows[0].record.cells.get("name").unwrap().display(),
        "Ann"
    );
}

#[test]
fn settings_survive_engine_rebuild() {
    let mut backend = Backend::new(Box::new(MemoryStorage::new()));

    let mut engine = TableEngine::new(text_schema("tpl:a", &["name"]), Settings::default());
    engine.set_dataset(DatasetBuilder::new().record("1", None, &[]).build());
    engine.toggle_select("1");
    engine.toggle_expand("1");
    backend.save_settings(engine.settings()).unwrap();

    // New engine (e.g. after a schema change) reloads the same settings.
    let settings = backend.load_settings().unwrap();
    assert!(settings.selected_row_ids.contains("1"));
    assert!(settings.expanded_row_ids.contains("1"));
}

#[test]
fn custom_keys_partition_multiple_tables() {
    let mut backend = Backend::new(Box::new(MemoryStorage::new()))
        .with_keys("tableview:orders:dataset", "tableview:orders:settings");

    let dataset = DatasetBuilder::new().record("1", None, &[]).build();
    backend.save_dataset(None, &dataset).unwrap();
    backend.save_settings(&Settings::default()).unwrap();
    assert_eq!(backend.load_dataset(None).unwrap().records.len(), 1);
}
