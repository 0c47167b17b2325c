//! Shared builders and assertion helpers for the integration tests.

#![allow(dead_code)]
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

use std::collections::HashMap;

use tableview::types::{
    cell_key, CellValue, Dataset, Field, FieldType, Merge, Record, Schema, Settings, View,
};

/// Builder for datasets: records with text cells plus merge declarations.
#[derive(Default)]
pub struct DatasetBuilder {
    dataset: Dataset,
}

impl DatasetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record with text cells.
    pub fn record(mut self, id: &str, parent: Option<&str>, cells: &[(&str, &str)]) -> Self {
        let mut record = Record::new(id);
        record.parent_id = parent.map(ToString::to_string);
        for (key, value) in cells {
            record
                .cells
                .insert((*key).to_string(), CellValue::Text((*value).to_string()));
        }
        self.dataset.records.push(record);
        self
    }

    /// Add a record with a numeric cell.
    pub fn number(mut self, id: &str, key: &str, value: f64) -> Self {
        let mut record = Record::new(id);
        record.cells.insert(key.to_string(), CellValue::Number(value));
        self.dataset.records.push(record);
        self
    }

    pub fn merge(mut self, row_id: &str, col_key: &str, row_span: u32, col_span: u32) -> Self {
        self.dataset.merges.push(Merge {
            row_id: row_id.to_string(),
            col_key: col_key.to_string(),
            row_span,
            col_span,
        });
        self
    }

    pub fn build(self) -> Dataset {
        self.dataset
    }
}

/// A text-field schema over the given keys.
pub fn text_schema(id: &str, keys: &[&str]) -> Schema {
    Schema::new(
        id,
        keys.iter().map(|k| Field::text(k, k)).collect::<Vec<_>>(),
    )
}

/// A schema with explicit field types.
pub fn typed_schema(id: &str, fields: &[(&str, FieldType, bool)]) -> Schema {
    Schema::new(
        id,
        fields
            .iter()
            .map(|(key, field_type, required)| {
                let mut f = Field::text(key, key).with_type(*field_type);
                if *required {
                    f = f.required();
                }
                f
            })
            .collect::<Vec<_>>(),
    )
}

/// Settings with the given rows expanded.
pub fn expanded_settings(ids: &[&str]) -> Settings {
    let mut settings = Settings::default();
    settings.expanded_row_ids = ids.iter().map(ToString::to_string).collect();
    settings
}

/// String map from pairs (form values).
pub fn values(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

/// Assert the view emits exactly these row ids, in order.
pub fn assert_row_order(view: &View, expected: &[&str]) {
    let ids: Vec<&str> = view.rows.iter().map(|r| r.row_id.as_str()).collect();
    assert_eq!(ids, expected);
}

/// Assert an anchor entry with the given extent exists.
pub fn assert_anchor(view: &View, row_id: &str, col_key: &str, row_span: u32, col_span: u32) {
    let key = cell_key(row_id, col_key);
    let span = view
        .cell_span_map
        .get(&key)
        .unwrap_or_else(|| panic!("no span entry at {key}"));
    assert_eq!(span.covered_by, None, "{key} should be an anchor");
    assert_eq!(span.row_span, row_span, "{key} row_span");
    assert_eq!(span.col_span, col_span, "{key} col_span");
}

/// Assert a covered entry pointing at the given anchor exists.
pub fn assert_covered_by(view: &View, row_id: &str, col_key: &str, anchor: &str) {
    let key = cell_key(row_id, col_key);
    let span = view
        .cell_span_map
        .get(&key)
        .unwrap_or_else(|| panic!("no span entry at {key}"));
    assert_eq!(span.covered_by.as_deref(), Some(anchor), "{key} covered_by");
}
