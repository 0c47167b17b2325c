use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A single cell value.
///
/// Untagged: persists as plain JSON scalars (`null`, string, number, bool),
/// matching what the storage port round-trips. Dates are ISO `YYYY-MM-DD`
/// text — validated at input-parse time, not here.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// No value (JSON null).
    #[default]
    Empty,
    /// Boolean flag.
    Bool(bool),
    /// Numeric value.
    Number(f64),
    /// Text (also carries dates).
    Text(String),
}

impl CellValue {
    /// Display text for filtering and plain rendering.
    pub fn display(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Bool(true) => "TRUE".to_string(),
            CellValue::Bool(false) => "FALSE".to_string(),
            CellValue::Number(n) => {
                // Trim the trailing ".0" off integral values
                if n.fract().abs() < f64::EPSILON && n.abs() < 1e15 {
                    format!("{n:.0}")
                } else {
                    n.to_string()
                }
            }
            CellValue::Text(s) => s.clone(),
        }
    }

    /// True when the value is absent or blank text.
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

/// One row of the dataset. Mutated only via [`Patch`]es.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    /// Unique record id.
    pub id: String,
    /// Parent record id; absent or dangling means root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    /// Field key → value.
    #[serde(default)]
    pub cells: HashMap<String, CellValue>,
    /// Field key → display-style payload (opaque to the engine).
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub fmt: HashMap<String, serde_json::Value>,
}

impl Record {
    /// Create an empty record with the given id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            parent_id: None,
            cells: HashMap::new(),
            fmt: HashMap::new(),
        }
    }
}

/// A declared cell merge: the cell at (`row_id`, `col_key`) anchors a region
/// covering `row_span` rows downward and `col_span` columns rightward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Merge {
    pub row_id: String,
    pub col_key: String,
    pub row_span: u32,
    pub col_span: u32,
}

/// The dataset: flat records plus independent merge declarations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub records: Vec<Record>,
    #[serde(default)]
    pub merges: Vec<Merge>,
}

/// Minimal per-record delta produced by an edit; merged into exactly one
/// record by the caller before persisting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patch {
    pub record_id: String,
    #[serde(default)]
    pub cells_patch: HashMap<String, CellValue>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub fmt_patch: HashMap<String, serde_json::Value>,
}

impl Dataset {
    /// Merge a patch into the record it addresses.
    ///
    /// Unknown record ids are a no-op (the record may have been removed
    /// between computation and application).
    pub fn apply_patch(&mut self, patch: &Patch) {
        for record in &mut self.records {
            if record.id != patch.record_id {
                continue;
            }
            for (key, value) in &patch.cells_patch {
                record.cells.insert(key.clone(), value.clone());
            }
            for (key, value) in &patch.fmt_patch {
                record.fmt.insert(key.clone(), value.clone());
            }
            return;
        }
    }

    /// Look up a record by id.
    pub fn record(&self, id: &str) -> Option<&Record> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Generate a record id unique within this dataset (`rec_<n>`).
    pub fn next_record_id(&self) -> String {
        let mut n = self.records.len() + 1;
        loop {
            let candidate = format!("rec_{n}");
            if self.records.iter().all(|r| r.id != candidate) {
                return candidate;
            }
            n += 1;
        }
    }
}
