use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

/// Optional sort applied after filtering, stable on ties.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SortSpec {
    /// Field key to sort by.
    pub key: String,
    #[serde(default)]
    pub direction: SortDirection,
}

/// Per-user column display settings.
///
/// `order` of `None` means schema order. Visibility defaults to visible for
/// keys absent from the map. A stored width of `null` means the user cleared
/// the width back to automatic; it round-trips as `None`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ColumnSettings {
    #[serde(default)]
    pub order: Option<Vec<String>>,
    #[serde(default)]
    pub visibility: HashMap<String, bool>,
    #[serde(default)]
    pub widths: HashMap<String, Option<f64>>,
}

impl ColumnSettings {
    /// Whether a column is visible (absent from the map means visible).
    pub fn is_visible(&self, key: &str) -> bool {
        self.visibility.get(key).copied().unwrap_or(true)
    }
}

/// Global text filter settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterSettings {
    /// Case-insensitive substring matched against every visible field.
    #[serde(default)]
    pub global: String,
}

/// User display settings, persisted independently of the dataset.
///
/// Every field is serde-defaulted so a partially stored document merges over
/// the defaults on load.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub columns: ColumnSettings,
    #[serde(default)]
    pub sort: Option<SortSpec>,
    #[serde(default)]
    pub filter: FilterSettings,
    #[serde(default)]
    pub expanded_row_ids: BTreeSet<String>,
    #[serde(default)]
    pub selected_row_ids: BTreeSet<String>,
}

impl Settings {
    /// Ordered visible column keys for a schema field-key list.
    ///
    /// A stored order wins when present and non-empty; keys not in the schema
    /// are dropped, as is any repeat of a key already placed; schema keys
    /// missing from the stored order are appended in schema order so new
    /// template columns still show up.
    pub fn ordered_visible_keys(&self, schema_keys: &[String]) -> Vec<String> {
        let mut ordered: Vec<String> = match &self.columns.order {
            Some(order) if !order.is_empty() => {
                let mut keys: Vec<String> = Vec::with_capacity(order.len());
                for key in order {
                    if schema_keys.contains(key) && !keys.contains(key) {
                        keys.push(key.clone());
                    }
                }
                for key in schema_keys {
                    if !keys.contains(key) {
                        keys.push(key.clone());
                    }
                }
                keys
            }
            _ => schema_keys.to_vec(),
        };
        ordered.retain(|k| self.columns.is_visible(k));
        ordered
    }
}
