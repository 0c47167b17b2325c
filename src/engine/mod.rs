//! The view-computation engine.
//!
//! Pure, synchronous computation over in-memory state: Schema + Dataset +
//! Settings in, [`View`] out. Mutation entry points (edit, expand, select,
//! add-row) produce patches or settings deltas; the caller persists them
//! through the storage ports and re-invokes [`TableEngine::compute`].
//! Consistency comes from recomputing the derived view on every relevant
//! change, never from patching it incrementally.

mod edit;
mod flatten;
mod form;
mod spans;
mod stage;

use crate::error::Result;
use crate::types::{Dataset, Patch, Record, Schema, Settings, View, ViewColumn};

pub use edit::EditSession;
pub use form::{FormField, FormValidation};

/// The engine for one rendering context.
///
/// Holds the active schema, the user's settings (mutated by toggles), the
/// current dataset snapshot, and the single edit session.
#[derive(Debug)]
pub struct TableEngine {
    schema: Schema,
    settings: Settings,
    dataset: Dataset,
    edit: EditSession,
}

impl TableEngine {
    /// Create an engine for a schema and settings snapshot.
    pub fn new(schema: Schema, settings: Settings) -> Self {
        Self {
            schema,
            settings,
            dataset: Dataset::default(),
            edit: EditSession::default(),
        }
    }

    /// Replace the dataset snapshot (loaded fresh per computation cycle).
    pub fn set_dataset(&mut self, dataset: Dataset) {
        self.dataset = dataset;
    }

    /// Replace settings without disturbing the edit session.
    ///
    /// Used when settings were persisted and reloaded mid-session; a schema
    /// change goes through [`crate::session::TableSession::sync`] instead.
    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings;
    }

    /// The active schema.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Identity of the active schema.
    pub fn schema_id(&self) -> &str {
        &self.schema.id
    }

    /// Current settings, including toggle mutations the caller must persist.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Current dataset snapshot.
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Compute the render-ready view.
    ///
    /// Pipeline: visible columns → filter → sort → hierarchy flatten →
    /// cell-span resolution. Pure with respect to engine state.
    pub fn compute(&self) -> View {
        let columns = self.visible_columns();
        let visible_keys: Vec<String> = columns.iter().map(|c| c.column_key.clone()).collect();

        let filtered =
            stage::filter_records(&self.dataset.records, &self.settings.filter, &visible_keys);
        let sorted = stage::sort_records(filtered, self.settings.sort.as_ref());
        let rows = flatten::flatten_rows(&sorted, &self.settings.expanded_row_ids);
        let (cell_span_map, merge_conflicts) =
            spans::resolve_spans(&rows, &columns, &self.dataset.merges);

        View {
            columns,
            rows,
            cell_span_map,
            selection: self.settings.selected_row_ids.clone(),
            merge_conflicts,
        }
    }

    fn visible_columns(&self) -> Vec<ViewColumn> {
        let schema_keys: Vec<String> = self.schema.fields.iter().map(|f| f.key.clone()).collect();
        self.settings
            .ordered_visible_keys(&schema_keys)
            .into_iter()
            .filter_map(|key| {
                let field = self.schema.field(&key)?.clone();
                let width = self.settings.columns.widths.get(&key).copied().flatten();
                Some(ViewColumn {
                    column_key: key,
                    field,
                    width,
                })
            })
            .collect()
    }

    // ---- Expansion & selection (settings deltas) ----

    /// Flip a row's membership in the expanded set. Idempotent in pairs.
    pub fn toggle_expand(&mut self, row_id: &str) {
        if !self.settings.expanded_row_ids.remove(row_id) {
            self.settings.expanded_row_ids.insert(row_id.to_string());
        }
    }

    /// Flip a row's membership in the selection set. Idempotent in pairs.
    ///
    /// Selection-mode gating is the caller's concern; the engine tracks the
    /// set unconditionally.
    pub fn toggle_select(&mut self, row_id: &str) {
        if !self.settings.selected_row_ids.remove(row_id) {
            self.settings.selected_row_ids.insert(row_id.to_string());
        }
    }

    // ---- Edit session (dataset patches) ----

    /// Start editing a cell; an in-flight session is implicitly cancelled.
    pub fn begin_edit(&mut self, row_id: &str, col_key: &str) {
        self.edit.begin(row_id, col_key);
    }

    /// Parse `raw` against the session field and return the patch.
    ///
    /// The caller merges the patch into the dataset ([`Dataset::apply_patch`])
    /// and persists it; the engine does not.
    pub fn apply_edit(&mut self, raw: &str) -> Result<Patch> {
        self.edit.apply(raw, &self.schema)
    }

    /// Discard the edit session without a patch.
    pub fn cancel_edit(&mut self) {
        self.edit.cancel();
    }

    /// True when a cell edit is in flight.
    pub fn is_editing(&self) -> bool {
        self.edit.is_editing()
    }

    /// The cell currently being edited, if any.
    pub fn editing_cell(&self) -> Option<(&str, &str)> {
        self.edit.editing_cell()
    }

    // ---- Add-row form ----

    /// One form-field descriptor per schema field.
    pub fn add_form_model(&self) -> Vec<FormField> {
        form::add_form_model(&self.schema)
    }

    /// Validate raw form values; per-field reasons on failure.
    pub fn validate_add_form(
        &self,
        values: &std::collections::HashMap<String, String>,
    ) -> FormValidation {
        form::validate_add_form(&self.schema, values)
    }

    /// Build a new record from valid form values; the dataset is untouched —
    /// the caller appends and persists.
    pub fn build_record_from_form(
        &self,
        values: &std::collections::HashMap<String, String>,
    ) -> Result<Record> {
        form::build_record_from_form(&self.schema, &self.dataset, values)
    }
}
