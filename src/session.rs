//! Per-context session object.
//!
//! One [`TableSession`] per rendering context, owned by the presentation
//! layer and passed into every engine call — there is no module-level
//! mutable state. The session carries the engine, the schema identity it was
//! built against, and the selection-mode flag (a host concern the engine
//! itself does not model).

use crate::engine::TableEngine;
use crate::types::{Dataset, Schema, Settings};

/// Engine lifecycle + host-side flags for one rendering context.
#[derive(Debug, Default)]
pub struct TableSession {
    engine: Option<TableEngine>,
    selection_mode: bool,
}

impl TableSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild-or-refresh guard, called before every compute cycle.
    ///
    /// A schema-id change discards the engine wholesale — edit session and
    /// all — rather than patching cached state. Same-schema calls refresh
    /// settings and dataset in place, preserving any in-flight edit.
    pub fn sync(
        &mut self,
        schema: Schema,
        settings: Settings,
        dataset: Dataset,
    ) -> &mut TableEngine {
        let rebuild = self
            .engine
            .as_ref()
            .is_none_or(|engine| engine.schema_id() != schema.id);

        if rebuild {
            if let Some(engine) = &self.engine {
                log::debug!(
                    "schema changed ({} -> {}), rebuilding engine",
                    engine.schema_id(),
                    schema.id
                );
            }
            self.engine = Some(TableEngine::new(schema, settings));
        } else if let Some(engine) = &mut self.engine {
            engine.set_settings(settings);
        }

        // Populated by the rebuild branch above on the first call.
        let engine = self
            .engine
            .get_or_insert_with(|| TableEngine::new(Schema::sentinel(), Settings::default()));
        engine.set_dataset(dataset);
        engine
    }

    /// The current engine, if a sync has happened.
    pub fn engine(&self) -> Option<&TableEngine> {
        self.engine.as_ref()
    }

    /// Mutable engine access for toggles and edits between syncs.
    pub fn engine_mut(&mut self) -> Option<&mut TableEngine> {
        self.engine.as_mut()
    }

    /// Whether row clicks should toggle selection.
    pub fn selection_mode(&self) -> bool {
        self.selection_mode
    }

    /// Flip selection mode (bound to a host command).
    pub fn toggle_selection_mode(&mut self) {
        self.selection_mode = !self.selection_mode;
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
    use crate::types::Field;

    fn schema(id: &str) -> Schema {
        Schema::new(id, vec![Field::text("name", "Name")])
    }

    #[test]
    fn sync_builds_engine_on_first_call() {
        let mut session = TableSession::new();
        assert!(session.engine().is_none());
        session.sync(schema("tpl:a"), Settings::default(), Dataset::default());
        assert_eq!(session.engine().unwrap().schema_id(), "tpl:a");
    }

    #[test]
    fn schema_change_discards_edit_session() {
        let mut session = TableSession::new();
        session.sync(schema("tpl:a"), Settings::default(), Dataset::default());
        session.engine_mut().unwrap().begin_edit("r1", "name");
        assert!(session.engine().unwrap().is_editing());

        session.sync(schema("tpl:b"), Settings::default(), Dataset::default());
        assert!(!session.engine().unwrap().is_editing());
        assert_eq!(session.engine().unwrap().schema_id(), "tpl:b");
    }

    #[test]
    fn same_schema_preserves_edit_session() {
        let mut session = TableSession::new();
        session.sync(schema("tpl:a"), Settings::default(), Dataset::default());
        session.engine_mut().unwrap().begin_edit("r1", "name");

        session.sync(schema("tpl:a"), Settings::default(), Dataset::default());
        assert!(session.engine().unwrap().is_editing());
    }

    #[test]
    fn selection_mode_toggles() {
        let mut session = TableSession::new();
        assert!(!session.selection_mode());
        session.toggle_selection_mode();
        assert!(session.selection_mode());
        session.toggle_selection_mode();
        assert!(!session.selection_mode());
    }
}
