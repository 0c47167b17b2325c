//! Edit session state machine.
//!
//! At most one cell edit is in flight engine-wide. `begin` while already
//! editing cancels the prior session (last begin wins). `apply` parses the
//! raw input against the field's type and emits a patch for the session
//! cell; a parse failure keeps the session open so the caller can retry or
//! cancel explicitly. The engine never persists the patch.

use std::collections::HashMap;

use crate::error::{Result, TableViewError};
use crate::format;
use crate::types::{Patch, Schema};

/// The edit session: `Idle` or `Editing` one cell.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EditSession {
    #[default]
    Idle,
    Editing { row_id: String, col_key: String },
}

impl EditSession {
    /// Start editing a cell, implicitly cancelling any prior session.
    pub fn begin(&mut self, row_id: &str, col_key: &str) {
        if let EditSession::Editing {
            row_id: prev_row,
            col_key: prev_col,
        } = &self
        {
            log::debug!("edit session at {prev_row}:{prev_col} replaced by {row_id}:{col_key}");
        }
        *self = EditSession::Editing {
            row_id: row_id.to_string(),
            col_key: col_key.to_string(),
        };
    }

    /// Discard the session without producing a patch.
    pub fn cancel(&mut self) {
        *self = EditSession::Idle;
    }

    /// True when a session is active.
    pub fn is_editing(&self) -> bool {
        matches!(self, EditSession::Editing { .. })
    }

    /// The cell currently being edited, if any.
    pub fn editing_cell(&self) -> Option<(&str, &str)> {
        match self {
            EditSession::Idle => None,
            EditSession::Editing { row_id, col_key } => Some((row_id, col_key)),
        }
    }

    /// Parse `raw` against the session field and produce a patch.
    ///
    /// On success the session returns to `Idle`. An unknown field key (stale
    /// session against a changed schema) also resets to `Idle`; a plain
    /// parse failure does not.
    pub fn apply(&mut self, raw: &str, schema: &Schema) -> Result<Patch> {
        let EditSession::Editing { row_id, col_key } = &self else {
            return Err(TableViewError::EditSession(
                "apply without an active session".to_string(),
            ));
        };

        let Some(field) = schema.field(col_key) else {
            let missing = col_key.clone();
            *self = EditSession::Idle;
            return Err(TableViewError::UnknownField(missing));
        };

        let value = format::parse_input(raw, field)?;

        let mut cells_patch = HashMap::new();
        cells_patch.insert(col_key.clone(), value);
        let patch = Patch {
            record_id: row_id.clone(),
            cells_patch,
            fmt_patch: HashMap::new(),
        };
        *self = EditSession::Idle;
        Ok(patch)
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
    use crate::types::{CellValue, Field, FieldType};

    fn schema() -> Schema {
        Schema::new(
            "tpl:test",
            vec![
                Field::text("name", "Name"),
                Field::text("amount", "Amount").with_type(FieldType::Number),
            ],
        )
    }

    #[test]
    fn apply_without_session_is_an_error() {
        let mut session = EditSession::default();
        assert!(matches!(
            session.apply("x", &schema()),
            Err(TableViewError::EditSession(_))
        ));
    }

    #[test]
    fn apply_produces_single_cell_patch_and_resets() {
        let mut session = EditSession::default();
        session.begin("r1", "amount");
        let patch = session.apply("42", &schema()).unwrap();

        assert_eq!(patch.record_id, "r1");
        assert_eq!(patch.cells_patch.len(), 1);
        assert_eq!(
            patch.cells_patch.get("amount"),
            Some(&CellValue::Number(42.0))
        );
        assert!(patch.fmt_patch.is_empty());
        assert!(!session.is_editing());
    }

    #[test]
    fn last_begin_wins() {
        let mut session = EditSession::default();
        session.begin("r1", "name");
        session.begin("r2", "amount");
        assert_eq!(session.editing_cell(), Some(("r2", "amount")));
    }

    #[test]
    fn parse_failure_keeps_session_open() {
        let mut session = EditSession::default();
        session.begin("r1", "amount");
        assert!(session.apply("not a number", &schema()).is_err());
        assert!(session.is_editing());

        // A corrected value still lands on the same cell.
        let patch = session.apply("7", &schema()).unwrap();
        assert_eq!(patch.cells_patch.get("amount"), Some(&CellValue::Number(7.0)));
    }

    #[test]
    fn unknown_field_resets_session() {
        let mut session = EditSession::default();
        session.begin("r1", "vanished");
        assert!(matches!(
            session.apply("x", &schema()),
            Err(TableViewError::UnknownField(_))
        ));
        assert!(!session.is_editing());
    }

    #[test]
    fn cancel_discards_session() {
        let mut session = EditSession::default();
        session.begin("r1", "name");
        session.cancel();
        assert!(!session.is_editing());
    }
}
