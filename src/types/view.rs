use std::collections::{BTreeSet, HashMap};

use serde::Serialize;

use super::record::Record;
use super::schema::Field;

/// Build the `"rowId:colKey"` key used by [`View::cell_span_map`].
pub fn cell_key(row_id: &str, col_key: &str) -> String {
    format!("{row_id}:{col_key}")
}

/// One visible column of the view, in display order.
#[derive(Debug, Clone, Serialize)]
pub struct ViewColumn {
    pub column_key: String,
    pub field: Field,
    /// User-set width, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
}

/// One emitted row of the view, in display order.
#[derive(Debug, Clone, Serialize)]
pub struct ViewRow {
    pub row_id: String,
    pub record: Record,
    /// Number of visible ancestors (root = 0).
    pub depth: usize,
    /// True when any emitted-or-collapsed record references this row as parent.
    pub has_children: bool,
    pub is_expanded: bool,
}

/// Span info for one cell of the view.
///
/// An anchor entry carries the merge extent; a covered entry points back to
/// its anchor via `covered_by` and is excluded from rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CellSpan {
    pub row_span: u32,
    pub col_span: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub covered_by: Option<String>,
}

impl CellSpan {
    /// The 1×1 span of an unmerged cell.
    pub fn single() -> Self {
        Self {
            row_span: 1,
            col_span: 1,
            covered_by: None,
        }
    }
}

/// A merge dropped during span resolution because it collided with an
/// earlier-declared merge (first registrant wins).
#[derive(Debug, Clone, Serialize)]
pub struct MergeConflict {
    /// Anchor of the dropped merge.
    pub row_id: String,
    pub col_key: String,
    /// Cell key already claimed by the earlier merge.
    pub conflicts_at: String,
}

/// The fully derived, render-ready projection of Schema + Dataset + Settings.
///
/// Recomputed on every relevant change, never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct View {
    pub columns: Vec<ViewColumn>,
    pub rows: Vec<ViewRow>,
    pub cell_span_map: HashMap<String, CellSpan>,
    pub selection: BTreeSet<String>,
    /// Data-integrity warnings: merges dropped by first-wins resolution.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub merge_conflicts: Vec<MergeConflict>,
}

/// A cell a consumer should actually paint for `row`.
#[derive(Debug, Clone)]
pub struct RenderableCell {
    pub col_key: String,
    pub span: CellSpan,
}

/// The cells of `row` that survive span resolution: covered cells are
/// excluded, anchors carry their merge extent, everything else is 1×1.
pub fn renderable_cells(
    row: &ViewRow,
    columns: &[ViewColumn],
    cell_span_map: &HashMap<String, CellSpan>,
) -> Vec<RenderableCell> {
    let mut cells = Vec::with_capacity(columns.len());
    for column in columns {
        let key = cell_key(&row.row_id, &column.column_key);
        match cell_span_map.get(&key) {
            Some(span) if span.covered_by.is_some() => {}
            Some(span) => cells.push(RenderableCell {
                col_key: column.column_key.clone(),
                span: span.clone(),
            }),
            None => cells.push(RenderableCell {
                col_key: column.column_key.clone(),
                span: CellSpan::single(),
            }),
        }
    }
    cells
}
