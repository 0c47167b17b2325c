//! Core data model: schema, records, settings, and the derived view.

pub mod record;
pub mod schema;
pub mod settings;
pub mod view;

pub use record::{CellValue, Dataset, Merge, Patch, Record};
pub use schema::{Field, FieldType, Schema, SENTINEL_SCHEMA_ID};
pub use settings::{ColumnSettings, FilterSettings, Settings, SortDirection, SortSpec};
pub use view::{
    cell_key, renderable_cells, CellSpan, MergeConflict, RenderableCell, View, ViewColumn, ViewRow,
};
