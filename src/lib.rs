//! tableview - view-computation engine for hierarchical tables
//!
//! Turns a flat record list plus independent cell-merge declarations, user
//! display settings, and a dynamic schema into a single renderable [`View`],
//! and mediates all mutations (edits, additions, expand/collapse, selection)
//! back into well-formed patches against the dataset and settings stores:
//! - Hierarchy flattening with expansion filtering
//! - Cell-span resolution (merge anchors and covered cells)
//! - A single-slot edit session state machine producing dataset patches
//! - Add-row form derivation, validation, and record construction
//! - Ranked storage ports and template-based schema resolution
//!
//! # Usage
//!
//! ```
//! use tableview::engine::TableEngine;
//! use tableview::types::{Dataset, Field, Record, Schema, Settings};
//!
//! let schema = Schema::new("tpl:demo", vec![Field::text("name", "Name")]);
//! let mut engine = TableEngine::new(schema, Settings::default());
//!
//! let mut dataset = Dataset::default();
//! dataset.records.push(Record::new("1"));
//! engine.set_dataset(dataset);
//!
//! let view = engine.compute();
//! assert_eq!(view.rows.len(), 1);
//! ```

pub mod engine;
pub mod error;
pub mod format;
pub mod session;
pub mod storage;
pub mod template;
pub mod types;

pub use engine::TableEngine;
pub use error::{Result, TableViewError};
pub use session::TableSession;
pub use types::*;

/// Get the library version
#[must_use]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
