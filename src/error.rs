//! Structured error types for tableview.
//!
//! One enum for the whole crate plus a `Result` alias; ports lift their
//! failures into it so callers see a single error surface.

/// All errors that can occur in view computation and port plumbing.
#[derive(Debug, thiserror::Error)]
pub enum TableViewError {
    /// Storage adapter failure (get/set/del/list).
    #[error("storage: {0}")]
    Storage(String),

    /// A port was asked for a capability it does not implement.
    #[error("unsupported capability: {0}")]
    Unsupported(&'static str),

    /// Template lookup failure from the schema/template port.
    #[error("template: {0}")]
    Template(String),

    /// Edit-session misuse (e.g. apply without an active session).
    #[error("edit session: {0}")]
    EditSession(String),

    /// A raw input value could not be coerced to the field's type.
    #[error("invalid value for field '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    /// Add-form submission failed validation; per-field reasons attached.
    #[error("form validation failed ({} field(s))", errors.len())]
    FormValidation {
        errors: std::collections::HashMap<String, String>,
    },

    /// A referenced field key is not part of the active schema.
    #[error("unknown field: {0}")]
    UnknownField(String),

    /// JSON (de)serialization error.
    #[error("serialization: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error (CLI file handling).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TableViewError>;

impl From<String> for TableViewError {
    fn from(s: String) -> Self {
        Self::Storage(s)
    }
}
