use serde::{Deserialize, Serialize};

/// Value type of a schema field.
///
/// Drives input coercion (edit + add-form) and display alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Free text (default).
    #[default]
    Text,
    /// Numeric value, stored as f64.
    Number,
    /// Calendar date, stored as ISO `YYYY-MM-DD` text.
    Date,
    /// Boolean flag.
    Bool,
}

/// A single schema field. Immutable, schema-owned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Field {
    /// Column key, unique within the schema.
    pub key: String,
    /// Human-readable label shown in headers and forms.
    pub label: String,
    /// Value type.
    #[serde(default, rename = "type")]
    pub field_type: FieldType,
    /// Whether the add-form requires a value for this field.
    #[serde(default)]
    pub required: bool,
}

impl Field {
    /// Shorthand for a plain text field.
    pub fn text(key: &str, label: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            field_type: FieldType::Text,
            required: false,
        }
    }

    /// Builder-style type override.
    #[must_use]
    pub fn with_type(mut self, field_type: FieldType) -> Self {
        self.field_type = field_type;
        self
    }

    /// Builder-style required flag.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// Schema identity for the empty-field sentinel.
pub const SENTINEL_SCHEMA_ID: &str = "tpl:__none__";

/// Ordered field list plus an identity.
///
/// The id changes whenever the underlying template changes; engine state must
/// be discarded (not just the View) on an id change — see
/// [`crate::session::TableSession::sync`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schema {
    pub id: String,
    pub fields: Vec<Field>,
}

impl Schema {
    /// Create a schema from an id and field list.
    pub fn new(id: impl Into<String>, fields: Vec<Field>) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// The empty-schema sentinel used when no template resolves.
    ///
    /// Consumers render a "no columns configured" state instead of failing.
    pub fn sentinel() -> Self {
        Self {
            id: SENTINEL_SCHEMA_ID.to_string(),
            fields: Vec::new(),
        }
    }

    /// True when this is the sentinel (no template resolved).
    pub fn is_sentinel(&self) -> bool {
        self.id == SENTINEL_SCHEMA_ID
    }

    /// Look up a field by key.
    pub fn field(&self, key: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.key == key)
    }
}
