//! Add-row form: field model derivation, validation, record construction.

use std::collections::HashMap;

use crate::error::{Result, TableViewError};
use crate::format;
use crate::types::{Dataset, Record, Schema};

/// One editable form field derived from a schema field.
#[derive(Debug, Clone)]
pub struct FormField {
    pub key: String,
    pub label: String,
    pub field_type: crate::types::FieldType,
    /// Prefill for the form input (empty today; templates may supply one).
    pub default: String,
    pub required: bool,
}

/// Validation outcome with per-field reasons.
#[derive(Debug, Clone)]
pub struct FormValidation {
    pub valid: bool,
    pub errors: HashMap<String, String>,
}

/// Derive the form-field model from the schema, one entry per field.
pub fn add_form_model(schema: &Schema) -> Vec<FormField> {
    schema
        .fields
        .iter()
        .map(|field| FormField {
            key: field.key.clone(),
            label: field.label.clone(),
            field_type: field.field_type,
            default: String::new(),
            required: field.required,
        })
        .collect()
}

/// Validate raw form values against the schema.
///
/// Missing or blank values for required fields are rejected, as are values
/// that fail the field's type coercion. Keys not in the schema are ignored.
pub fn validate_add_form(schema: &Schema, values: &HashMap<String, String>) -> FormValidation {
    let mut errors = HashMap::new();

    for field in &schema.fields {
        let raw = values.get(&field.key).map(String::as_str).unwrap_or("");
        if raw.trim().is_empty() {
            if field.required {
                errors.insert(field.key.clone(), "value is required".to_string());
            }
            continue;
        }
        if let Err(e) = format::parse_input(raw, field) {
            errors.insert(field.key.clone(), e.to_string());
        }
    }

    FormValidation {
        valid: errors.is_empty(),
        errors,
    }
}

/// Construct a new record from valid form values.
///
/// The record gets an id unique within `dataset` and cells populated from
/// the coerced values; blank inputs are left out. The dataset itself is not
/// mutated — the caller appends the record and persists.
pub fn build_record_from_form(
    schema: &Schema,
    dataset: &Dataset,
    values: &HashMap<String, String>,
) -> Result<Record> {
    let validation = validate_add_form(schema, values);
    if !validation.valid {
        return Err(TableViewError::FormValidation {
            errors: validation.errors,
        });
    }

    let mut record = Record::new(dataset.next_record_id());
    for field in &schema.fields {
        let raw = values.get(&field.key).map(String::as_str).unwrap_or("");
        if raw.trim().is_empty() {
            continue;
        }
        let value = format::parse_input(raw, field)?;
        record.cells.insert(field.key.clone(), value);
    }
    Ok(record)
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
                Field::text("name", "Name").required(),
                Field::text("amount", "Amount").with_type(FieldType::Number),
            ],
        )
    }

    fn values(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn model_mirrors_schema_fields() {
        let model = add_form_model(&schema());
        assert_eq!(model.len(), 2);
        assert_eq!(model[0].key, "name");
        assert!(model[0].required);
        assert_eq!(model[1].field_type, FieldType::Number);
    }

    #[test]
    fn missing_required_field_is_rejected() {
        let v = validate_add_form(&schema(), &values(&[("amount", "5")]));
        assert!(!v.valid);
        assert!(v.errors.contains_key("name"));
        assert_eq!(v.errors.len(), 1);
    }

    #[test]
    fn coercion_failure_is_reported_per_field() {
        let v = validate_add_form(&schema(), &values(&[("name", "Ann"), ("amount", "abc")]));
        assert!(!v.valid);
        assert!(v.errors.contains_key("amount"));
    }

    #[test]
    fn complete_submission_is_accepted() {
        let v = validate_add_form(&schema(), &values(&[("name", "Ann"), ("amount", "5")]));
        assert!(v.valid);
        assert!(v.errors.is_empty());
    }

    #[test]
    fn build_coerces_and_generates_unique_id() {
        let mut dataset = Dataset::default();
        dataset.records.push(Record::new("rec_1"));

        let record =
            build_record_from_form(&schema(), &dataset, &values(&[("name", "Ann"), ("amount", "5")]))
                .unwrap();
        assert_ne!(record.id, "rec_1");
        assert_eq!(record.cells.get("name"), Some(&CellValue::Text("Ann".to_string())));
        assert_eq!(record.cells.get("amount"), Some(&CellValue::Number(5.0)));
        // dataset untouched
        assert_eq!(dataset.records.len(), 1);
    }

    #[test]
    fn build_rejects_invalid_input_without_constructing() {
        let dataset = Dataset::default();
        let err = build_record_from_form(&schema(), &dataset, &values(&[("amount", "5")]));
        assert!(matches!(err, Err(TableViewError::FormValidation { .. })));
    }
}
