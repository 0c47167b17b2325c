//! Schema/template port and schema resolution.
//!
//! A [`Schema`] is derived from an external template. Resolution degrades to
//! the empty-field sentinel instead of failing when no port is wired or the
//! template cannot be found; when the context has no template assigned yet,
//! a default is picked (prefer the `"test"` template, else the first listed)
//! and reported back so the caller can persist the assignment.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::{Field, FieldType, Schema};

/// One column of a template definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateColumn {
    pub key: String,
    pub label: String,
    #[serde(default, rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub required: bool,
}

/// External template a schema is derived from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Template {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub columns: Vec<TemplateColumn>,
}

/// Summary entry from `list_template_entities`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateSummary {
    pub id: String,
    #[serde(default)]
    pub title: String,
}

/// The schema/template lookup port.
pub trait TemplatePort {
    fn get_template(&self, template_id: &str) -> Result<Option<Template>>;
    fn list_template_entities(&self) -> Result<Vec<TemplateSummary>>;
}

/// Outcome of schema resolution.
#[derive(Debug, Clone)]
pub struct SchemaResolution {
    pub schema: Schema,
    /// Set when a default template was auto-assigned; the caller persists
    /// the assignment to the context.
    pub assigned_template_id: Option<String>,
}

impl SchemaResolution {
    fn sentinel() -> Self {
        Self {
            schema: Schema::sentinel(),
            assigned_template_id: None,
        }
    }
}

/// Derive a schema from a template (`id = "tpl:<template id>"`).
pub fn schema_from_template(template: &Template) -> Schema {
    let fields = template
        .columns
        .iter()
        .map(|c| Field {
            key: c.key.clone(),
            label: c.label.clone(),
            field_type: c.field_type,
            required: c.required,
        })
        .collect();
    Schema::new(format!("tpl:{}", template.id), fields)
}

/// Resolve the active schema for a context.
///
/// `template_id` is the context's assigned template, if any. Absent port,
/// absent assignment with no listable default, or a dangling template id all
/// degrade to the sentinel schema.
pub fn resolve_schema(
    port: Option<&dyn TemplatePort>,
    template_id: Option<&str>,
) -> Result<SchemaResolution> {
    let Some(port) = port else {
        return Ok(SchemaResolution::sentinel());
    };

    let (resolved_id, assigned) = match template_id {
        Some(id) => (id.to_string(), None),
        None => {
            let summaries = port.list_template_entities()?;
            let default = summaries
                .iter()
                .find(|t| t.id == "test")
                .or_else(|| summaries.first());
            match default {
                Some(summary) => {
                    log::debug!("auto-assigning default template '{}'", summary.id);
                    (summary.id.clone(), Some(summary.id.clone()))
                }
                None => return Ok(SchemaResolution::sentinel()),
            }
        }
    };

    match port.get_template(&resolved_id)? {
        Some(template) => Ok(SchemaResolution {
            schema: schema_from_template(&template),
            assigned_template_id: assigned,
        }),
        None => {
            log::warn!("template '{resolved_id}' not found, using sentinel schema");
            Ok(SchemaResolution::sentinel())
        }
    }
}

/// In-memory template adapter (tests, single-process hosts).
#[derive(Debug, Default)]
pub struct MemoryTemplates {
    templates: Vec<Template>,
}

impl MemoryTemplates {
    pub fn new(templates: Vec<Template>) -> Self {
        Self { templates }
    }
}

impl TemplatePort for MemoryTemplates {
    fn get_template(&self, template_id: &str) -> Result<Option<Template>> {
        Ok(self.templates.iter().find(|t| t.id == template_id).cloned())
    }

    fn list_template_entities(&self) -> Result<Vec<TemplateSummary>> {
        Ok(self
            .templates
            .iter()
            .map(|t| TemplateSummary {
                id: t.id.clone(),
                title: t.title.clone(),
            })
            .collect())
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

    fn template(id: &str, keys: &[&str]) -> Template {
        Template {
            id: id.to_string(),
            title: id.to_string(),
            columns: keys
                .iter()
                .map(|k| TemplateColumn {
                    key: k.to_string(),
                    label: k.to_string(),
                    field_type: FieldType::Text,
                    required: false,
                })
                .collect(),
        }
    }

    #[test]
    fn no_port_degrades_to_sentinel() {
        let resolution = resolve_schema(None, Some("any")).unwrap();
        assert!(resolution.schema.is_sentinel());
        assert!(resolution.schema.fields.is_empty());
    }

    #[test]
    fn assigned_template_resolves_fields() {
        let port = MemoryTemplates::new(vec![template("orders", &["name", "qty"])]);
        let resolution = resolve_schema(Some(&port), Some("orders")).unwrap();
        assert_eq!(resolution.schema.id, "tpl:orders");
        assert_eq!(resolution.schema.fields.len(), 2);
        assert!(resolution.assigned_template_id.is_none());
    }

    #[test]
    fn missing_assignment_prefers_test_template() {
        let port = MemoryTemplates::new(vec![template("alpha", &["a"]), template("test", &["t"])]);
        let resolution = resolve_schema(Some(&port), None).unwrap();
        assert_eq!(resolution.schema.id, "tpl:test");
        assert_eq!(resolution.assigned_template_id.as_deref(), Some("test"));
    }

    #[test]
    fn missing_assignment_falls_back_to_first_listed() {
        let port = MemoryTemplates::new(vec![template("alpha", &["a"])]);
        let resolution = resolve_schema(Some(&port), None).unwrap();
        assert_eq!(resolution.schema.id, "tpl:alpha");
        assert_eq!(resolution.assigned_template_id.as_deref(), Some("alpha"));
    }

    #[test]
    fn dangling_template_id_degrades_to_sentinel() {
        let port = MemoryTemplates::new(vec![template("alpha", &["a"])]);
        let resolution = resolve_schema(Some(&port), Some("gone")).unwrap();
        assert!(resolution.schema.is_sentinel());
    }

    #[test]
    fn empty_template_list_degrades_to_sentinel() {
        let port = MemoryTemplates::default();
        let resolution = resolve_schema(Some(&port), None).unwrap();
        assert!(resolution.schema.is_sentinel());
    }
}
