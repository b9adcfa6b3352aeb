use std::collections::HashMap;

use askama::Template;

use super::PageContext;
use crate::models::fields::format_timestamp;
use crate::models::form::{FieldDef, FormDefinition, FormFamily};

/// One row of the forms page: a family shown through its latest version.
pub struct FormFamilyRow {
    pub latest_id: i64,
    pub name: String,
    pub description: String,
    pub latest_version: String,
    pub version_count: usize,
    pub updated: String,
}

impl From<&FormFamily> for FormFamilyRow {
    fn from(family: &FormFamily) -> Self {
        let latest = family.latest();
        FormFamilyRow {
            latest_id: latest.id,
            name: family.name.clone(),
            description: latest.description.clone().unwrap_or_default(),
            latest_version: latest.version.clone(),
            version_count: family.versions.len(),
            updated: format_timestamp(latest.updated_at.as_deref().or(latest.created_at.as_deref())),
        }
    }
}

pub struct VersionOption {
    pub id: i64,
    pub version: String,
    pub is_selected: bool,
    pub is_latest: bool,
}

/// A schema field ready for rendering, with the value to pre-fill.
pub struct FieldView {
    pub name: String,
    pub label: String,
    pub control: &'static str,
    pub input_type: &'static str,
    pub required: bool,
    pub choices: Vec<Choice>,
    pub placeholder: String,
    pub value: String,
    pub checked: bool,
}

pub struct Choice {
    pub value: String,
    pub selected: bool,
}

impl FieldView {
    pub fn build(field: &FieldDef, values: &HashMap<String, String>) -> Self {
        let value = values.get(&field.name).cloned().unwrap_or_default();
        FieldView {
            name: field.name.clone(),
            label: field.display_label().to_string(),
            control: field.control(),
            input_type: field.input_type(),
            required: field.required,
            choices: field
                .options
                .iter()
                .map(|o| Choice {
                    value: o.clone(),
                    selected: *o == value,
                })
                .collect(),
            placeholder: field.placeholder.clone().unwrap_or_default(),
            checked: matches!(value.as_str(), "on" | "true" | "1"),
            value,
        }
    }
}

pub fn field_views(fields: &[FieldDef], values: &HashMap<String, String>) -> Vec<FieldView> {
    fields.iter().map(|f| FieldView::build(f, values)).collect()
}

#[derive(Template)]
#[template(path = "forms/list.html")]
pub struct FormListTemplate {
    pub ctx: PageContext,
    pub families: Vec<FormFamilyRow>,
    pub can_manage: bool,
}

#[derive(Template)]
#[template(path = "forms/detail.html")]
pub struct FormDetailTemplate {
    pub ctx: PageContext,
    pub form: FormDefinition,
    pub versions: Vec<VersionOption>,
    pub schema_kind: &'static str,
    pub schema_title: String,
    pub fields: Vec<FieldView>,
    pub schema_pretty: String,
    pub updated: String,
    pub can_manage: bool,
}

#[derive(Template)]
#[template(path = "forms/edit.html")]
pub struct FormEditTemplate {
    pub ctx: PageContext,
    pub form_action: String,
    pub form_title: String,
    pub name: String,
    pub description: String,
    pub schema_json: String,
    pub roles_allowed: String,
    pub errors: Vec<String>,
}

#[derive(Template)]
#[template(path = "forms/fill.html")]
pub struct FormFillTemplate {
    pub ctx: PageContext,
    pub form_id: i64,
    pub form_name: String,
    pub form_version: String,
    pub title: String,
    pub fields: Vec<FieldView>,
    pub errors: Vec<String>,
}
