//! Form schemas.
//!
//! A form's `schemaJson` is either the console's own `{title, fields[]}`
//! shape or a tree produced by the external visual designer. The designer
//! owns its format; the console only walks it to find input elements so a
//! plain HTML rendering can collect values.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldDef {
    pub name: String,
    #[serde(default)]
    pub label: String,
    #[serde(rename = "type", default = "default_field_type")]
    pub field_type: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub placeholder: Option<String>,
}

fn default_field_type() -> String {
    "text".to_string()
}

impl FieldDef {
    pub fn display_label(&self) -> &str {
        if self.label.trim().is_empty() { &self.name } else { &self.label }
    }

    /// HTML control to render: `textarea`, `select`, `checkbox` or `input`.
    pub fn control(&self) -> &'static str {
        match self.field_type.as_str() {
            "textarea" | "comment" => "textarea",
            "select" | "dropdown" | "radio" | "radiogroup" => "select",
            "checkbox" | "boolean" => "checkbox",
            _ => "input",
        }
    }

    /// `type` attribute for `<input>` controls.
    pub fn input_type(&self) -> &'static str {
        match self.field_type.as_str() {
            "number" => "number",
            "date" => "date",
            "email" => "email",
            _ => "text",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct NativeSchema {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub fields: Vec<FieldDef>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormSchema {
    Native(NativeSchema),
    Designer(Value),
}

impl FormSchema {
    pub fn parse(raw: &str) -> Result<Self, String> {
        let value: Value = serde_json::from_str(raw).map_err(|e| format!("JSON inválido: {e}"))?;
        if !value.is_object() {
            return Err("O schema deve ser um objeto JSON.".to_string());
        }
        if value.get("fields").is_some_and(Value::is_array) {
            let native: NativeSchema = serde_json::from_value(value)
                .map_err(|e| format!("Campos inválidos no schema: {e}"))?;
            return Ok(FormSchema::Native(native));
        }
        Ok(FormSchema::Designer(value))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            FormSchema::Native(_) => "native",
            FormSchema::Designer(_) => "designer",
        }
    }

    pub fn title(&self) -> String {
        match self {
            FormSchema::Native(native) => native.title.clone(),
            FormSchema::Designer(tree) => tree
                .get("title")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        }
    }

    /// Input fields, in document order.
    pub fn fields(&self) -> Vec<FieldDef> {
        match self {
            FormSchema::Native(native) => native.fields.clone(),
            FormSchema::Designer(tree) => {
                let mut out = Vec::new();
                collect_designer_fields(tree, &mut out);
                out
            }
        }
    }

    /// Validate submitted values and build the `dataJson` object. Returns
    /// the list of problems when required fields are blank or numbers are
    /// malformed.
    pub fn collect(&self, values: &HashMap<String, String>) -> Result<Map<String, Value>, Vec<String>> {
        let mut data = Map::new();
        let mut errors = Vec::new();

        for field in self.fields() {
            let raw = values.get(&field.name).map(|v| v.trim()).unwrap_or("");
            let value = match field.control() {
                "checkbox" => Value::Bool(matches!(raw, "on" | "true" | "1")),
                _ if raw.is_empty() => {
                    if field.required {
                        errors.push(format!("{} é obrigatório.", field.display_label()));
                    }
                    continue;
                }
                _ if field.input_type() == "number" => match raw.parse::<f64>() {
                    Ok(n) => serde_json::Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null),
                    Err(_) => {
                        errors.push(format!("{} deve ser um número.", field.display_label()));
                        continue;
                    }
                },
                _ => Value::String(raw.to_string()),
            };
            data.insert(field.name.clone(), value);
        }

        if errors.is_empty() { Ok(data) } else { Err(errors) }
    }

    /// Lenient variant for drafts: keeps whatever was typed, skips blanks
    /// and never fails. Numbers that do not parse are kept as text.
    pub fn collect_draft(&self, values: &HashMap<String, String>) -> Map<String, Value> {
        let mut data = Map::new();
        for field in self.fields() {
            let raw = values.get(&field.name).map(|v| v.trim()).unwrap_or("");
            let value = match field.control() {
                "checkbox" => Value::Bool(matches!(raw, "on" | "true" | "1")),
                _ if raw.is_empty() => continue,
                _ if field.input_type() == "number" => raw
                    .parse::<f64>()
                    .ok()
                    .and_then(serde_json::Number::from_f64)
                    .map(Value::Number)
                    .unwrap_or_else(|| Value::String(raw.to_string())),
                _ => Value::String(raw.to_string()),
            };
            data.insert(field.name.clone(), value);
        }
        data
    }
}

const CONTAINER_TYPES: [&str; 3] = ["panel", "page", "container"];

fn collect_designer_fields(node: &Value, out: &mut Vec<FieldDef>) {
    match node {
        Value::Array(items) => items.iter().for_each(|item| collect_designer_fields(item, out)),
        Value::Object(obj) => {
            let name = obj
                .get("name")
                .or_else(|| obj.get("key"))
                .and_then(Value::as_str);
            let kind = obj.get("type").and_then(Value::as_str);
            if let (Some(name), Some(kind)) = (name, kind) {
                if !CONTAINER_TYPES.contains(&kind) {
                    out.push(designer_field(name, kind, obj));
                }
            }
            for (key, child) in obj {
                if child.is_array() || (child.is_object() && key != "validate") {
                    collect_designer_fields(child, out);
                }
            }
        }
        _ => {}
    }
}

fn designer_field(name: &str, kind: &str, obj: &Map<String, Value>) -> FieldDef {
    let label = obj
        .get("title")
        .or_else(|| obj.get("label"))
        .and_then(Value::as_str)
        .unwrap_or(name)
        .to_string();
    let required = obj.get("isRequired").and_then(Value::as_bool).unwrap_or(false)
        || obj
            .get("validate")
            .and_then(|v| v.get("required"))
            .and_then(Value::as_bool)
            .unwrap_or(false);
    let options = obj
        .get("choices")
        .or_else(|| obj.get("options"))
        .and_then(Value::as_array)
        .map(|choices| {
            choices
                .iter()
                .filter_map(|c| match c {
                    Value::String(s) => Some(s.clone()),
                    Value::Object(o) => o
                        .get("value")
                        .or_else(|| o.get("text"))
                        .map(|v| v.as_str().map(String::from).unwrap_or_else(|| v.to_string())),
                    other => Some(other.to_string()),
                })
                .collect()
        })
        .unwrap_or_default();
    let field_type = match (kind, obj.get("inputType").and_then(Value::as_str)) {
        ("text", Some(input)) => input.to_string(),
        (kind, _) => kind.to_string(),
    };

    FieldDef {
        name: name.to_string(),
        label,
        field_type,
        required,
        options,
        placeholder: obj.get("placeholder").and_then(Value::as_str).map(String::from),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_schema_detected() {
        let schema = FormSchema::parse(
            r#"{"title":"Férias","fields":[
                {"name":"dias","label":"Dias","type":"number","required":true}
            ]}"#,
        )
        .expect("parse");
        assert_eq!(schema.kind(), "native");
        assert_eq!(schema.title(), "Férias");
        assert_eq!(schema.fields()[0].input_type(), "number");
    }

    #[test]
    fn designer_tree_is_walked_for_inputs() {
        let schema = FormSchema::parse(
            r#"{"title":"Compra","pages":[{"name":"p1","type":"page","elements":[
                {"type":"text","name":"item","title":"Item","isRequired":true},
                {"type":"panel","name":"pn","elements":[
                    {"type":"dropdown","name":"urgencia",
                     "choices":["baixa",{"value":"alta","text":"Alta"}]}
                ]},
                {"type":"text","inputType":"date","name":"prazo"}
            ]}]}"#,
        )
        .expect("parse");
        assert_eq!(schema.kind(), "designer");
        let fields = schema.fields();
        let names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["item", "urgencia", "prazo"]);
        assert!(fields[0].required);
        assert_eq!(fields[1].options, vec!["baixa", "alta"]);
        assert_eq!(fields[1].control(), "select");
        assert_eq!(fields[2].input_type(), "date");
    }

    #[test]
    fn draft_collection_ignores_required_and_keeps_text() {
        let schema = FormSchema::parse(
            r#"{"fields":[{"name":"nome","required":true},{"name":"idade","type":"number"}]}"#,
        )
        .expect("parse");
        let values: HashMap<String, String> =
            [("idade".to_string(), "doze".to_string())].into_iter().collect();
        let data = schema.collect_draft(&values);
        assert!(!data.contains_key("nome"));
        assert_eq!(data["idade"], Value::String("doze".to_string()));
    }

    #[test]
    fn collect_reports_missing_required_fields() {
        let schema = FormSchema::parse(
            r#"{"title":"t","fields":[
                {"name":"nome","label":"Nome","required":true},
                {"name":"idade","type":"number"},
                {"name":"aceite","type":"checkbox"}
            ]}"#,
        )
        .expect("parse");
        let mut values = HashMap::new();
        values.insert("idade".to_string(), "x".to_string());
        let errors = schema.collect(&values).expect_err("invalid");
        assert_eq!(
            errors,
            vec!["Nome é obrigatório.".to_string(), "idade deve ser um número.".to_string()]
        );

        values.insert("nome".to_string(), " Ana ".to_string());
        values.insert("idade".to_string(), "30".to_string());
        let data = schema.collect(&values).expect("valid");
        assert_eq!(data.get("nome"), Some(&Value::String("Ana".into())));
        assert_eq!(data.get("idade").and_then(Value::as_f64), Some(30.0));
        assert_eq!(data.get("aceite"), Some(&Value::Bool(false)));
    }

    #[test]
    fn rejects_non_object_schema() {
        assert!(FormSchema::parse("[1,2]").is_err());
        assert!(FormSchema::parse("{oops").is_err());
    }
}
