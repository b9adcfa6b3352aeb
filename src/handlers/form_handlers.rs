use std::collections::HashMap;

use actix_session::Session;
use actix_web::{HttpResponse, web};
use serde::Deserialize;

use crate::api::ApiClient;
use crate::auth::session::{api_for, current_actor, current_user, flash, flash_error, require_elevated};
use crate::auth::{csrf, validate};
use crate::config::AppConfig;
use crate::errors::{AppError, redirect, render};
use crate::handlers::auth_handlers::CsrfOnly;
use crate::models::fields::format_timestamp;
use crate::models::form::{self, FormDefinition, FormFamily, FormInput, FormSchema, group_versions};
use crate::models::submission::{self, NewSubmission};
use crate::templates_structs::{
    FormDetailTemplate, FormEditTemplate, FormFamilyRow, FormFillTemplate, FormListTemplate, PageContext,
    SubmissionRow, SubmissionTableTemplate, VersionOption, field_views,
};

#[derive(Deserialize)]
pub struct FormForm {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub schema_json: String,
    #[serde(default)]
    pub roles_allowed: String,
    pub csrf_token: String,
}

#[derive(Deserialize)]
pub struct VersionQuery {
    pub version: Option<i64>,
}

/// Form-fill POST keys that are not schema fields.
const CSRF_FIELD: &str = "csrf_token";
const INTENT_FIELD: &str = "intent";

fn family_of(families: Vec<FormFamily>, id: i64) -> Option<FormFamily> {
    families.into_iter().find(|f| f.versions.iter().any(|v| v.id == id))
}

fn validate_form(form: &FormForm) -> Vec<String> {
    validate::collect([
        validate::validate_required(&form.name, "Nome", 200),
        validate::validate_schema_json(&form.schema_json),
    ])
}

fn form_input(form: &FormForm) -> FormInput {
    let description = form.description.trim();
    FormInput {
        name: form.name.trim().to_string(),
        description: (!description.is_empty()).then(|| description.to_string()),
        schema_json: form.schema_json.trim().to_string(),
        roles_allowed: form.roles_allowed.trim().to_string(),
    }
}

pub async fn list(
    api: web::Data<ApiClient>,
    config: web::Data<AppConfig>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let role = current_user(&session)?.role();
    let api = api_for(&session, &api)?;
    let mut ctx = PageContext::build(&session, &api, &config, "/forms").await?;

    let rows = match form::find_all(&api).await {
        Ok(forms) => group_versions(&forms)
            .iter()
            .filter(|f| f.latest().is_visible_to(role))
            .map(FormFamilyRow::from)
            .collect(),
        Err(e) => {
            ctx.flash_error = Some(e.message().to_string());
            Vec::new()
        }
    };

    render(FormListTemplate {
        can_manage: ctx.is_elevated,
        ctx,
        families: rows,
    })
}

pub async fn detail(
    api: web::Data<ApiClient>,
    config: web::Data<AppConfig>,
    session: Session,
    path: web::Path<i64>,
    query: web::Query<VersionQuery>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let role = current_user(&session)?.role();
    let api = api_for(&session, &api)?;

    let forms = form::find_all(&api).await?;
    let family = family_of(group_versions(&forms), id).ok_or(AppError::NotFound)?;
    let selected = family.select(query.version.or(Some(id))).clone();
    if !selected.is_visible_to(role) {
        return Err(AppError::PermissionDenied(format!("form {}", selected.id)));
    }

    let versions = family
        .versions
        .iter()
        .enumerate()
        .map(|(i, v)| VersionOption {
            id: v.id,
            version: v.version.clone(),
            is_selected: v.id == selected.id,
            is_latest: i == family.latest,
        })
        .collect();

    let (schema_kind, schema_title, fields) = match FormSchema::parse(&selected.schema_json) {
        Ok(schema) => (schema.kind(), schema.title(), field_views(&schema.fields(), &HashMap::new())),
        Err(e) => {
            log::warn!("form {} has an unreadable schema: {e}", selected.id);
            ("inválido", String::new(), Vec::new())
        }
    };
    let schema_pretty = serde_json::from_str::<serde_json::Value>(&selected.schema_json)
        .ok()
        .and_then(|v| serde_json::to_string_pretty(&v).ok())
        .unwrap_or_else(|| selected.schema_json.clone());

    let ctx = PageContext::build(&session, &api, &config, "/forms").await?;
    render(FormDetailTemplate {
        can_manage: ctx.is_elevated,
        ctx,
        updated: format_timestamp(selected.updated_at.as_deref().or(selected.created_at.as_deref())),
        form: selected,
        versions,
        schema_kind,
        schema_title,
        fields,
        schema_pretty,
    })
}

pub async fn new_form(
    api: web::Data<ApiClient>,
    config: web::Data<AppConfig>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    require_elevated(&session)?;
    let api = api_for(&session, &api)?;
    let ctx = PageContext::build(&session, &api, &config, "/forms").await?;
    render(FormEditTemplate {
        ctx,
        form_action: "/forms".to_string(),
        form_title: "Novo formulário".to_string(),
        name: String::new(),
        description: String::new(),
        schema_json: "{\n  \"title\": \"\",\n  \"fields\": []\n}".to_string(),
        roles_allowed: String::new(),
        errors: vec![],
    })
}

pub async fn create(
    api: web::Data<ApiClient>,
    config: web::Data<AppConfig>,
    session: Session,
    form: web::Form<FormForm>,
) -> Result<HttpResponse, AppError> {
    require_elevated(&session)?;
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let api = api_for(&session, &api)?;

    let mut errors = validate_form(&form);
    if errors.is_empty() {
        match form::create(&api, &form_input(&form)).await {
            Ok(created) => {
                flash(&session, "Formulário criado.");
                let location = created
                    .map(|f| format!("/forms/{}", f.id))
                    .unwrap_or_else(|| "/forms".to_string());
                return Ok(redirect(location));
            }
            Err(e) => errors.push(e.message().to_string()),
        }
    }

    let ctx = PageContext::build(&session, &api, &config, "/forms").await?;
    render(FormEditTemplate {
        ctx,
        form_action: "/forms".to_string(),
        form_title: "Novo formulário".to_string(),
        name: form.name.clone(),
        description: form.description.clone(),
        schema_json: form.schema_json.clone(),
        roles_allowed: form.roles_allowed.clone(),
        errors,
    })
}

pub async fn edit_form(
    api: web::Data<ApiClient>,
    config: web::Data<AppConfig>,
    session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    require_elevated(&session)?;
    let id = path.into_inner();
    let api = api_for(&session, &api)?;
    let existing: FormDefinition = form::find_by_id(&api, id).await?;

    let ctx = PageContext::build(&session, &api, &config, "/forms").await?;
    render(FormEditTemplate {
        ctx,
        form_action: format!("/forms/{id}"),
        form_title: format!("Editar formulário (v{})", existing.version),
        name: existing.name,
        description: existing.description.unwrap_or_default(),
        schema_json: existing.schema_json,
        roles_allowed: existing.roles_allowed.unwrap_or_default(),
        errors: vec![],
    })
}

pub async fn update(
    api: web::Data<ApiClient>,
    config: web::Data<AppConfig>,
    session: Session,
    path: web::Path<i64>,
    form: web::Form<FormForm>,
) -> Result<HttpResponse, AppError> {
    require_elevated(&session)?;
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let id = path.into_inner();
    let api = api_for(&session, &api)?;

    let mut errors = validate_form(&form);
    if errors.is_empty() {
        match form::update(&api, id, &form_input(&form)).await {
            Ok(()) => {
                flash(&session, "Formulário atualizado.");
                return Ok(redirect(format!("/forms/{id}")));
            }
            Err(e) => errors.push(e.message().to_string()),
        }
    }

    let ctx = PageContext::build(&session, &api, &config, "/forms").await?;
    render(FormEditTemplate {
        ctx,
        form_action: format!("/forms/{id}"),
        form_title: "Editar formulário".to_string(),
        name: form.name.clone(),
        description: form.description.clone(),
        schema_json: form.schema_json.clone(),
        roles_allowed: form.roles_allowed.clone(),
        errors,
    })
}

pub async fn delete(
    api: web::Data<ApiClient>,
    session: Session,
    path: web::Path<i64>,
    form: web::Form<CsrfOnly>,
) -> Result<HttpResponse, AppError> {
    require_elevated(&session)?;
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let id = path.into_inner();
    let api = api_for(&session, &api)?;

    match form::delete(&api, id).await {
        Ok(()) => {
            log::info!("form {id} deleted");
            flash(&session, "Formulário excluído.");
            Ok(redirect("/forms"))
        }
        Err(e) => {
            flash_error(&session, e.message());
            Ok(redirect(format!("/forms/{id}")))
        }
    }
}

async fn load_fillable(
    api: &ApiClient,
    session: &Session,
    id: i64,
) -> Result<(FormDefinition, FormSchema), AppError> {
    let role = current_user(session)?.role();
    let definition = form::find_by_id(api, id).await?;
    if !definition.is_visible_to(role) {
        return Err(AppError::PermissionDenied(format!("form {id}")));
    }
    let schema = FormSchema::parse(&definition.schema_json).map_err(|e| {
        AppError::Api(crate::api::ApiError::unexpected(format!("Schema inválido: {e}")))
    })?;
    Ok((definition, schema))
}

pub async fn fill_form(
    api: web::Data<ApiClient>,
    config: web::Data<AppConfig>,
    session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let api = api_for(&session, &api)?;
    let (definition, schema) = load_fillable(&api, &session, id).await?;

    let ctx = PageContext::build(&session, &api, &config, "/forms").await?;
    render(FormFillTemplate {
        ctx,
        form_id: definition.id,
        form_name: definition.name,
        form_version: definition.version,
        title: schema.title(),
        fields: field_views(&schema.fields(), &HashMap::new()),
        errors: vec![],
    })
}

/// Fill submission. `intent=draft` stores a workflow draft and opens it for
/// editing; anything else submits through the form-fill resource.
pub async fn fill_submit(
    api: web::Data<ApiClient>,
    config: web::Data<AppConfig>,
    session: Session,
    path: web::Path<i64>,
    values: web::Form<HashMap<String, String>>,
) -> Result<HttpResponse, AppError> {
    let values = values.into_inner();
    csrf::validate_csrf(&session, values.get(CSRF_FIELD).map(String::as_str).unwrap_or(""))?;
    let id = path.into_inner();
    let api = api_for(&session, &api)?;
    let (definition, schema) = load_fillable(&api, &session, id).await?;
    let as_draft = values.get(INTENT_FIELD).is_some_and(|v| v == "draft");

    let collected = if as_draft { Ok(schema.collect_draft(&values)) } else { schema.collect(&values) };
    let mut errors = Vec::new();
    match collected {
        Ok(data) => {
            let new = NewSubmission {
                form_id: definition.id,
                data_json: serde_json::Value::Object(data).to_string(),
            };
            if as_draft {
                match submission::create_draft(&api, &new).await {
                    Ok(draft) => {
                        flash(&session, "Rascunho salvo.");
                        return Ok(redirect(format!("/submissions/{}/edit", draft.id)));
                    }
                    Err(e) => errors.push(e.message().to_string()),
                }
            } else {
                match submission::submit_form_fill(&api, &new).await {
                    Ok(()) => {
                        flash(&session, "Formulário enviado.");
                        return Ok(redirect("/my-submissions"));
                    }
                    Err(e) => errors.push(e.message().to_string()),
                }
            }
        }
        Err(problems) => errors = problems,
    }

    let ctx = PageContext::build(&session, &api, &config, "/forms").await?;
    render(FormFillTemplate {
        ctx,
        form_id: definition.id,
        form_name: definition.name,
        form_version: definition.version,
        title: schema.title(),
        fields: field_views(&schema.fields(), &values),
        errors,
    })
}

pub async fn submissions(
    api: web::Data<ApiClient>,
    config: web::Data<AppConfig>,
    session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let actor = current_actor(&session)?;
    let api = api_for(&session, &api)?;

    let (definition, rows) = tokio::join!(form::find_by_id(&api, id), submission::find_by_form(&api, id));
    let definition = definition?;
    let rows = rows?
        .iter()
        .map(|s| SubmissionRow::new(s, s.available_actions(&actor)))
        .collect();

    let ctx = PageContext::build(&session, &api, &config, "/forms").await?;
    render(SubmissionTableTemplate {
        ctx,
        title: format!("Submissões de {} (v{})", definition.name, definition.version),
        back_url: Some(format!("/forms/{id}")),
        rows,
    })
}
