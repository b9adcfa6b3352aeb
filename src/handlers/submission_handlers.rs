use std::collections::HashMap;

use actix_session::Session;
use actix_web::{HttpResponse, web};
use serde::Deserialize;

use crate::api::ApiClient;
use crate::auth::csrf;
use crate::auth::session::{api_for, current_actor, flash, flash_error};
use crate::autosave::DraftSaves;
use crate::config::AppConfig;
use crate::errors::{AppError, redirect, render};
use crate::models::form::{self, FormSchema, group_versions};
use crate::models::pagination::{Page, PageRequest, SortSpec};
use crate::models::submission::{
    self, Submission, SubmissionFilter, SubmissionStatus, SubmissionUpdate, TransitionRequest, WorkflowAction,
};
use crate::models::user::Actor;
use crate::templates_structs::{
    DataField, FilterForm, FormOption, HistoryView, PageContext, PagerView, StatusOption,
    SubmissionDetailTemplate, SubmissionEditTemplate, SubmissionListTemplate, SubmissionRow,
    SubmissionTableTemplate, SubmissionView, field_views,
};

#[derive(Deserialize)]
pub struct ActionForm {
    pub versao: i64,
    #[serde(default)]
    pub texto: String,
    pub csrf_token: String,
}

#[derive(Deserialize)]
pub struct DeleteForm {
    #[serde(default)]
    pub motivo: String,
    pub csrf_token: String,
}

/// Auto-save payload posted by the edit page.
#[derive(Deserialize)]
pub struct DraftPayload {
    pub versao: i64,
    pub data: serde_json::Map<String, serde_json::Value>,
}

const CSRF_FIELD: &str = "csrf_token";
const VERSAO_FIELD: &str = "versao";
const INTENT_FIELD: &str = "intent";

fn query_text<'a>(query: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    query.get(key).map(|v| v.trim()).filter(|v| !v.is_empty())
}

pub async fn list(
    api: web::Data<ApiClient>,
    config: web::Data<AppConfig>,
    session: Session,
    query: web::Query<HashMap<String, String>>,
) -> Result<HttpResponse, AppError> {
    let actor = current_actor(&session)?;
    let api = api_for(&session, &api)?;

    let filter = SubmissionFilter::from_query(&query);
    let pagina = query_text(&query, "pagina").and_then(|p| p.parse().ok()).unwrap_or(1);
    let sort = SortSpec::from_params(query_text(&query, "ordenarPor"), query_text(&query, "direcao"));
    let request = PageRequest::new(pagina, config.page_size).with_sort(sort.clone());

    let (page, forms) = tokio::join!(
        submission::find_paginated(&api, &filter, &request),
        form::find_all(&api),
    );

    let mut load_error = None;
    let page = page.unwrap_or_else(|e| {
        load_error = Some(e.message().to_string());
        Page::from_response(&serde_json::Value::Null, &request)
    });
    let forms = forms
        .map(|forms| {
            group_versions(&forms)
                .iter()
                .flat_map(|family| family.versions.iter())
                .map(|f| FormOption {
                    id: f.id,
                    label: format!("{} (v{})", f.name, f.version),
                    selected: Some(f.id) == filter.form_id,
                })
                .collect()
        })
        .unwrap_or_else(|e| {
            log::warn!("form list for filter unavailable: {e}");
            Vec::new()
        });

    // filters and sort carried into pager links; `pagina` is appended there
    let mut carried = filter.to_query_params();
    if !sort.column.is_empty() {
        carried.push(("ordenarPor".to_string(), sort.column.clone()));
        carried.push(("direcao".to_string(), sort.dir_str().to_string()));
    }
    let base_query = serde_urlencoded::to_string(&carried).unwrap_or_default();

    let rows = page
        .itens
        .iter()
        .map(|s| SubmissionRow::new(s, s.available_actions(&actor)))
        .collect();

    let ctx = PageContext::build(&session, &api, &config, "/submissions").await?;
    render(SubmissionListTemplate {
        ctx,
        rows,
        filter: FilterForm::from(&filter),
        statuses: StatusOption::all(filter.status),
        forms,
        pager: PagerView::new(&page, &base_query),
        sort_column: sort.column.clone(),
        sort_dir: sort.dir_str().to_string(),
        toggle_dir: sort.toggle_dir().to_string(),
        load_error,
    })
}

fn can_delete(submission: &Submission, actor: &Actor) -> bool {
    !submission.excluida && (actor.role.is_elevated() || actor.owns(submission.user_id))
}

pub async fn detail(
    api: web::Data<ApiClient>,
    config: web::Data<AppConfig>,
    session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let actor = current_actor(&session)?;
    let api = api_for(&session, &api)?;

    let (found, history) = tokio::join!(submission::find_by_id(&api, id), submission::find_history(&api, id));
    let found = found?;
    let history = match history {
        Ok(entries) if !entries.is_empty() => entries,
        Ok(_) => found.historicos.clone(),
        Err(e) => {
            log::warn!("history for submission {id} unavailable: {e}");
            found.historicos.clone()
        }
    };

    let actions = found
        .available_actions(&actor)
        .into_iter()
        .filter(|a| *a != WorkflowAction::View)
        .map(Into::into)
        .collect();

    let ctx = PageContext::build(&session, &api, &config, "/submissions").await?;
    render(SubmissionDetailTemplate {
        ctx,
        submission: SubmissionView::from(&found),
        fields: found
            .data_fields()
            .into_iter()
            .map(|(name, value)| DataField { name, value })
            .collect(),
        history: history.iter().map(HistoryView::from).collect(),
        actions,
        can_delete: can_delete(&found, &actor),
    })
}

/// Load a submission the actor may edit, with its form schema.
async fn load_editable(
    api: &ApiClient,
    actor: &Actor,
    id: i64,
) -> Result<(Submission, String, FormSchema), AppError> {
    let found = submission::find_by_id(api, id).await?;
    if !found.available_actions(actor).contains(&WorkflowAction::Edit) {
        return Err(AppError::PermissionDenied(format!("edit submission {id}")));
    }
    let definition = form::find_by_id(api, found.form_id).await?;
    let schema = FormSchema::parse(&definition.schema_json)
        .map_err(|e| {
            AppError::Api(crate::api::ApiError::unexpected(format!("Schema inválido: {e}")))
        })?;
    let name = format!("{} (v{})", definition.name, definition.version);
    Ok((found, name, schema))
}

pub async fn edit_form(
    api: web::Data<ApiClient>,
    config: web::Data<AppConfig>,
    drafts: web::Data<DraftSaves>,
    session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let actor = current_actor(&session)?;
    let api = api_for(&session, &api)?;

    let (found, form_name, schema) = match load_editable(&api, &actor, id).await {
        Ok(loaded) => loaded,
        Err(AppError::PermissionDenied(_)) => {
            flash_error(&session, "Apenas rascunhos podem ser editados.");
            return Ok(redirect(format!("/submissions/{id}")));
        }
        Err(e) => return Err(e),
    };
    let values: HashMap<String, String> = found.data_fields().into_iter().collect();
    let versao = drafts
        .known_versao(actor.user_id, id)
        .map_or(found.versao, |known| known.max(found.versao));

    let ctx = PageContext::build(&session, &api, &config, "/submissions").await?;
    render(SubmissionEditTemplate {
        ctx,
        submission_id: id,
        versao,
        form_name,
        fields: field_views(&schema.fields(), &values),
        errors: vec![],
        autosave_delay_ms: config.autosave_delay.as_millis(),
    })
}

/// Explicit save of a draft. `intent=enviar` saves and then submits it.
pub async fn update(
    api: web::Data<ApiClient>,
    config: web::Data<AppConfig>,
    drafts: web::Data<DraftSaves>,
    session: Session,
    path: web::Path<i64>,
    values: web::Form<HashMap<String, String>>,
) -> Result<HttpResponse, AppError> {
    let values = values.into_inner();
    csrf::validate_csrf(&session, values.get(CSRF_FIELD).map(String::as_str).unwrap_or(""))?;
    let id = path.into_inner();
    let actor = current_actor(&session)?;
    let api = api_for(&session, &api)?;
    let (found, form_name, schema) = load_editable(&api, &actor, id).await?;

    // An explicit save supersedes any pending auto-save.
    let known = drafts.known_versao(actor.user_id, id);
    drafts.discard(actor.user_id, id);
    let posted = values.get(VERSAO_FIELD).and_then(|v| v.trim().parse::<i64>().ok());
    let versao = [posted, known, Some(found.versao)].into_iter().flatten().max().unwrap_or(found.versao);
    let submitting = values.get(INTENT_FIELD).is_some_and(|v| v == WorkflowAction::Enviar.token());

    let collected = if submitting { schema.collect(&values) } else { Ok(schema.collect_draft(&values)) };
    let mut errors = Vec::new();
    match collected {
        Ok(data) => {
            let update = SubmissionUpdate {
                data_json: serde_json::Value::Object(data).to_string(),
                versao,
            };
            match submission::update(&api, id, &update).await {
                Ok(saved) if submitting => {
                    let versao = match submission::versao_after_update(&api, id, saved).await {
                        Ok(versao) => versao,
                        Err(e) => {
                            flash_error(&session, e.message());
                            return Ok(redirect(format!("/submissions/{id}/edit")));
                        }
                    };
                    let request = TransitionRequest::Enviar { versao, comentario: None };
                    return match submission::request_transition(&api, id, &request).await {
                        Ok(()) => {
                            flash(&session, "Submissão enviada.");
                            Ok(redirect(format!("/submissions/{id}")))
                        }
                        Err(e) => {
                            flash_error(&session, e.message());
                            Ok(redirect(format!("/submissions/{id}/edit")))
                        }
                    };
                }
                Ok(_) => {
                    flash(&session, "Rascunho salvo.");
                    return Ok(redirect(format!("/submissions/{id}")));
                }
                Err(e) => errors.push(e.message().to_string()),
            }
        }
        Err(problems) => errors = problems,
    }

    let ctx = PageContext::build(&session, &api, &config, "/submissions").await?;
    render(SubmissionEditTemplate {
        ctx,
        submission_id: id,
        versao,
        form_name,
        fields: field_views(&schema.fields(), &values),
        errors,
        autosave_delay_ms: config.autosave_delay.as_millis(),
    })
}

/// Run a workflow transition. Failures are shown as a flash on the detail
/// page; the displayed status only changes after a successful reload.
pub async fn action(
    api: web::Data<ApiClient>,
    drafts: web::Data<DraftSaves>,
    session: Session,
    path: web::Path<(i64, String)>,
    form: web::Form<ActionForm>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let (id, token) = path.into_inner();
    let back = format!("/submissions/{id}");
    let action = WorkflowAction::from_token(&token).ok_or(AppError::NotFound)?;
    let actor = current_actor(&session)?;
    let api = api_for(&session, &api)?;

    let request = match TransitionRequest::build(action, form.versao, Some(&form.texto)) {
        Ok(request) => request,
        Err(message) => {
            flash_error(&session, message);
            return Ok(redirect(back));
        }
    };

    let found = submission::find_by_id(&api, id).await?;
    if !found.available_actions(&actor).contains(&action) {
        flash_error(&session, format!("Ação '{}' não disponível para esta submissão.", action.label()));
        return Ok(redirect(back));
    }

    if found.status == SubmissionStatus::Draft {
        drafts.discard(actor.user_id, id);
    }
    match submission::request_transition(&api, id, &request).await {
        Ok(()) => {
            log::info!("submission {id}: {} by user {}", action.token(), actor.user_id);
            let target = action.target_status().map(|s| s.label()).unwrap_or("");
            flash(&session, format!("Ação \"{}\" concluída. Novo status: {target}.", action.label()));
        }
        Err(e) => flash_error(&session, e.message()),
    }
    Ok(redirect(back))
}

pub async fn delete(
    api: web::Data<ApiClient>,
    drafts: web::Data<DraftSaves>,
    session: Session,
    path: web::Path<i64>,
    form: web::Form<DeleteForm>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let id = path.into_inner();
    let actor = current_actor(&session)?;
    let api = api_for(&session, &api)?;

    drafts.discard(actor.user_id, id);
    match submission::soft_delete(&api, id, &form.motivo).await {
        Ok(()) => {
            log::info!("submission {id} deleted by user {}", actor.user_id);
            flash(&session, "Submissão excluída.");
            Ok(redirect("/submissions"))
        }
        Err(e) => {
            flash_error(&session, e.message());
            Ok(redirect(format!("/submissions/{id}")))
        }
    }
}

/// Auto-save: schedule a debounced save of the posted values. Answers at
/// once; the save itself runs after the configured delay.
pub async fn autosave(
    api: web::Data<ApiClient>,
    config: web::Data<AppConfig>,
    drafts: web::Data<DraftSaves>,
    session: Session,
    path: web::Path<i64>,
    body: web::Json<DraftPayload>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let actor = current_actor(&session)?;
    let api = api_for(&session, &api)?;
    let payload = body.into_inner();

    let data_json = serde_json::Value::Object(payload.data).to_string();
    drafts.record_edit(api, actor.user_id, id, payload.versao, data_json);

    Ok(HttpResponse::Accepted().json(serde_json::json!({
        "scheduled": true,
        "delayMs": config.autosave_delay.as_millis() as u64,
    })))
}

/// Leaving the edit page: drop a save that has not fired yet.
pub async fn discard_draft(
    drafts: web::Data<DraftSaves>,
    session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let actor = current_actor(&session)?;
    drafts.discard(actor.user_id, id);
    Ok(HttpResponse::NoContent().finish())
}

pub async fn mine(
    api: web::Data<ApiClient>,
    config: web::Data<AppConfig>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let actor = current_actor(&session)?;
    let api = api_for(&session, &api)?;

    let mut ctx = PageContext::build(&session, &api, &config, "/my-submissions").await?;
    let rows = match submission::find_mine(&api).await {
        Ok(found) => found
            .iter()
            .map(|s| SubmissionRow::new(s, s.available_actions(&actor)))
            .collect(),
        Err(e) => {
            ctx.flash_error = Some(e.message().to_string());
            Vec::new()
        }
    };

    render(SubmissionTableTemplate {
        ctx,
        title: "Minhas submissões".to_string(),
        back_url: None,
        rows,
    })
}
