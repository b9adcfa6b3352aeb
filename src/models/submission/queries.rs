use serde_json::{Value, json};

use super::filter::SubmissionFilter;
use super::types::*;
use super::workflow::{MISSING_CANCEL_REASON, MISSING_DELETE_REASON, MISSING_REJECTION_REASON, TransitionRequest};
use crate::api::{ApiClient, ApiError};
use crate::models::envelope::normalize_list;
use crate::models::pagination::{Page, PageRequest};

const BASE: &str = "SubmissoesFormulario";

fn item_path(id: i64) -> String {
    format!("{BASE}/{id}")
}

/// Paginated, filtered list of workflow submissions.
pub async fn find_paginated(
    api: &ApiClient,
    filter: &SubmissionFilter,
    page: &PageRequest,
) -> Result<Page<Submission>, ApiError> {
    let mut query = filter.to_query_params();
    query.extend(page.to_query_params());
    let value: Value = api.get_with_query(BASE, &query, "carregar submissões").await?;
    Ok(Page::from_response(&value, page))
}

pub async fn find_by_id(api: &ApiClient, id: i64) -> Result<Submission, ApiError> {
    api.get(&item_path(id), "carregar submissão").await
}

pub async fn find_history(api: &ApiClient, id: i64) -> Result<Vec<HistoryEntry>, ApiError> {
    let value: Value = api
        .get(&format!("{}/historico", item_path(id)), "carregar histórico")
        .await?;
    Ok(normalize_list(&value))
}

pub async fn statistics(api: &ApiClient) -> Result<SubmissionStats, ApiError> {
    api.get(&format!("{BASE}/estatisticas"), "carregar estatísticas").await
}

/// Create a draft in the workflow resource.
pub async fn create_draft(api: &ApiClient, new: &NewSubmission) -> Result<Submission, ApiError> {
    api.post(BASE, new, "criar submissão").await
}

/// Update a draft's data. The backend rejects a stale `versao`.
pub async fn update(api: &ApiClient, id: i64, update: &SubmissionUpdate) -> Result<Option<Submission>, ApiError> {
    let value: Value = api.put(&item_path(id), update, "salvar submissão").await?;
    Ok(serde_json::from_value(value).ok())
}

/// The `versao` a follow-up request must carry after `update`. When the
/// backend answered without a body the submission is read back.
pub async fn versao_after_update(
    api: &ApiClient,
    id: i64,
    saved: Option<Submission>,
) -> Result<i64, ApiError> {
    match saved {
        Some(saved) => Ok(saved.versao),
        None => Ok(find_by_id(api, id).await?.versao),
    }
}

/// Soft delete. A blank reason never reaches the backend.
pub async fn soft_delete(api: &ApiClient, id: i64, motivo: &str) -> Result<(), ApiError> {
    let motivo = motivo.trim();
    if motivo.is_empty() {
        return Err(ApiError::validation(MISSING_DELETE_REASON));
    }
    api.delete(
        &item_path(id),
        &[("motivo".to_string(), motivo.to_string())],
        "excluir submissão",
    )
    .await
}

/// Ask the backend for a status transition. Required justifications are
/// checked again here so a blank one is never sent.
pub async fn request_transition(api: &ApiClient, id: i64, request: &TransitionRequest) -> Result<(), ApiError> {
    match request {
        TransitionRequest::Enviar { versao, comentario } => {
            api.post::<_, Value>(
                &format!("{}/enviar", item_path(id)),
                &json!({ "versao": versao, "comentario": comentario }),
                "enviar submissão",
            )
            .await?;
        }
        TransitionRequest::ColocarAnalise { versao, comentario } => {
            api.put::<_, Value>(
                &format!("{}/status", item_path(id)),
                &json!({
                    "novoStatus": SubmissionStatus::InReview.code(),
                    "versao": versao,
                    "comentario": comentario,
                }),
                "colocar submissão em análise",
            )
            .await?;
        }
        TransitionRequest::Aprovar { versao, comentario } => {
            api.post::<_, Value>(
                &format!("{}/aprovar", item_path(id)),
                &json!({ "versao": versao, "comentario": comentario }),
                "aprovar submissão",
            )
            .await?;
        }
        TransitionRequest::Rejeitar { versao, motivo } => {
            if motivo.trim().is_empty() {
                return Err(ApiError::validation(MISSING_REJECTION_REASON));
            }
            api.post::<_, Value>(
                &format!("{}/rejeitar", item_path(id)),
                &json!({ "versao": versao, "motivoRejeicao": motivo.trim() }),
                "rejeitar submissão",
            )
            .await?;
        }
        TransitionRequest::Cancelar { versao, motivo } => {
            if motivo.trim().is_empty() {
                return Err(ApiError::validation(MISSING_CANCEL_REASON));
            }
            api.post::<_, Value>(
                &format!("{}/cancelar", item_path(id)),
                &json!({ "versao": versao, "motivo": motivo.trim() }),
                "cancelar submissão",
            )
            .await?;
        }
    }
    Ok(())
}

// Form-fill resource: submissions created straight from a filled form and
// the per-form / per-user listings.

pub async fn submit_form_fill(api: &ApiClient, new: &NewSubmission) -> Result<(), ApiError> {
    api.post::<_, Value>("Submissions", new, "enviar formulário").await.map(|_| ())
}

pub async fn find_by_form(api: &ApiClient, form_id: i64) -> Result<Vec<Submission>, ApiError> {
    let value: Value = api
        .get(&format!("Submissions/form/{form_id}"), "carregar submissões do formulário")
        .await?;
    Ok(normalize_list(&value))
}

pub async fn find_mine(api: &ApiClient) -> Result<Vec<Submission>, ApiError> {
    let value: Value = api
        .get("Submissions/my-submissions", "carregar minhas submissões")
        .await?;
    Ok(normalize_list(&value))
}
