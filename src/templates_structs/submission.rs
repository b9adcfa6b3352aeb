use askama::Template;

use super::PageContext;
use super::form::FieldView;
use crate::models::fields::format_timestamp;
use crate::models::pagination::Page;
use crate::models::submission::{
    ActionLink, HistoryEntry, Submission, SubmissionFilter, SubmissionStatus, WorkflowAction,
};

/// Submission fields formatted for display.
pub struct SubmissionView {
    pub id: i64,
    pub form_id: i64,
    pub form_name: String,
    pub form_version: String,
    pub user_name: String,
    pub status_label: &'static str,
    pub status_color: &'static str,
    pub versao: i64,
    pub created: String,
    pub updated: String,
    pub submitted: String,
    pub approved: String,
    pub approver: String,
    pub rejection_reason: String,
    pub deleted: bool,
}

impl From<&Submission> for SubmissionView {
    fn from(s: &Submission) -> Self {
        SubmissionView {
            id: s.id,
            form_id: s.form_id,
            form_name: s.display_form_name(),
            form_version: s.form_version.clone(),
            user_name: s
                .user_name
                .clone()
                .or_else(|| s.user_id.map(|id| format!("Usuário #{id}")))
                .unwrap_or_default(),
            status_label: s.status.label(),
            status_color: s.status.color(),
            versao: s.versao,
            created: format_timestamp(s.created_at.as_deref()),
            updated: format_timestamp(s.updated_at.as_deref().or(s.created_at.as_deref())),
            submitted: format_timestamp(s.data_submissao.as_deref()),
            approved: format_timestamp(s.data_aprovacao.as_deref()),
            approver: s.usuario_aprovador_nome.clone().unwrap_or_default(),
            rejection_reason: s.motivo_rejeicao.clone().unwrap_or_default(),
            deleted: s.excluida,
        }
    }
}

pub struct SubmissionRow {
    pub view: SubmissionView,
    pub actions: Vec<ActionLink>,
}

impl SubmissionRow {
    pub fn new(submission: &Submission, actions: Vec<WorkflowAction>) -> Self {
        SubmissionRow {
            view: SubmissionView::from(submission),
            actions: actions.into_iter().map(ActionLink::from).collect(),
        }
    }
}

/// Filter values echoed back into the filter form.
#[derive(Default)]
pub struct FilterForm {
    pub form_id: String,
    pub user_id: String,
    pub status: String,
    pub data_inicial_criacao: String,
    pub data_final_criacao: String,
    pub data_inicial_submissao: String,
    pub data_final_submissao: String,
    pub usuario_aprovador_id: String,
    pub incluir_excluidas: bool,
}

impl From<&SubmissionFilter> for FilterForm {
    fn from(filter: &SubmissionFilter) -> Self {
        let id = |v: Option<i64>| v.map(|v| v.to_string()).unwrap_or_default();
        let day = |d: Option<chrono::NaiveDate>| d.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default();
        FilterForm {
            form_id: id(filter.form_id),
            user_id: id(filter.user_id),
            status: filter.status.map(|s| s.code().to_string()).unwrap_or_default(),
            data_inicial_criacao: day(filter.data_inicial_criacao),
            data_final_criacao: day(filter.data_final_criacao),
            data_inicial_submissao: day(filter.data_inicial_submissao),
            data_final_submissao: day(filter.data_final_submissao),
            usuario_aprovador_id: id(filter.usuario_aprovador_id),
            incluir_excluidas: filter.incluir_excluidas,
        }
    }
}

pub struct StatusOption {
    pub code: i64,
    pub label: &'static str,
    pub selected: bool,
}

impl StatusOption {
    pub fn all(selected: Option<SubmissionStatus>) -> Vec<Self> {
        SubmissionStatus::ALL
            .iter()
            .map(|s| StatusOption {
                code: s.code(),
                label: s.label(),
                selected: Some(*s) == selected,
            })
            .collect()
    }
}

pub struct FormOption {
    pub id: i64,
    pub label: String,
    pub selected: bool,
}

pub struct PagerView {
    pub pagina: u32,
    pub total_paginas: u32,
    pub total_itens: u64,
    pub prev_url: Option<String>,
    pub next_url: Option<String>,
}

impl PagerView {
    /// `base_query` is the encoded filter/sort query without `pagina`.
    pub fn new<T>(page: &Page<T>, base_query: &str) -> Self {
        let url = |p: u32| {
            if base_query.is_empty() {
                format!("/submissions?pagina={p}")
            } else {
                format!("/submissions?{base_query}&pagina={p}")
            }
        };
        PagerView {
            pagina: page.pagina,
            total_paginas: page.total_paginas,
            total_itens: page.total_itens,
            prev_url: page.has_previous().then(|| url(page.pagina - 1)),
            next_url: page.has_next().then(|| url(page.pagina + 1)),
        }
    }
}

pub struct DataField {
    pub name: String,
    pub value: String,
}

pub struct HistoryView {
    pub acao: String,
    pub usuario: String,
    pub data: String,
    pub comentario: String,
}

impl From<&HistoryEntry> for HistoryView {
    fn from(h: &HistoryEntry) -> Self {
        HistoryView {
            acao: h.acao.clone(),
            usuario: h.usuario.clone().unwrap_or_default(),
            data: format_timestamp(h.data.as_deref()),
            comentario: h.comentario.clone().unwrap_or_default(),
        }
    }
}

#[derive(Template)]
#[template(path = "submissions/list.html")]
pub struct SubmissionListTemplate {
    pub ctx: PageContext,
    pub rows: Vec<SubmissionRow>,
    pub filter: FilterForm,
    pub statuses: Vec<StatusOption>,
    pub forms: Vec<FormOption>,
    pub pager: PagerView,
    pub sort_column: String,
    pub sort_dir: String,
    pub toggle_dir: String,
    pub load_error: Option<String>,
}

#[derive(Template)]
#[template(path = "submissions/detail.html")]
pub struct SubmissionDetailTemplate {
    pub ctx: PageContext,
    pub submission: SubmissionView,
    pub fields: Vec<DataField>,
    pub history: Vec<HistoryView>,
    pub actions: Vec<ActionLink>,
    pub can_delete: bool,
}

#[derive(Template)]
#[template(path = "submissions/edit.html")]
pub struct SubmissionEditTemplate {
    pub ctx: PageContext,
    pub submission_id: i64,
    pub versao: i64,
    pub form_name: String,
    pub fields: Vec<FieldView>,
    pub errors: Vec<String>,
    pub autosave_delay_ms: u128,
}

/// Plain submission table: per-form submissions and "my submissions".
#[derive(Template)]
#[template(path = "submissions/table.html")]
pub struct SubmissionTableTemplate {
    pub ctx: PageContext,
    pub title: String,
    pub back_url: Option<String>,
    pub rows: Vec<SubmissionRow>,
}
