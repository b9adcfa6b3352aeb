use std::collections::HashMap;

use chrono::NaiveDate;

use super::types::SubmissionStatus;
use crate::models::fields::parse_date;

/// Filters for the submission list. `None` means "not filtering"; only set
/// values are forwarded to the backend.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubmissionFilter {
    pub form_id: Option<i64>,
    pub user_id: Option<i64>,
    pub status: Option<SubmissionStatus>,
    pub data_inicial_criacao: Option<NaiveDate>,
    pub data_final_criacao: Option<NaiveDate>,
    pub data_inicial_submissao: Option<NaiveDate>,
    pub data_final_submissao: Option<NaiveDate>,
    pub usuario_aprovador_id: Option<i64>,
    pub incluir_excluidas: bool,
}

impl SubmissionFilter {
    /// Read filters from raw query-string values. Blank, unparseable or
    /// missing values are treated as not set.
    pub fn from_query(query: &HashMap<String, String>) -> Self {
        let number = |key: &str| text(query, key).and_then(|v| v.parse::<i64>().ok());
        let date = |key: &str| text(query, key).and_then(parse_date);

        SubmissionFilter {
            form_id: number("formId"),
            user_id: number("userId"),
            status: text(query, "status").and_then(SubmissionStatus::from_name),
            data_inicial_criacao: date("dataInicialCriacao"),
            data_final_criacao: date("dataFinalCriacao"),
            data_inicial_submissao: date("dataInicialSubmissao"),
            data_final_submissao: date("dataFinalSubmissao"),
            usuario_aprovador_id: number("usuarioAprovadorId"),
            incluir_excluidas: matches!(text(query, "incluirExcluidas"), Some("true" | "on" | "1")),
        }
    }

    /// Backend query parameters, in a fixed order, omitting unset filters.
    pub fn to_query_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        let mut push = |key: &str, value: Option<String>| {
            if let Some(value) = value {
                params.push((key.to_string(), value));
            }
        };
        let day = |d: &Option<NaiveDate>| d.map(|d| d.format("%Y-%m-%d").to_string());

        push("formId", self.form_id.map(|v| v.to_string()));
        push("userId", self.user_id.map(|v| v.to_string()));
        push("status", self.status.map(|s| s.code().to_string()));
        push("dataInicialCriacao", day(&self.data_inicial_criacao));
        push("dataFinalCriacao", day(&self.data_final_criacao));
        push("dataInicialSubmissao", day(&self.data_inicial_submissao));
        push("dataFinalSubmissao", day(&self.data_final_submissao));
        push("usuarioAprovadorId", self.usuario_aprovador_id.map(|v| v.to_string()));
        push("incluirExcluidas", self.incluir_excluidas.then(|| "true".to_string()));
        params
    }

    pub fn is_empty(&self) -> bool {
        self == &SubmissionFilter::default()
    }
}

fn text<'a>(query: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    query.get(key).map(|v| v.trim()).filter(|v| !v.is_empty())
}
