//! Submission filter tests: query-string round trips and empty-value
//! handling.

use std::collections::HashMap;

use chrono::NaiveDate;
use formflow_console::models::pagination::{PageRequest, SortSpec, total_pages};
use formflow_console::models::submission::{SubmissionFilter, SubmissionStatus};

fn decode(query: &str) -> HashMap<String, String> {
    serde_urlencoded::from_str(query).expect("Failed to decode query")
}

#[test]
fn test_filter_roundtrips_through_query_string() {
    let filter = SubmissionFilter {
        form_id: Some(4),
        user_id: Some(10),
        status: Some(SubmissionStatus::InReview),
        data_inicial_criacao: NaiveDate::from_ymd_opt(2024, 1, 1),
        data_final_criacao: NaiveDate::from_ymd_opt(2024, 1, 31),
        data_inicial_submissao: None,
        data_final_submissao: NaiveDate::from_ymd_opt(2024, 2, 29),
        usuario_aprovador_id: Some(7),
        incluir_excluidas: true,
    };

    let encoded = serde_urlencoded::to_string(filter.to_query_params()).expect("Failed to encode");
    let decoded = SubmissionFilter::from_query(&decode(&encoded));

    assert_eq!(decoded, filter);
}

#[test]
fn test_empty_values_are_not_forwarded() {
    let query = decode("formId=&status=&userId=%20&dataInicialCriacao=&incluirExcluidas=");
    let filter = SubmissionFilter::from_query(&query);

    assert!(filter.is_empty());
    assert!(filter.to_query_params().is_empty());
}

#[test]
fn test_unparseable_values_count_as_unset() {
    let query = decode("formId=abc&status=qualquer&dataFinalCriacao=31-31-2024&usuarioAprovadorId=5");
    let filter = SubmissionFilter::from_query(&query);

    assert_eq!(filter.form_id, None);
    assert_eq!(filter.status, None);
    assert_eq!(filter.data_final_criacao, None);
    assert_eq!(filter.usuario_aprovador_id, Some(5));
    assert_eq!(
        filter.to_query_params(),
        vec![("usuarioAprovadorId".to_string(), "5".to_string())]
    );
}

#[test]
fn test_status_is_sent_as_code() {
    let filter = SubmissionFilter {
        status: Some(SubmissionStatus::Rejected),
        ..Default::default()
    };
    assert_eq!(filter.to_query_params(), vec![("status".to_string(), "4".to_string())]);
}

#[test]
fn test_page_params_and_page_count() {
    let request = PageRequest::new(2, 12).with_sort(SortSpec::from_params(Some("createdAt"), Some("asc")));
    let params: HashMap<String, String> = request.to_query_params().into_iter().collect();

    assert_eq!(params.get("pagina").map(String::as_str), Some("2"));
    assert_eq!(params.get("tamanhoPagina").map(String::as_str), Some("12"));
    assert_eq!(params.get("ordenarPor").map(String::as_str), Some("createdAt"));
    assert_eq!(params.get("direcao").map(String::as_str), Some("asc"));
    assert_eq!(total_pages(25, 12), 3);
}
