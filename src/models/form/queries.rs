use serde_json::Value;

use super::types::{FormDefinition, FormInput};
use crate::api::{ApiClient, ApiError};
use crate::models::envelope::normalize_list;

pub async fn find_all(api: &ApiClient) -> Result<Vec<FormDefinition>, ApiError> {
    let value: Value = api.get("Forms", "carregar formulários").await?;
    Ok(normalize_list(&value))
}

pub async fn find_by_id(api: &ApiClient, id: i64) -> Result<FormDefinition, ApiError> {
    api.get(&format!("Forms/{id}"), "carregar formulário").await
}

pub async fn create(api: &ApiClient, input: &FormInput) -> Result<Option<FormDefinition>, ApiError> {
    let value: Value = api.post("Forms", input, "criar formulário").await?;
    Ok(serde_json::from_value(value).ok())
}

/// Updating a form publishes a new version server-side.
pub async fn update(api: &ApiClient, id: i64, input: &FormInput) -> Result<(), ApiError> {
    api.put::<_, Value>(&format!("Forms/{id}"), input, "atualizar formulário")
        .await
        .map(|_| ())
}

pub async fn delete(api: &ApiClient, id: i64) -> Result<(), ApiError> {
    api.delete(&format!("Forms/{id}"), &[], "excluir formulário").await
}
