use serde_json::Value;

use super::types::{MenuInput, MenuItem};
use crate::api::{ApiClient, ApiError};
use crate::models::envelope::normalize_list;

pub async fn find_all(api: &ApiClient) -> Result<Vec<MenuItem>, ApiError> {
    let value: Value = api.get("Menus", "carregar menus").await?;
    Ok(normalize_list(&value))
}

pub async fn find_by_id(api: &ApiClient, id: i64) -> Result<MenuItem, ApiError> {
    api.get(&format!("Menus/{id}"), "carregar menu").await
}

pub async fn create(api: &ApiClient, input: &MenuInput) -> Result<(), ApiError> {
    api.post::<_, Value>("Menus", input, "criar menu").await.map(|_| ())
}

pub async fn update(api: &ApiClient, id: i64, input: &MenuInput) -> Result<(), ApiError> {
    api.put::<_, Value>(&format!("Menus/{id}"), input, "atualizar menu")
        .await
        .map(|_| ())
}

/// PUT the full item as it currently stands (used by reordering).
pub async fn save(api: &ApiClient, item: &MenuItem) -> Result<(), ApiError> {
    api.put::<_, Value>(&format!("Menus/{}", item.id), item, "reordenar menus")
        .await
        .map(|_| ())
}

pub async fn delete(api: &ApiClient, id: i64) -> Result<(), ApiError> {
    api.delete(&format!("Menus/{id}"), &[], "excluir menu").await
}
