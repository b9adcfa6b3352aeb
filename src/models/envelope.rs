//! Tolerant decoding of list responses.
//!
//! Backend endpoints are not consistent about how they wrap collections: some
//! return a bare array, others wrap it under `itens`, `items`, `data` or
//! `result`. [`ListEnvelope`] names each known shape; [`normalize_list`] tries
//! them in order and yields an empty list for anything else.

use serde::de::DeserializeOwned;
use serde_json::Value;

/// Container keys, in the order they are tried.
pub const CONTAINER_KEYS: [&str; 4] = ["itens", "items", "data", "result"];

#[derive(Debug, Clone, PartialEq)]
pub enum ListEnvelope<T> {
    Bare(Vec<T>),
    Itens(Vec<T>),
    Items(Vec<T>),
    Data(Vec<T>),
    Result(Vec<T>),
}

impl<T: DeserializeOwned> ListEnvelope<T> {
    /// Recognize one of the known shapes, or `None`.
    pub fn recognize(value: &Value) -> Option<Self> {
        if value.is_array() {
            return decode_items(value).map(ListEnvelope::Bare);
        }
        let object = value.as_object()?;
        for key in CONTAINER_KEYS {
            let Some(inner) = object.get(key) else {
                continue;
            };
            let Some(items) = decode_items(inner) else {
                continue;
            };
            return Some(match key {
                "itens" => ListEnvelope::Itens(items),
                "items" => ListEnvelope::Items(items),
                "data" => ListEnvelope::Data(items),
                _ => ListEnvelope::Result(items),
            });
        }
        None
    }
}

impl<T> ListEnvelope<T> {
    pub fn into_items(self) -> Vec<T> {
        match self {
            ListEnvelope::Bare(items)
            | ListEnvelope::Itens(items)
            | ListEnvelope::Items(items)
            | ListEnvelope::Data(items)
            | ListEnvelope::Result(items) => items,
        }
    }
}

/// Decode each element on its own. A row that does not decode is logged
/// and skipped; the rest of the list survives.
fn decode_items<T: DeserializeOwned>(value: &Value) -> Option<Vec<T>> {
    let elements = value.as_array()?;
    let mut items = Vec::with_capacity(elements.len());
    for (index, element) in elements.iter().enumerate() {
        match T::deserialize(element) {
            Ok(item) => items.push(item),
            Err(e) => log::warn!("skipping list element {index}: {e}"),
        }
    }
    Some(items)
}

/// Normalize any list response to an ordered sequence, empty on an
/// unrecognized shape.
pub fn normalize_list<T: DeserializeOwned>(value: &Value) -> Vec<T> {
    match ListEnvelope::recognize(value) {
        Some(envelope) => envelope.into_items(),
        None => {
            if !value.is_null() {
                log::debug!("unrecognized list envelope, treating as empty");
            }
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn recognizes_variant_by_key() {
        let env = ListEnvelope::<i64>::recognize(&json!({"data": [1, 2]})).expect("shape");
        assert_eq!(env, ListEnvelope::Data(vec![1, 2]));
    }

    #[test]
    fn first_matching_key_wins() {
        let value = json!({"items": [9], "itens": [1]});
        assert_eq!(normalize_list::<i64>(&value), vec![1]);
    }

    #[test]
    fn non_array_container_is_skipped() {
        let value = json!({"data": {"nested": true}, "result": [4]});
        assert_eq!(normalize_list::<i64>(&value), vec![4]);
    }

    #[test]
    fn undecodable_rows_are_skipped() {
        let value = json!({"itens": [1, "dois", 3]});
        assert_eq!(normalize_list::<i64>(&value), vec![1, 3]);
    }

    #[test]
    fn null_and_scalars_are_empty() {
        assert!(normalize_list::<i64>(&Value::Null).is_empty());
        assert!(normalize_list::<i64>(&json!("text")).is_empty());
        assert!(normalize_list::<i64>(&json!({"total": 3})).is_empty());
    }
}
