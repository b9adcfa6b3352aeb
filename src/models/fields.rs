//! Small decoding and formatting helpers shared by the backend models.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Accept a JSON string or number (or null) and keep it as text. The backend
/// sends form versions as either `"2"`, `"v2"`, `2` or `2.1`.
pub fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    })
}

/// Read an explicit JSON `null` the same way as a missing key. .NET
/// backends serialize empty collections and unset flags as `null`.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Flags that default to on: `null` reads as `true`.
pub fn null_as_true<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(true))
}

/// Parse the timestamp formats the backend emits: RFC 3339 with offset, or
/// a naive `YYYY-MM-DDTHH:MM:SS[.fff]`.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S"))
        .ok()
}

/// `dd/mm/yyyy HH:MM`, or the raw text when it cannot be parsed.
pub fn format_timestamp(raw: Option<&str>) -> String {
    match raw {
        None => String::new(),
        Some(raw) => match parse_timestamp(raw) {
            Some(dt) => dt.format("%d/%m/%Y %H:%M").to_string(),
            None => raw.to_string(),
        },
    }
}

/// Parse a `YYYY-MM-DD` date filter value.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Versioned {
        #[serde(deserialize_with = "string_or_number")]
        version: String,
    }

    #[test]
    fn version_accepts_number_and_string() {
        let a: Versioned = serde_json::from_str(r#"{"version": 2}"#).expect("number");
        let b: Versioned = serde_json::from_str(r#"{"version": "v3"}"#).expect("string");
        let c: Versioned = serde_json::from_str(r#"{"version": 1.5}"#).expect("float");
        assert_eq!(a.version, "2");
        assert_eq!(b.version, "v3");
        assert_eq!(c.version, "1.5");
    }

    #[test]
    fn timestamps_format_or_pass_through() {
        assert_eq!(format_timestamp(Some("2024-03-05T14:07:00")), "05/03/2024 14:07");
        assert_eq!(format_timestamp(Some("2024-03-05T14:07:00.123Z")), "05/03/2024 14:07");
        assert_eq!(format_timestamp(Some("ontem")), "ontem");
        assert_eq!(format_timestamp(None), "");
    }

    #[test]
    fn date_filter_parsing() {
        assert!(parse_date("2024-01-31").is_some());
        assert!(parse_date("31/01/2024").is_none());
        assert!(parse_date("").is_none());
    }
}
