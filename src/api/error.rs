use serde_json::Value;
use thiserror::Error;

/// Normalized failure of a backend call. `Display` is always the message
/// the console shows to the user, unchanged.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    /// The backend answered with a non-success status.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// The backend could not be reached at all.
    #[error("{message}")]
    Unreachable { message: String },

    /// Refused before any request was issued (missing required input).
    #[error("{message}")]
    Validation { message: String },

    /// The response arrived but could not be decoded, or the request could not be built.
    #[error("{message}")]
    Unexpected { message: String },
}

impl ApiError {
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn unexpected<S: Into<String>>(message: S) -> Self {
        Self::Unexpected {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::Rejected { message, .. }
            | ApiError::Unreachable { message }
            | ApiError::Validation { message }
            | ApiError::Unexpected { message } => message,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    /// Build the error for a non-success response. The body message wins;
    /// otherwise the per-operation fallback is used.
    pub fn from_response(status: u16, body: &str, operation: &str) -> Self {
        let message = extract_message(body).unwrap_or_else(|| generic_message(operation));
        Self::Rejected { status, message }
    }

    /// Build the error for a transport failure. Connectivity problems get the
    /// fixed actionable message; anything else gets the generic one.
    pub fn from_transport(err: &reqwest::Error, base_url: &str, operation: &str) -> Self {
        if err.is_connect() || is_network_text(&err.to_string()) {
            return Self::Unreachable {
                message: unreachable_message(base_url),
            };
        }
        if err.is_decode() {
            return Self::unexpected(generic_message(operation));
        }
        log::debug!("transport error during '{operation}': {err}");
        Self::unexpected(generic_message(operation))
    }
}

pub fn generic_message(operation: &str) -> String {
    format!("Erro ao {operation}")
}

pub fn unreachable_message(base_url: &str) -> String {
    format!(
        "Não foi possível conectar ao servidor. Verifique se o backend está em execução em {base_url}."
    )
}

fn is_network_text(text: &str) -> bool {
    text.contains("Network Error")
        || text.contains("Connection refused")
        || text.contains("ECONNREFUSED")
}

/// Pick the user-facing message out of an error body: `errors.$[0]`, then
/// `title`, then `message`. A bare JSON string body is taken as-is.
pub fn extract_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    if let Value::String(s) = &value {
        return non_blank(s);
    }

    let from_errors = value
        .get("errors")
        .and_then(|errors| errors.get("$"))
        .and_then(|list| list.get(0))
        .and_then(Value::as_str)
        .and_then(non_blank);

    from_errors
        .or_else(|| value.get("title").and_then(Value::as_str).and_then(non_blank))
        .or_else(|| value.get("message").and_then(Value::as_str).and_then(non_blank))
}

fn non_blank(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_dollar_wins_over_title_and_message() {
        let body = r#"{
            "errors": {"$": ["Campo inválido"]},
            "title": "One or more validation errors",
            "message": "x"
        }"#;
        assert_eq!(extract_message(body).as_deref(), Some("Campo inválido"));
    }

    #[test]
    fn title_used_when_errors_missing() {
        let body = r#"{"title":"Versão desatualizada","message":"ignored"}"#;
        assert_eq!(extract_message(body).as_deref(), Some("Versão desatualizada"));
    }

    #[test]
    fn message_used_last() {
        let body = r#"{"message":"Sem permissão"}"#;
        assert_eq!(extract_message(body).as_deref(), Some("Sem permissão"));
    }

    #[test]
    fn other_error_keys_are_ignored() {
        let body = r#"{"errors":{"Nome":["obrigatório"]}}"#;
        assert_eq!(extract_message(body), None);
    }

    #[test]
    fn bare_string_body() {
        assert_eq!(extract_message(r#""Motivo obrigatório""#).as_deref(), Some("Motivo obrigatório"));
    }

    #[test]
    fn non_json_falls_back_to_generic() {
        let err = ApiError::from_response(500, "<html>oops</html>", "carregar menus");
        assert_eq!(err.to_string(), "Erro ao carregar menus");
        assert_eq!(err.status(), Some(500));
    }

    #[test]
    fn network_text_detection() {
        assert!(is_network_text("Network Error"));
        assert!(is_network_text("tcp connect error: Connection refused (os error 111)"));
        assert!(!is_network_text("timeout"));
    }
}
