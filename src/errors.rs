use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use std::fmt;

use crate::api::ApiError;

const NOT_FOUND_PAGE: &str = include_str!("../templates/errors/404.html");

#[derive(Debug)]
pub enum AppError {
    Api(ApiError),
    Template(askama::Error),
    Session(String),
    PermissionDenied(String),
    Csrf,
    Unauthenticated,
    NotFound,
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Api(e) => write!(f, "Backend error: {e}"),
            AppError::Template(e) => write!(f, "Template error: {e}"),
            AppError::Session(e) => write!(f, "Session error: {e}"),
            AppError::PermissionDenied(what) => write!(f, "Permission denied: {what}"),
            AppError::Csrf => write!(f, "Invalid or missing CSRF token"),
            AppError::Unauthenticated => write!(f, "Not logged in"),
            AppError::NotFound => write!(f, "Not found"),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::PermissionDenied(_) | AppError::Csrf => StatusCode::FORBIDDEN,
            AppError::Unauthenticated => StatusCode::SEE_OTHER,
            AppError::Api(e) if e.is_unauthorized() => StatusCode::SEE_OTHER,
            AppError::Api(e) if e.status() == Some(404) => StatusCode::NOT_FOUND,
            AppError::Api(e) if e.status() == Some(403) => StatusCode::FORBIDDEN,
            AppError::Api(ApiError::Unreachable { .. }) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self.status_code() {
            StatusCode::SEE_OTHER => HttpResponse::SeeOther()
                .insert_header(("Location", "/login"))
                .finish(),
            StatusCode::NOT_FOUND => HttpResponse::NotFound()
                .content_type("text/html; charset=utf-8")
                .body(NOT_FOUND_PAGE),
            StatusCode::FORBIDDEN => {
                log::warn!("{self}");
                HttpResponse::Forbidden().body(self.user_message())
            }
            status => {
                log::error!("{self}");
                HttpResponse::build(status).body(self.user_message())
            }
        }
    }
}

impl AppError {
    /// Text safe to show to the user.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Api(e) => e.message().to_string(),
            AppError::PermissionDenied(_) => "Você não tem permissão para esta ação.".to_string(),
            AppError::Csrf => "Sessão expirada. Recarregue a página e tente novamente.".to_string(),
            AppError::NotFound => "Não encontrado.".to_string(),
            _ => "Erro interno.".to_string(),
        }
    }
}

impl From<ApiError> for AppError {
    fn from(e: ApiError) -> Self {
        AppError::Api(e)
    }
}

impl From<askama::Error> for AppError {
    fn from(e: askama::Error) -> Self {
        AppError::Template(e)
    }
}

/// Render a template into an HTML response.
pub fn render(template: impl askama::Template) -> Result<HttpResponse, AppError> {
    let html = template.render()?;
    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(html))
}

/// Default service for unmatched routes.
pub async fn not_found() -> HttpResponse {
    HttpResponse::NotFound()
        .content_type("text/html; charset=utf-8")
        .body(NOT_FOUND_PAGE)
}

/// 303 redirect, the response to every successful form POST.
pub fn redirect(location: impl Into<String>) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header(("Location", location.into()))
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_unauthorized_redirects_to_login() {
        let err = AppError::Api(ApiError::Rejected { status: 401, message: "expirado".into() });
        let resp = err.error_response();
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(resp.headers().get("Location").and_then(|v| v.to_str().ok()), Some("/login"));
    }

    #[test]
    fn status_mapping() {
        assert_eq!(AppError::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::Csrf.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            AppError::Api(ApiError::Unreachable { message: "x".into() }).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::Api(ApiError::Rejected { status: 500, message: "x".into() }).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn user_message_is_backend_text() {
        let err = AppError::Api(ApiError::Rejected { status: 409, message: "Versão desatualizada".into() });
        assert_eq!(err.user_message(), "Versão desatualizada");
    }
}
