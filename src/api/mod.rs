//! Transport to the forms backend.
//!
//! Every resource call goes through [`ApiClient`], which attaches the bearer
//! token, issues the request and normalizes any failure into [`ApiError`].
//! Resource-specific calls live next to their models in `models::*::queries`.

pub mod error;

use std::time::Duration;

use reqwest::{Method, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

pub use error::ApiError;

const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| ApiError::unexpected(format!("Falha ao criar cliente HTTP: {e}")))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
            token: None,
        })
    }

    /// A copy of this client that authenticates as the given session token.
    /// The underlying connection pool is shared.
    pub fn with_token(&self, token: impl Into<String>) -> Self {
        Self {
            base_url: self.base_url.clone(),
            http: self.http.clone(),
            token: Some(token.into()),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, self.url(path));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str, operation: &str) -> Result<T, ApiError> {
        let value = self.send(self.request(Method::GET, path), operation).await?;
        decode(value, operation)
    }

    pub async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
        operation: &str,
    ) -> Result<T, ApiError> {
        let value = self
            .send(self.request(Method::GET, path).query(query), operation)
            .await?;
        decode(value, operation)
    }

    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        operation: &str,
    ) -> Result<T, ApiError> {
        let value = self
            .send(self.request(Method::POST, path).json(body), operation)
            .await?;
        decode(value, operation)
    }

    pub async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        operation: &str,
    ) -> Result<T, ApiError> {
        let value = self
            .send(self.request(Method::PUT, path).json(body), operation)
            .await?;
        decode(value, operation)
    }

    pub async fn delete(
        &self,
        path: &str,
        query: &[(String, String)],
        operation: &str,
    ) -> Result<(), ApiError> {
        self.send(self.request(Method::DELETE, path).query(query), operation)
            .await
            .map(|_| ())
    }

    /// Issue the request and return the body as JSON. Empty bodies (204,
    /// or 200 with no content) come back as `Value::Null`.
    async fn send(&self, builder: RequestBuilder, operation: &str) -> Result<Value, ApiError> {
        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::from_transport(&e, &self.base_url, operation))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::from_transport(&e, &self.base_url, operation))?;

        if !status.is_success() {
            log::debug!("backend returned {status} during '{operation}'");
            return Err(ApiError::from_response(status.as_u16(), &body, operation));
        }

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&body).map_err(|e| {
            log::warn!("undecodable response during '{operation}': {e}");
            ApiError::unexpected(error::generic_message(operation))
        })
    }
}

fn decode<T: DeserializeOwned>(value: Value, operation: &str) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|e| {
        log::warn!("unexpected response shape during '{operation}': {e}");
        ApiError::unexpected(error::generic_message(operation))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_without_double_slash() {
        let client = ApiClient::new("http://localhost:5000/api/").expect("client");
        assert_eq!(client.url("/Forms/3"), "http://localhost:5000/api/Forms/3");
        assert_eq!(client.url("Menus"), "http://localhost:5000/api/Menus");
    }

    #[test]
    fn with_token_keeps_base_url() {
        let client = ApiClient::new("http://backend").expect("client");
        let authed = client.with_token("abc");
        assert_eq!(authed.base_url(), "http://backend");
        assert_eq!(authed.token.as_deref(), Some("abc"));
        assert!(client.token.is_none());
    }
}
