//! Marketplace REST API client.
//!
//! # Architecture
//!
//! - One `reqwest` client with a cookie jar: the session is cookie-based, so
//!   every request carries the credentials the login response set.
//! - `401` is reported as [`ApiError::Unauthorized`] ("no session"), never as a
//!   transport failure. Every other non-2xx status becomes
//!   [`ApiError::Status`] with the server's `message` when it sent one.
//! - Endpoint methods live in per-resource submodules; the cache keys they
//!   are stored under live in [`keys`].
//!
//! # Example
//!
//! ```rust,ignore
//! use artisan_bazaar_client::api::ApiClient;
//!
//! let api = ApiClient::new(&config)?;
//! let me = api.me().await?;
//! let featured = api.featured_products().await?;
//! ```

mod admin;
mod auth;
mod cart;
pub mod keys;
mod modification_requests;
mod notifications;
mod orders;
mod products;

use std::sync::Arc;

use reqwest::{Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use crate::config::ClientConfig;
use crate::error::ApiError;

pub use products::ProductQuery;

/// Longest body excerpt included in logs and error messages.
const BODY_EXCERPT_CHARS: usize = 500;

/// Client for the marketplace backend.
///
/// Cheap to clone; clones share the connection pool and the cookie jar.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder().cookie_store(true);
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client: builder.build()?,
                base_url: config.api_url.clone(),
            }),
        })
    }

    /// Base URL all paths are joined onto.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let url = self.inner.base_url.join(path)?;
        Ok(self
            .inner
            .client
            .request(method, url)
            .header(reqwest::header::ACCEPT, "application/json"))
    }

    /// Send a request and return the body of a successful response.
    async fn send(&self, request: RequestBuilder) -> Result<String, ApiError> {
        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            debug!("Backend reported no session");
            return Err(ApiError::Unauthorized);
        }

        let body = response.text().await?;

        if !status.is_success() {
            tracing::warn!(
                status = %status,
                body = %excerpt(&body),
                "Backend returned non-success status"
            );
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        Ok(body)
    }

    /// Send a request and decode the JSON response.
    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let body = self.send(request).await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %excerpt(&body),
                "Failed to parse backend response"
            );
            ApiError::Parse(e.to_string())
        })
    }

    /// `GET path` and decode the JSON response.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure, non-success status, or a body
    /// that does not decode as `T`.
    #[instrument(skip(self), fields(method = "GET"))]
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.execute(self.request(Method::GET, path)?).await
    }

    /// `POST path` with a JSON body and decode the JSON response.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::get`].
    #[instrument(skip(self, body), fields(method = "POST"))]
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.execute(self.request(Method::POST, path)?.json(body))
            .await
    }

    /// `PATCH path` with a JSON body and decode the JSON response.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::get`].
    #[instrument(skip(self, body), fields(method = "PATCH"))]
    pub async fn patch<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.execute(self.request(Method::PATCH, path)?.json(body))
            .await
    }

    /// Send a request whose response body is ignored.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::get`].
    #[instrument(skip(self))]
    pub async fn send_empty(&self, method: Method, path: &str) -> Result<(), ApiError> {
        self.send(self.request(method, path)?).await.map(drop)
    }
}

/// Truncate a body for logging.
fn excerpt(body: &str) -> String {
    body.chars().take(BODY_EXCERPT_CHARS).collect()
}

/// Pull `message` (or `error`) out of a JSON error body, falling back to the
/// raw text.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            ["message", "error"]
                .iter()
                .find_map(|key| value.get(key)?.as_str().map(str::to_owned))
        })
        .unwrap_or_else(|| excerpt(body.trim()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_prefers_json_message() {
        assert_eq!(
            error_message(r#"{"message": "Out of stock"}"#),
            "Out of stock"
        );
        assert_eq!(error_message(r#"{"error": "Forbidden"}"#), "Forbidden");
    }

    #[test]
    fn test_error_message_falls_back_to_text() {
        assert_eq!(error_message("  Bad Gateway \n"), "Bad Gateway");
        assert_eq!(error_message(r#"{"code": 7}"#), r#"{"code": 7}"#);
    }

    #[test]
    fn test_excerpt_truncates() {
        let long = "x".repeat(BODY_EXCERPT_CHARS * 2);
        assert_eq!(excerpt(&long).len(), BODY_EXCERPT_CHARS);
    }

    #[test]
    fn test_paths_join_onto_base() {
        let config = ClientConfig::new("http://127.0.0.1:5000/").unwrap();
        let api = ApiClient::new(&config).unwrap();
        let request = api.request(Method::GET, "/api/cart").unwrap().build().unwrap();
        assert_eq!(request.url().as_str(), "http://127.0.0.1:5000/api/cart");
    }
}
