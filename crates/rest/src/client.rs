//! HTTP execution of [`Query`] descriptors.
//!
//! Wraps a PostgREST-style backend using [`reqwest`]. Authentication is two
//! static header-carried credentials: the raw API key in `apikey` and the
//! same key as a bearer token.

use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::Method;
use serde_json::Value;

use crate::query::{Command, Query};

/// Errors from the REST layer.
#[derive(Debug, thiserror::Error)]
pub enum RestError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend returned a non-2xx status code.
    #[error("REST backend error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

/// Client for one REST backend.
pub struct RestClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl RestClient {
    /// Create a client for the backend rooted at `base_url`.
    ///
    /// * `base_url` - table-endpoint root, e.g. `https://host/rest/v1`.
    /// * `api_key`  - static credential sent in both auth headers.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, api_key)
    }

    /// Create a client reusing an existing [`reqwest::Client`] (useful for
    /// connection pooling).
    pub fn with_client(
        client: reqwest::Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        let base_url = base_url.into();
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    /// Backend root URL (no trailing slash).
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Execute a descriptor once and normalize the response.
    ///
    /// * Non-2xx status → [`RestError::Api`] carrying status and body.
    /// * 2xx with an empty body → `Ok(None)`.
    /// * 2xx whose body is not valid JSON → `Ok(None)`. A mutation that
    ///   succeeded but returned an unexpected body is still a success; the
    ///   dropped body is logged at `warn` so it is at least observable.
    ///
    /// Mutating verbs send `Prefer: return=representation` so inserts hand
    /// back the created row.
    pub async fn execute(&self, query: &Query) -> Result<Option<Value>, RestError> {
        let url = format!("{}/{}", self.base_url, query.path());

        let (method, payload) = match query.command() {
            Command::Select => (Method::GET, None),
            Command::Insert(payload) => (Method::POST, Some(payload)),
            Command::Update(payload) => (Method::PATCH, Some(payload)),
            Command::Delete => (Method::DELETE, None),
        };

        let mut request = self
            .client
            .request(method.clone(), &url)
            .header("apikey", &self.api_key)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key));

        if method != Method::GET {
            request = request.header("Prefer", HeaderValue::from_static("return=representation"));
        }
        if let Some(payload) = payload {
            request = request.json(payload);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(RestError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        if body.trim().is_empty() {
            return Ok(None);
        }

        match serde_json::from_str(&body) {
            Ok(value) => Ok(Some(value)),
            Err(err) => {
                tracing::warn!(
                    table = query.table_name(),
                    %err,
                    "discarding unparsable body on a successful response"
                );
                Ok(None)
            }
        }
    }
}
