//! Sidecar HTTP client.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use url::Url;

use crate::error::{Error, ErrorResponse, Result};

/// Default timeout for requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default sidecar HTTP endpoint.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:3500";

/// Header carrying the sidecar API token.
const API_TOKEN_HEADER: &str = "dapr-api-token";

/// Dapr HTTP API version prefix.
const API_VERSION: &str = "v1.0";

/// Dapr sidecar client.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct DaprClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: reqwest::Client,
    base_url: Url,
    timeout: Duration,
}

impl DaprClient {
    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Publish `body` to `topic` on the `pubsub` component.
    ///
    /// Each `metadata` entry is sent as a `metadata.<key>` query parameter.
    pub async fn publish_event(
        &self,
        pubsub: &str,
        topic: &str,
        body: Vec<u8>,
        content_type: &str,
        metadata: &BTreeMap<String, String>,
    ) -> Result<()> {
        let mut url = self.endpoint(&["publish", pubsub, topic])?;
        if !metadata.is_empty() {
            let mut query = url.query_pairs_mut();
            for (key, value) in metadata {
                query.append_pair(&format!("metadata.{key}"), value);
            }
        }

        let content_type = HeaderValue::from_str(content_type)
            .map_err(|_| Error::Config(format!("Invalid content type: {content_type}")))?;

        let response = self
            .inner
            .http
            .post(url)
            .header(CONTENT_TYPE, content_type)
            .body(body)
            .timeout(self.inner.timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(self.extract_error(response).await);
        }

        Ok(())
    }

    /// Invoke `method` on the actor `actor_type/actor_id` and decode the
    /// JSON result.
    pub async fn invoke_actor<T>(
        &self,
        actor_type: &str,
        actor_id: &str,
        method: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let url = self.endpoint(&["actors", actor_type, actor_id, "method", method])?;

        let mut request = self.inner.http.post(url).timeout(self.inner.timeout);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        self.handle_response(response).await
    }

    /// Check that the sidecar is up.
    pub async fn healthz(&self) -> Result<()> {
        let url = self.endpoint(&["healthz"])?;
        let response = self
            .inner
            .http
            .get(url)
            .timeout(self.inner.timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(self.extract_error(response).await);
        }

        Ok(())
    }

    /// Build `<base>/v1.0/<segments...>`, escaping each segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::Config("Base URL cannot be a base".to_string()))?
            .pop_if_empty()
            .push(API_VERSION)
            .extend(segments);
        Ok(url)
    }

    /// Handle a response, extracting the body or error.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        if response.status().is_success() {
            let bytes = response.bytes().await?;
            Ok(serde_json::from_slice(&bytes)?)
        } else {
            Err(self.extract_error(response).await)
        }
    }

    /// Extract an error from a failed response.
    async fn extract_error(&self, response: reqwest::Response) -> Error {
        let status = response.status().as_u16();
        let text = response.text().await.unwrap_or_default();

        match serde_json::from_str::<ErrorResponse>(&text) {
            Ok(err) if !err.message.is_empty() || !err.code.is_empty() => Error::Api {
                status,
                code: if err.code.is_empty() {
                    "unknown".to_string()
                } else {
                    err.code
                },
                message: err.message,
            },
            _ => Error::Api {
                status,
                code: "unknown".to_string(),
                message: if text.is_empty() {
                    format!("HTTP {}", status)
                } else {
                    text
                },
            },
        }
    }
}

impl std::fmt::Debug for DaprClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DaprClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("timeout", &self.inner.timeout)
            .finish()
    }
}

/// Builder for creating a [`DaprClient`].
#[derive(Debug)]
pub struct ClientBuilder {
    base_url: Option<String>,
    api_token: Option<String>,
    timeout: Duration,
}

impl ClientBuilder {
    /// Create a new builder with defaults.
    pub fn new() -> Self {
        Self {
            base_url: None,
            api_token: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the sidecar HTTP endpoint.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the sidecar API token.
    pub fn api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<DaprClient> {
        let base_url = self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(Error::Config(format!("Invalid sidecar URL: {base_url}")));
        }

        let mut headers = HeaderMap::new();
        if let Some(token) = &self.api_token {
            let value = HeaderValue::from_str(token)
                .map_err(|_| Error::Config("Invalid API token".to_string()))?;
            headers.insert(HeaderName::from_static(API_TOKEN_HEADER), value);
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(concat!("courier/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(DaprClient {
            inner: Arc::new(ClientInner {
                http,
                base_url,
                timeout: self.timeout,
            }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
