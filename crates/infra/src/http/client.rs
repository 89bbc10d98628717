use std::time::Duration;

use gifscout_domain::constants::{DEFAULT_REQUEST_TIMEOUT_SECS, DEVICE_ID_HEADER};
use gifscout_domain::{ConnectionError, GifScoutError, HttpMethod, HttpRequest, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use reqwest::{Client as ReqwestClient, Method, StatusCode};
use serde_json::Value;
use tracing::debug;

use crate::errors::InfraError;

/// Single-shot HTTP client speaking JSON.
///
/// Non-success statuses come back as [`ConnectionError`]s carrying the
/// decoded response body. Retrying is left to the caller.
#[derive(Clone)]
pub struct HttpClient {
    client: ReqwestClient,
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Convenience constructor with default configuration.
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    /// Send `request` once, authorized with `id_token` when present.
    pub async fn execute(&self, request: &HttpRequest, id_token: Option<&str>) -> Result<Value> {
        let url = request.full_url();
        let method = to_reqwest_method(request.method);

        let mut builder = self.client.request(method.clone(), &url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(token) = id_token {
            builder = builder.header(AUTHORIZATION, token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        debug!(%method, %url, "sending HTTP request");
        let response = builder.send().await.map_err(map_http_error)?;
        let status = response.status();
        debug!(%method, %url, %status, "received HTTP response");

        let bytes = response.bytes().await.map_err(map_http_error)?;

        if !status.is_success() {
            return Err(ConnectionError::from_status(status.as_u16(), error_payload(&bytes)).into());
        }

        if bytes.is_empty() || status == StatusCode::NO_CONTENT || status == StatusCode::RESET_CONTENT
        {
            return Ok(Value::Null);
        }

        serde_json::from_slice(&bytes)
            .map_err(|e| GifScoutError::Serialization(format!("invalid JSON response: {e}")))
    }
}

/// Body of an error response: JSON when it parses, otherwise the raw text.
fn error_payload(bytes: &[u8]) -> Option<Value> {
    if bytes.is_empty() {
        return None;
    }
    serde_json::from_slice(bytes)
        .ok()
        .or_else(|| Some(Value::String(String::from_utf8_lossy(bytes).into_owned())))
}

fn to_reqwest_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Post => Method::POST,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
    }
}

fn map_http_error(err: reqwest::Error) -> GifScoutError {
    GifScoutError::from(InfraError::from(err))
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    user_agent: Option<String>,
    device_id: Option<String>,
    default_headers: HeaderMap,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            user_agent: None,
            device_id: None,
            default_headers: HeaderMap::new(),
        }
    }
}

impl HttpClientBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Sent as `X-Device-Id` on every request. Empty ids are skipped.
    pub fn device_id(mut self, device_id: impl Into<String>) -> Self {
        let device_id = device_id.into();
        self.device_id = (!device_id.is_empty()).then_some(device_id);
        self
    }

    pub fn default_headers(mut self, headers: HeaderMap) -> Self {
        self.default_headers.extend(headers);
        self
    }

    pub fn build(self) -> Result<HttpClient> {
        let mut headers = self.default_headers;
        if let Some(device_id) = self.device_id {
            let value = HeaderValue::from_str(&device_id)
                .map_err(|e| GifScoutError::Config(format!("invalid device id: {e}")))?;
            let name = HeaderName::from_bytes(DEVICE_ID_HEADER.as_bytes())
                .map_err(|e| GifScoutError::Config(format!("invalid header name: {e}")))?;
            headers.insert(name, value);
        }

        let mut builder = ReqwestClient::builder().timeout(self.timeout).no_proxy();
        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }
        if !headers.is_empty() {
            builder = builder.default_headers(headers);
        }

        let client = builder.build().map_err(map_http_error)?;
        Ok(HttpClient { client })
    }
}
