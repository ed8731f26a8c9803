use super::endpoints::Endpoint;
use super::http_client::build_service_client;
use super::scrub::sanitize_error_body;
use super::{Gateway, GatewayFuture};
use crate::config::ServiceConfig;
use crate::error::ServiceError;
use anyhow::{Context, Result};
use reqwest::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// [`Gateway`] over HTTP with a shared reqwest client.
pub struct HttpGateway {
    base_url: Url,
    request_timeout: Duration,
    bearer_token: Option<String>,
    client: Client,
}

impl HttpGateway {
    pub fn new(base_url: &str, request_timeout: Duration, connect_timeout: Duration) -> Result<Self> {
        let trimmed = base_url.trim().trim_end_matches('/');
        let base_url =
            Url::parse(trimmed).with_context(|| format!("Invalid service base URL: {base_url}"))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("Service base URL cannot carry paths: {base_url}");
        }

        Ok(Self {
            base_url,
            request_timeout,
            bearer_token: None,
            client: build_service_client(request_timeout, connect_timeout),
        })
    }

    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        Self::new(
            &config.base_url,
            Duration::from_secs(config.request_timeout_secs),
            Duration::from_secs(config.connect_timeout_secs),
        )
    }

    /// Attach `Authorization: Bearer <token>` to every call.
    pub fn with_bearer_token(mut self, token: Option<&str>) -> Self {
        self.bearer_token = token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(ToString::to_string);
        self
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    fn endpoint_url(&self, endpoint: &Endpoint) -> Result<Url, ServiceError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ServiceError::Network(format!("cannot route to {}", endpoint.path())))?
            .pop_if_empty()
            .extend(endpoint.segments());
        Ok(url)
    }

    fn transport_error(&self, err: &reqwest::Error) -> ServiceError {
        if err.is_timeout() {
            ServiceError::Timeout(self.request_timeout)
        } else {
            ServiceError::Network(sanitize_error_body(&err.to_string()))
        }
    }

    async fn execute(&self, endpoint: Endpoint, payload: Option<Value>) -> Result<Value, ServiceError> {
        let url = self.endpoint_url(&endpoint)?;

        let mut request = self
            .client
            .request(endpoint.method(), url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json");
        if let Some(token) = &self.bearer_token {
            request = request.bearer_auth(token);
        }
        if let Some(payload) = &payload {
            let body = serde_json::to_vec(payload)
                .map_err(|e| ServiceError::Parse(format!("request encoding failed: {e}")))?;
            request = request.body(body);
        }

        let response = request.send().await.map_err(|e| self.transport_error(&e))?;
        let status = response.status();
        let body = response.bytes().await.map_err(|e| self.transport_error(&e))?;

        tracing::debug!(
            endpoint = endpoint.name(),
            status = status.as_u16(),
            bytes = body.len(),
            "gateway.call"
        );

        if !status.is_success() {
            return Err(ServiceError::Http {
                status: status.as_u16(),
                body: sanitize_error_body(&String::from_utf8_lossy(&body)),
            });
        }

        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }

        serde_json::from_slice(&body).map_err(|e| ServiceError::Parse(e.to_string()))
    }
}

impl Gateway for HttpGateway {
    fn call(&self, endpoint: Endpoint, payload: Option<Value>) -> GatewayFuture<'_> {
        Box::pin(self.execute(endpoint, payload))
    }
}
