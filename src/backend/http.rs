// src/backend/http.rs

//! REST implementation of [`RegenerationBackend`].

use std::time::Duration;

use anyhow::anyhow;
use reqwest::{RequestBuilder, StatusCode, Url};
use tracing::{debug, warn};

use crate::backend::{BackendFuture, RegenerationBackend};
use crate::config::{EndpointSection, validate_base_url};
use crate::errors::{Result, WatchError};
use crate::types::{JobResult, WatchedResource};

/// Talks to the billing API over HTTP.
///
/// Path templates are joined onto `base_url`, so an absolute template
/// (`/api/...`) replaces any path already present in the base URL.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: Url,
    start_path: String,
    state_path: String,
    state_pointer: String,
    token: Option<String>,
}

impl HttpBackend {
    pub fn new(endpoint: &EndpointSection, token: Option<String>) -> Result<Self> {
        if endpoint.base_url.is_empty() {
            return Err(WatchError::ConfigError(
                "no base URL configured; set [endpoint].base_url or pass --base-url".to_string(),
            ));
        }
        let base_url = validate_base_url(&endpoint.base_url)?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(endpoint.request_timeout_ms))
            .build()?;

        Ok(Self {
            client,
            base_url,
            start_path: endpoint.start_path.clone(),
            state_path: endpoint.state_path.clone(),
            state_pointer: endpoint.state_pointer.clone(),
            token,
        })
    }

    /// Build a backend, reading the bearer token from the environment
    /// variable named by `[endpoint].token_env`.
    pub fn from_config(endpoint: &EndpointSection) -> Result<Self> {
        let token = match endpoint.token_env.as_deref() {
            Some(var) => match std::env::var(var) {
                Ok(token) if !token.trim().is_empty() => Some(token.trim().to_string()),
                _ => {
                    warn!(env = var, "token variable is unset or empty; sending no credentials");
                    None
                }
            },
            None => None,
        };
        Self::new(endpoint, token)
    }

    /// Substitute the URL-encoded `resource_id` into `template` and join it
    /// onto the base URL.
    pub fn endpoint_url(&self, template: &str, resource_id: &str) -> Result<Url> {
        let path = template.replace("{id}", &urlencoding::encode(resource_id));
        self.base_url.join(&path).map_err(|e| {
            WatchError::ConfigError(format!("cannot build URL from '{path}': {e}"))
        })
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn extract_resource(&self, body: serde_json::Value) -> Result<Option<WatchedResource>> {
        let node = if self.state_pointer.is_empty() {
            body
        } else {
            body.pointer(&self.state_pointer).cloned().ok_or_else(|| {
                WatchError::Other(anyhow!(
                    "state response has no value at pointer '{}'",
                    self.state_pointer
                ))
            })?
        };

        if node.is_null() {
            return Ok(None);
        }

        Ok(Some(serde_json::from_value(node)?))
    }
}

impl RegenerationBackend for HttpBackend {
    fn start_regeneration(&self, resource_id: &str) -> BackendFuture<'_, JobResult> {
        let url = self.endpoint_url(&self.start_path, resource_id);

        Box::pin(async move {
            let url = url?;
            debug!(%url, "sending start-regeneration request");

            let response = self.authorize(self.client.post(url)).send().await?;
            let status = response.status();

            if status.is_success() {
                debug!(%status, "start-regeneration accepted");
                return Ok(JobResult::Accepted);
            }

            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            Ok(JobResult::Rejected(format!("{status}: {}", body.trim())))
        })
    }

    fn fetch_current(&self, resource_id: &str) -> BackendFuture<'_, Option<WatchedResource>> {
        let url = self.endpoint_url(&self.state_path, resource_id);

        Box::pin(async move {
            let url = url?;
            let response = self.authorize(self.client.get(url)).send().await?;
            let status = response.status();

            if status == StatusCode::NOT_FOUND {
                return Ok(None);
            }

            if !status.is_success() {
                let message = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                return Err(WatchError::Endpoint {
                    status: status.as_u16(),
                    message: message.trim().to_string(),
                });
            }

            let body: serde_json::Value = response.json().await?;
            self.extract_resource(body)
        })
    }
}
