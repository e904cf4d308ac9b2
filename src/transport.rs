//! Transport boundary between the agent and the provider endpoint
//!
//! The agent hands a serialized request body to a [`Transport`] and gets back
//! the parsed response body. [`HttpTransport`] is the production
//! implementation; tests substitute a scripted one.

use crate::config::{self, ANTHROPIC_API_VERSION};
use crate::types::AgentOptions;
use crate::{Error, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

/// A single request/response exchange with the provider.
///
/// Implementations return the parsed JSON body on success. Any non-success
/// outcome is an error; for HTTP responses it carries the raw body text.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, body: &Value) -> Result<Value>;
}

/// Posts requests to `{base_url}/messages` with the provider's auth headers.
pub struct HttpTransport {
    http_client: reqwest::Client,
    url: String,
    api_key: Option<String>,
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("url", &self.url)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .finish()
    }
}

impl HttpTransport {
    /// Build a transport from the agent options.
    ///
    /// The credential is resolved here, once: `options.api_key` if set, else
    /// `ANTHROPIC_API_KEY`. A missing credential is only reported when a
    /// request is attempted.
    pub fn new(options: &AgentOptions) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(options.timeout))
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            url: format!("{}/messages", options.base_url.trim_end_matches('/')),
            api_key: options.api_key.clone().or_else(config::get_api_key),
        })
    }

    /// Endpoint this transport posts to
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, body: &Value) -> Result<Value> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            Error::auth(format!(
                "{} is not set and no API key was configured",
                config::API_KEY_ENV
            ))
        })?;

        let response = self
            .http_client
            .post(&self.url)
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_API_VERSION)
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::Timeout
                } else {
                    Error::Http(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|e| {
                log::warn!("Failed to read error response body: {}", e);
                String::new()
            });
            log::warn!("Provider returned {}: {}", status, body);
            return Err(Error::api(status.as_u16(), body));
        }

        Ok(response.json::<Value>().await?)
    }
}
