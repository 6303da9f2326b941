//! JSON-over-HTTP client for the remote API.

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use thesis_core::config::ApiConfig;
use thesis_core::session::Credential;
use thesis_core::{Result, ThesisError};

/// Thin wrapper over `reqwest::Client` bound to one base URL.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ThesisError::config(format!("failed to build HTTP client: {e}")))?;
        let base_url: String = base_url.into();
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        Self::new(config.base_url.clone(), Duration::from_secs(config.timeout_secs))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get(&self, path: &str, credential: Option<&Credential>) -> Result<Value> {
        self.send(self.client.get(self.url(path)), credential).await
    }

    pub async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        credential: Option<&Credential>,
    ) -> Result<Value> {
        self.send(self.client.post(self.url(path)).json(body), credential)
            .await
    }

    pub async fn put<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        credential: Option<&Credential>,
    ) -> Result<Value> {
        self.send(self.client.put(self.url(path)).json(body), credential)
            .await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, request: RequestBuilder, credential: Option<&Credential>) -> Result<Value> {
        let request = match credential {
            Some(credential) => request.bearer_auth(credential.expose()),
            None => request,
        };

        let response = request
            .send()
            .await
            .map_err(|e| request_error(e, self.timeout))?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_error(status));
        }

        let text = response
            .text()
            .await
            .map_err(|e| request_error(e, self.timeout))?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        // Backend-defined bodies; plain text is kept as a string.
        Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)))
    }
}

/// Maps a non-2xx status. The body is not parsed.
pub fn status_error(status: StatusCode) -> ThesisError {
    let text = status.canonical_reason().unwrap_or("Unknown status").to_string();
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            ThesisError::authorization(format!("{} {text}", status.as_u16()))
        }
        StatusCode::NOT_FOUND => ThesisError::not_found("resource", text),
        StatusCode::CONFLICT => ThesisError::conflict("current stage", format!("{} {text}", status.as_u16())),
        _ => ThesisError::transport(status.as_u16(), text),
    }
}

fn request_error(err: reqwest::Error, timeout: Duration) -> ThesisError {
    if err.is_timeout() {
        return ThesisError::Timeout(format!("no response within {}s", timeout.as_secs()));
    }
    match err.status() {
        Some(status) => status_error(status),
        None => ThesisError::transport(0, err.to_string()),
    }
}
