//! FoundationClient -- concrete [`UpstreamClient`] over the provider's
//! HTTP endpoints.
//!
//! Two endpoints, three call styles: non-streaming completion, streaming
//! completion (SSE lines fed into the core accumulator), and the
//! Responses endpoint shared by memory and agent modes. Every call
//! carries the `Authorization: Api-Key ...` and `x-folder-id` headers.
//!
//! The API key lives in [`secrecy::SecretString`] inside the settings and
//! is only exposed when building request headers.

use futures_util::StreamExt;
use secrecy::ExposeSecret;
use serde_json::Value;

use std::sync::Arc;

use chatrelay_core::stream::StreamAccumulator;
use chatrelay_core::upstream::UpstreamClient;
use chatrelay_types::config::Settings;
use chatrelay_types::error::GatewayError;

/// HTTP client for the provider's completion and Responses endpoints.
pub struct FoundationClient {
    settings: Arc<Settings>,
    client: reqwest::Client,
    completion_url: String,
    assistant_url: String,
}

impl FoundationClient {
    pub fn new(settings: Arc<Settings>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .expect("failed to create reqwest client");
        let completion_url = settings.completion_url.clone();
        let assistant_url = settings.assistant_url.clone();

        Self {
            settings,
            client,
            completion_url,
            assistant_url,
        }
    }

    /// Override both endpoint URLs (useful for testing against a stub).
    pub fn with_urls(mut self, completion_url: String, assistant_url: String) -> Self {
        self.completion_url = completion_url;
        self.assistant_url = assistant_url;
        self
    }

    /// Attach the credential headers to a request.
    fn authorized(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::RequestBuilder, GatewayError> {
        let missing = || GatewayError::Config("upstream credentials are not configured".to_string());
        let api_key = self.settings.api_key.as_ref().ok_or_else(missing)?;
        let folder_id = self.settings.folder_id.as_ref().ok_or_else(missing)?;
        Ok(request
            .header(
                reqwest::header::AUTHORIZATION,
                format!("Api-Key {}", api_key.expose_secret()),
            )
            .header("x-folder-id", folder_id))
    }

    async fn post_json(&self, url: &str, body: &Value) -> Result<Value, GatewayError> {
        let response = self
            .authorized(self.client.post(url))?
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(%url, status = status.as_u16(), "upstream call failed");
            return Err(GatewayError::UpstreamStatus {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| GatewayError::Unavailable(format!("invalid JSON from upstream: {e}")))
    }
}

impl UpstreamClient for FoundationClient {
    async fn complete(&self, body: &Value) -> Result<Value, GatewayError> {
        self.post_json(&self.completion_url, body).await
    }

    async fn complete_stream(&self, body: &Value) -> Result<String, GatewayError> {
        let response = self
            .authorized(self.client.post(&self.completion_url))?
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "upstream streaming call failed");
            return Err(GatewayError::UpstreamStatus {
                status: status.as_u16(),
                body,
            });
        }

        let mut accumulator = StreamAccumulator::new();
        let mut stream = response.bytes_stream();
        let mut buffer: Vec<u8> = Vec::new();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(transport_error)?;
            buffer.extend_from_slice(&chunk);
            // Feed completed lines; keep the partial tail buffered.
            while let Some(newline) = buffer.iter().position(|b| *b == b'\n') {
                let line: Vec<u8> = buffer.drain(..=newline).collect();
                accumulator.push_line(String::from_utf8_lossy(&line).trim_end());
            }
        }
        if !buffer.is_empty() {
            accumulator.push_line(String::from_utf8_lossy(&buffer).trim_end());
        }

        Ok(accumulator.finish())
    }

    async fn respond(&self, body: &Value) -> Result<Value, GatewayError> {
        self.post_json(&self.assistant_url, body).await
    }
}

fn transport_error(err: reqwest::Error) -> GatewayError {
    if err.is_timeout() {
        GatewayError::Unavailable(format!("upstream timed out: {err}"))
    } else {
        GatewayError::Unavailable(err.to_string())
    }
}
