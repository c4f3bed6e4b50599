// SPDX-FileCopyrightText: 2026 Triage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Anthropic Messages API.
//!
//! Provides [`AnthropicClient`] which handles request construction,
//! authentication, and transient error retry.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::{HeaderMap, HeaderValue};
use tracing::{debug, warn};
use triage_core::TriageError;

use crate::types::{ApiErrorResponse, MessageRequest, MessageResponse};

/// Transport-level deadline. Completion deadlines are enforced by the orchestrator.
const HTTP_TIMEOUT: Duration = Duration::from_secs(300);

/// Outcome of a single POST to the Messages endpoint.
#[derive(Debug)]
enum Attempt {
    Done(MessageResponse),
    /// Worth another try after the retry delay.
    Retryable(TriageError),
    Failed(TriageError),
}

/// HTTP client for Anthropic API communication.
///
/// Cloning is cheap and shares the connection pool, so one client serves
/// any number of concurrent requests.
#[derive(Debug, Clone)]
pub struct AnthropicClient {
    http: reqwest::Client,
    endpoint: String,
    default_model: String,
    max_retries: u32,
    retry_delay: Duration,
}

impl AnthropicClient {
    /// Creates a client that authenticates with `api_key` and posts to `base_url`.
    pub fn new(
        api_key: String,
        api_version: String,
        model: String,
        base_url: String,
    ) -> Result<Self, TriageError> {
        let http = reqwest::Client::builder()
            .default_headers(auth_headers(&api_key, &api_version)?)
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| TriageError::Provider {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            http,
            endpoint: base_url,
            default_model: model,
            max_retries: 1,
            retry_delay: Duration::from_secs(1),
        })
    }

    /// Returns the default model identifier.
    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    /// Overrides the delay between attempts after a transient error.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Sends a request and returns the parsed response.
    ///
    /// Transient statuses (429, 500, 503, 529) are retried up to
    /// `max_retries` times. Transport failures and all other statuses fail
    /// immediately.
    pub async fn complete_message(
        &self,
        request: &MessageRequest,
    ) -> Result<MessageResponse, TriageError> {
        let mut retries = 0;
        loop {
            match self.send_once(request).await {
                Attempt::Done(response) => return Ok(response),
                Attempt::Retryable(err) if retries < self.max_retries => {
                    retries += 1;
                    warn!(retries, error = %err, "transient completion error, retrying");
                    tokio::time::sleep(self.retry_delay).await;
                }
                Attempt::Retryable(err) | Attempt::Failed(err) => return Err(err),
            }
        }
    }

    async fn send_once(&self, request: &MessageRequest) -> Attempt {
        let response = match self.http.post(&self.endpoint).json(request).send().await {
            Ok(response) => response,
            Err(e) => {
                return Attempt::Failed(TriageError::Provider {
                    message: format!("HTTP request failed: {e}"),
                    source: Some(Box::new(e)),
                });
            }
        };
        let status = response.status();
        debug!(status = %status, "completion response received");

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                return Attempt::Failed(TriageError::Provider {
                    message: format!("failed to read response body: {e}"),
                    source: Some(Box::new(e)),
                });
            }
        };

        if status.is_success() {
            return match serde_json::from_str(&body) {
                Ok(parsed) => Attempt::Done(parsed),
                Err(e) => Attempt::Failed(TriageError::Provider {
                    message: format!("failed to parse API response: {e}"),
                    source: Some(Box::new(e)),
                }),
            };
        }

        let err = api_error(status, &body);
        if is_transient(status) {
            Attempt::Retryable(err)
        } else {
            Attempt::Failed(err)
        }
    }
}

fn auth_headers(api_key: &str, api_version: &str) -> Result<HeaderMap, TriageError> {
    let value = |name: &str, raw: &str| {
        HeaderValue::from_str(raw)
            .map_err(|e| TriageError::Config(format!("invalid {name} header value: {e}")))
    };
    let mut headers = HeaderMap::new();
    headers.insert("x-api-key", value("API key", api_key)?);
    headers.insert("anthropic-version", value("API version", api_version)?);
    headers.insert("content-type", HeaderValue::from_static("application/json"));
    Ok(headers)
}

/// Maps a non-success response to a provider error, preferring the typed
/// error envelope when the body carries one.
fn api_error(status: StatusCode, body: &str) -> TriageError {
    match serde_json::from_str::<ApiErrorResponse>(body) {
        Ok(envelope) => TriageError::provider(format!(
            "Anthropic API error ({}): {}",
            envelope.error.type_, envelope.error.message
        )),
        Err(_) => TriageError::provider(format!("API returned {status}: {body}")),
    }
}

fn is_transient(status: StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 503 | 529)
}
