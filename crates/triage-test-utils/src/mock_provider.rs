// SPDX-FileCopyrightText: 2026 Triage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock completion port for deterministic testing.
//!
//! `MockProvider` implements `CompletionAdapter` by replaying a FIFO script,
//! enabling fast, CI-runnable tests without external API calls. Every request
//! it receives is captured for later assertions.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use triage_core::traits::adapter::PluginAdapter;
use triage_core::traits::completion::CompletionAdapter;
use triage_core::types::{
    AdapterType, CompletionContent, CompletionRequest, CompletionResponse, HealthStatus,
    TokenUsage,
};
use triage_core::{Intent, TriageError};

/// Model name reported when a request does not name one.
const MOCK_MODEL: &str = "mock-model";

/// One scripted outcome of a `complete` call.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Answer with free-form text.
    Text(String),
    /// Answer with a structured value.
    Structured(serde_json::Value),
    /// Fail with a provider error carrying this message.
    Fail(String),
    /// Never answer. Pair with a timeout.
    Hang,
}

impl MockReply {
    /// A structured classification answer for `intent`.
    pub fn intent(intent: Intent) -> Self {
        MockReply::Structured(serde_json::json!({ "message_type": intent.as_str() }))
    }

    /// A text answer.
    pub fn text(text: impl Into<String>) -> Self {
        MockReply::Text(text.into())
    }
}

/// A mock completion port that replays pre-configured outcomes.
///
/// Outcomes are popped from a FIFO queue. When the queue is empty,
/// a default "mock response" text is returned.
pub struct MockProvider {
    script: Arc<Mutex<VecDeque<MockReply>>>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl MockProvider {
    /// Create a new mock provider with an empty script.
    pub fn new() -> Self {
        Self::with_script(Vec::new())
    }

    /// Create a mock provider pre-loaded with the given outcomes.
    pub fn with_script(script: Vec<MockReply>) -> Self {
        Self {
            script: Arc::new(Mutex::new(VecDeque::from(script))),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Add an outcome to the end of the script.
    pub async fn push(&self, reply: MockReply) {
        self.script.lock().await.push_back(reply);
    }

    /// Every request received so far, in arrival order.
    pub async fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().await.clone()
    }

    /// Number of scripted outcomes not yet consumed.
    pub async fn remaining(&self) -> usize {
        self.script.lock().await.len()
    }

    async fn next_reply(&self) -> MockReply {
        self.script
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| MockReply::Text("mock response".to_string()))
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockProvider {
    fn name(&self) -> &str {
        "mock-provider"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Completion
    }

    async fn health_check(&self) -> Result<HealthStatus, TriageError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), TriageError> {
        Ok(())
    }
}

#[async_trait]
impl CompletionAdapter for MockProvider {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, TriageError> {
        let model = request
            .model
            .clone()
            .unwrap_or_else(|| MOCK_MODEL.to_string());
        self.requests.lock().await.push(request);

        let content = match self.next_reply().await {
            MockReply::Text(text) => CompletionContent::Text(text),
            MockReply::Structured(value) => CompletionContent::Structured(value),
            MockReply::Fail(message) => return Err(TriageError::provider(message)),
            MockReply::Hang => std::future::pending::<CompletionContent>().await,
        };

        Ok(CompletionResponse {
            content,
            model,
            usage: TokenUsage {
                input_tokens: 10,
                output_tokens: 20,
            },
        })
    }
}
