// SPDX-FileCopyrightText: 2026 Triage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles the complete classify, route, generate stack with
//! a scripted [`MockProvider`] and an in-memory conversation store.

use std::sync::Arc;
use std::time::Duration;

use triage_agent::{AgentRegistry, ChatResponse, ChatService, InMemoryConversationStore, Orchestrator};
use triage_config::model::TriageConfig;
use triage_core::{ConversationStore, TriageError};

use crate::mock_provider::{MockProvider, MockReply};

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    script: Vec<MockReply>,
    config: TriageConfig,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            script: Vec::new(),
            config: TriageConfig::default(),
        }
    }

    /// Set the scripted completion outcomes, consumed in call order.
    pub fn with_script(mut self, script: Vec<MockReply>) -> Self {
        self.script = script;
        self
    }

    /// Use a custom configuration (personas, models, deadlines).
    pub fn with_config(mut self, config: TriageConfig) -> Self {
        self.config = config;
        self
    }

    /// Set both completion deadlines, in seconds.
    pub fn with_timeouts(mut self, classification_secs: u64, generation_secs: u64) -> Self {
        self.config.orchestrator.classification_timeout_secs = classification_secs;
        self.config.orchestrator.generation_timeout_secs = generation_secs;
        self
    }

    /// Build the test harness, creating all required subsystems.
    pub async fn build(self) -> Result<TestHarness, TriageError> {
        let mock_provider = Arc::new(MockProvider::with_script(self.script));
        let registry = Arc::new(AgentRegistry::from_config(&self.config.personas).await);
        let orchestrator = Arc::new(Orchestrator::from_config(
            mock_provider.clone(),
            registry,
            &self.config,
        ));
        let store = Arc::new(InMemoryConversationStore::new());
        let service = ChatService::new(orchestrator.clone(), store.clone());

        Ok(TestHarness {
            mock_provider,
            store,
            orchestrator,
            service,
            config: self.config,
        })
    }
}

/// A complete test environment with a mock completion port and in-memory storage.
pub struct TestHarness {
    /// The scripted completion port.
    pub mock_provider: Arc<MockProvider>,
    /// In-memory conversation store.
    pub store: Arc<InMemoryConversationStore>,
    /// Orchestrator wired to the mock provider.
    pub orchestrator: Arc<Orchestrator>,
    /// Chat service over `orchestrator` and `store`.
    pub service: ChatService,
    /// Configuration the stack was built from.
    pub config: TriageConfig,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Send a message in a new conversation.
    pub async fn send_message(&self, text: &str) -> Result<ChatResponse, TriageError> {
        self.service.send(None, text).await
    }

    /// Send a message in an existing conversation.
    pub async fn send_in(
        &self,
        conversation_id: &str,
        text: &str,
    ) -> Result<ChatResponse, TriageError> {
        self.service.send(Some(conversation_id), text).await
    }

    /// Number of conversations in the store.
    pub async fn conversation_count(&self) -> Result<usize, TriageError> {
        Ok(self.store.list_conversations().await?.len())
    }

    /// The configured generation deadline.
    pub fn generation_timeout(&self) -> Duration {
        self.config.orchestrator.generation_timeout()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use triage_core::Intent;

    #[tokio::test]
    async fn harness_round_trip() {
        let harness = TestHarness::builder()
            .with_script(vec![
                MockReply::intent(Intent::Planning),
                MockReply::text("Step one: list your goals."),
            ])
            .build()
            .await
            .unwrap();

        let response = harness.send_message("Help me plan my week").await.unwrap();
        assert_eq!(response.reply.intent, Intent::Planning);
        assert_eq!(response.reply.text, "Step one: list your goals.");
        assert_eq!(harness.conversation_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn harness_uses_configured_generation_model() {
        let mut config = TriageConfig::default();
        config.anthropic.default_model = "claude-harness".into();
        let harness = TestHarness::builder()
            .with_config(config)
            .with_script(vec![MockReply::intent(Intent::Logical)])
            .build()
            .await
            .unwrap();

        harness.send_message("2+2?").await.unwrap();
        let requests = harness.mock_provider.requests().await;
        assert!(requests[0].model.is_none());
        assert_eq!(requests[1].model.as_deref(), Some("claude-harness"));
    }

    #[tokio::test]
    async fn timeouts_are_applied_to_config() {
        let harness = TestHarness::builder()
            .with_timeouts(3, 9)
            .build()
            .await
            .unwrap();
        assert_eq!(harness.generation_timeout(), Duration::from_secs(9));
    }
}
