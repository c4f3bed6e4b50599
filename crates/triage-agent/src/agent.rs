// SPDX-FileCopyrightText: 2026 Triage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The single agent type shared by every persona.
//!
//! Personas differ only in the system prompt carried by their [`AgentSpec`];
//! generation itself is identical for all of them.

use std::sync::Arc;

use tracing::debug;
use triage_core::{
    CompletionAdapter, CompletionMessage, CompletionRequest, Intent, TriageError, Turn,
};

use crate::registry::AgentSpec;

/// Generation settings shared by all personas.
#[derive(Debug, Clone, Default)]
pub struct GenerationSettings {
    /// Model override; the port's default model is used when `None`.
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
}

/// A persona bound to a completion port for one generation.
pub struct PersonaAgent<'a> {
    spec: &'a AgentSpec,
    provider: Arc<dyn CompletionAdapter>,
    settings: &'a GenerationSettings,
}

impl<'a> PersonaAgent<'a> {
    pub fn new(
        spec: &'a AgentSpec,
        provider: Arc<dyn CompletionAdapter>,
        settings: &'a GenerationSettings,
    ) -> Self {
        Self {
            spec,
            provider,
            settings,
        }
    }

    /// The intent this agent serves.
    pub fn intent(&self) -> Intent {
        self.spec.id
    }

    /// The request sent for `history`: the persona prompt plus every turn, in order.
    pub fn build_request(&self, history: &[Turn]) -> CompletionRequest {
        CompletionRequest {
            model: self.settings.model.clone(),
            system_prompt: Some(self.spec.system_prompt.clone()),
            messages: history.iter().map(CompletionMessage::from).collect(),
            max_tokens: self.settings.max_tokens,
            response_schema: None,
        }
    }

    /// Produce one reply for the full conversation history.
    ///
    /// Port failures are returned as [`TriageError::Generation`]; no reply
    /// text is ever invented here.
    pub async fn generate(&self, history: &[Turn]) -> Result<String, TriageError> {
        let request = self.build_request(history);
        let response = self
            .provider
            .complete(request)
            .await
            .map_err(|e| TriageError::Generation {
                intent: self.spec.id,
                message: e.to_string(),
            })?;

        debug!(
            intent = self.spec.id.as_str(),
            model = response.model.as_str(),
            output_tokens = response.usage.output_tokens,
            "reply generated"
        );
        Ok(response.content.into_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use triage_core::Role;
    use triage_test_utils::{MockProvider, MockReply};

    use crate::registry::AgentRegistry;

    #[tokio::test]
    async fn generation_receives_full_history_and_persona_prompt() {
        let provider = Arc::new(MockProvider::with_script(vec![MockReply::text("Let's plan.")]));
        let registry = AgentRegistry::builtin();
        let settings = GenerationSettings {
            model: Some("claude-test".into()),
            max_tokens: Some(256),
        };
        let agent = PersonaAgent::new(registry.get(Intent::Planning), provider.clone(), &settings);

        let history = vec![
            Turn::system("The user prefers short answers."),
            Turn::user("Hi"),
            Turn::assistant("Hello, how can I help?", Intent::Logical),
            Turn::user("Help me plan my week"),
        ];
        let reply = agent.generate(&history).await.unwrap();
        assert_eq!(reply, "Let's plan.");

        let requests = provider.requests().await;
        let request = &requests[0];
        assert_eq!(
            request.system_prompt.as_deref(),
            Some(registry.get(Intent::Planning).system_prompt.as_str())
        );
        let roles: Vec<Role> = request.messages.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::System, Role::User, Role::Assistant, Role::User]);
        assert_eq!(request.messages[3].content, "Help me plan my week");
        assert_eq!(request.model.as_deref(), Some("claude-test"));
        assert_eq!(request.max_tokens, Some(256));
        assert!(request.response_schema.is_none());
    }

    #[tokio::test]
    async fn provider_failure_is_a_generation_error() {
        let provider = Arc::new(MockProvider::with_script(vec![MockReply::Fail("503".into())]));
        let registry = AgentRegistry::builtin();
        let settings = GenerationSettings::default();
        let agent = PersonaAgent::new(registry.get(Intent::Study), provider, &settings);

        let err = agent.generate(&[Turn::user("explain recursion")]).await.unwrap_err();
        match err {
            TriageError::Generation { intent, message } => {
                assert_eq!(intent, Intent::Study);
                assert!(message.contains("503"));
            }
            other => panic!("expected Generation error, got {other:?}"),
        }
    }

    #[test]
    fn every_persona_builds_the_same_request_shape() {
        let provider: Arc<dyn CompletionAdapter> = Arc::new(MockProvider::new());
        let registry = AgentRegistry::builtin();
        let settings = GenerationSettings::default();
        let history = vec![Turn::user("hello")];
        for spec in registry.iter() {
            let agent = PersonaAgent::new(spec, provider.clone(), &settings);
            assert_eq!(agent.intent(), spec.id);
            let request = agent.build_request(&history);
            assert_eq!(request.messages.len(), 1);
            assert_eq!(request.system_prompt.as_deref(), Some(spec.system_prompt.as_str()));
        }
    }
}
