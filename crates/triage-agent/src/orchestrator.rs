// SPDX-FileCopyrightText: 2026 Triage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Single-shot classify, route, generate state machine.
//!
//! Every call to [`Orchestrator::run`] drives a fresh machine through
//! `start -> classifying -> routing -> generating -> done`, or into `failed`
//! from `classifying` or `generating`. No machine state survives a call.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info};
use triage_config::model::TriageConfig;
use triage_core::{
    ClassificationFailure, CompletionAdapter, ConversationState, Intent, Reply, TriageError, Turn,
};
use triage_router::{resolve, route, IntentClassifier, RoutingDecision};

use crate::agent::{GenerationSettings, PersonaAgent};
use crate::registry::AgentRegistry;

/// States of one orchestrator run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrchestratorState {
    Start,
    Classifying,
    Routing,
    Generating,
    /// Terminal: a reply was produced.
    Done,
    /// Terminal: the request failed.
    Failed,
}

impl std::fmt::Display for OrchestratorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrchestratorState::Start => write!(f, "start"),
            OrchestratorState::Classifying => write!(f, "classifying"),
            OrchestratorState::Routing => write!(f, "routing"),
            OrchestratorState::Generating => write!(f, "generating"),
            OrchestratorState::Done => write!(f, "done"),
            OrchestratorState::Failed => write!(f, "failed"),
        }
    }
}

impl OrchestratorState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrchestratorState::Done | OrchestratorState::Failed)
    }
}

/// Result of one run together with the states it passed through.
#[derive(Debug)]
pub struct RunOutcome {
    pub reply: Result<Reply, TriageError>,
    pub trace: Vec<OrchestratorState>,
}

impl RunOutcome {
    /// The terminal state of the run.
    pub fn final_state(&self) -> OrchestratorState {
        self.trace.last().copied().unwrap_or(OrchestratorState::Start)
    }
}

/// Per-request machine. Owns the conversation state for exactly one run.
struct Run {
    state: OrchestratorState,
    trace: Vec<OrchestratorState>,
    conversation: ConversationState,
}

impl Run {
    fn start(history: Vec<Turn>) -> Self {
        Self {
            state: OrchestratorState::Start,
            trace: vec![OrchestratorState::Start],
            conversation: ConversationState::new(history),
        }
    }

    fn transition(&mut self, next: OrchestratorState) {
        debug!(from = %self.state, to = %next, "orchestrator transition");
        self.state = next;
        self.trace.push(next);
    }

    fn finish(mut self, reply: Reply) -> RunOutcome {
        self.transition(OrchestratorState::Done);
        RunOutcome {
            reply: Ok(reply),
            trace: self.trace,
        }
    }

    fn fail(mut self, err: TriageError) -> RunOutcome {
        debug!(state = %self.state, error = %err, "orchestrator run failed");
        self.transition(OrchestratorState::Failed);
        RunOutcome {
            reply: Err(err),
            trace: self.trace,
        }
    }
}

/// Sequences classification, routing and generation for one request at a time.
///
/// Holds only read-only collaborators, so one instance serves any number of
/// concurrent requests.
pub struct Orchestrator {
    provider: Arc<dyn CompletionAdapter>,
    classifier: IntentClassifier,
    registry: Arc<AgentRegistry>,
    generation: GenerationSettings,
    classification_timeout: Duration,
    generation_timeout: Duration,
}

impl Orchestrator {
    /// Create an orchestrator with the built-in classifier and default deadlines.
    pub fn new(provider: Arc<dyn CompletionAdapter>, registry: Arc<AgentRegistry>) -> Self {
        let defaults = triage_config::model::OrchestratorConfig::default();
        Self {
            classifier: IntentClassifier::new(provider.clone()),
            provider,
            registry,
            generation: GenerationSettings::default(),
            classification_timeout: defaults.classification_timeout(),
            generation_timeout: defaults.generation_timeout(),
        }
    }

    /// Create an orchestrator from the full configuration.
    pub fn from_config(
        provider: Arc<dyn CompletionAdapter>,
        registry: Arc<AgentRegistry>,
        config: &TriageConfig,
    ) -> Self {
        Self {
            classifier: IntentClassifier::from_config(provider.clone(), &config.classifier),
            provider,
            registry,
            generation: GenerationSettings {
                model: Some(config.anthropic.default_model.clone()),
                max_tokens: Some(config.anthropic.max_tokens),
            },
            classification_timeout: config.orchestrator.classification_timeout(),
            generation_timeout: config.orchestrator.generation_timeout(),
        }
    }

    /// Override both completion deadlines.
    pub fn with_timeouts(mut self, classification: Duration, generation: Duration) -> Self {
        self.classification_timeout = classification;
        self.generation_timeout = generation;
        self
    }

    pub fn registry(&self) -> &AgentRegistry {
        &self.registry
    }

    /// Classify the latest user turn, bounded by the classification deadline.
    ///
    /// Returns the raw classifier outcome; no fallback is applied.
    pub async fn classify(&self, history: &[Turn]) -> Result<Intent, TriageError> {
        match tokio::time::timeout(self.classification_timeout, self.classifier.classify(history))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(TriageError::Classification {
                kind: ClassificationFailure::Timeout,
                message: format!(
                    "no answer within {}s",
                    self.classification_timeout.as_secs_f64()
                ),
            }),
        }
    }

    /// Classify and route without generating: the agent that would answer.
    pub async fn route_only(&self, history: &[Turn]) -> Result<RoutingDecision, TriageError> {
        resolve(self.classify(history).await)
    }

    /// Drive one fresh state machine over `history`.
    pub async fn run(&self, history: Vec<Turn>) -> RunOutcome {
        let started = Instant::now();
        let mut run = Run::start(history);

        run.transition(OrchestratorState::Classifying);
        let classified = self.classify(&run.conversation.turns).await;
        let decision = match resolve(classified) {
            Ok(decision) => decision,
            Err(err) => return run.fail(err),
        };
        run.conversation.current_intent = Some(decision.intent);

        run.transition(OrchestratorState::Routing);
        let intent = route(run.conversation.current_intent);
        let spec = self.registry.get(intent);

        run.transition(OrchestratorState::Generating);
        let agent = PersonaAgent::new(spec, self.provider.clone(), &self.generation);
        let generated =
            tokio::time::timeout(self.generation_timeout, agent.generate(&run.conversation.turns))
                .await;

        let text = match generated {
            Ok(Ok(text)) => text,
            Ok(Err(err)) => return run.fail(err),
            Err(_) => {
                return run.fail(TriageError::Generation {
                    intent,
                    message: format!(
                        "no reply within {}s",
                        self.generation_timeout.as_secs_f64()
                    ),
                });
            }
        };

        info!(
            intent = intent.as_str(),
            source = %decision.source,
            turns = run.conversation.turns.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "reply ready"
        );
        run.finish(Reply {
            text,
            intent,
            intent_source: decision.source,
        })
    }

    /// Run over `history` and return only the reply.
    pub async fn handle(&self, history: Vec<Turn>) -> Result<Reply, TriageError> {
        self.run(history).await.reply
    }

    /// Stateless inbound contract: prior history plus the new user text.
    ///
    /// The caller persists both the user turn and the returned reply.
    pub async fn handle_message(
        &self,
        mut history: Vec<Turn>,
        new_user_text: &str,
    ) -> Result<Reply, TriageError> {
        if new_user_text.trim().is_empty() {
            return Err(TriageError::InvalidInput("message text is empty".to_string()));
        }
        history.push(Turn::user(new_user_text));
        self.handle(history).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use triage_core::{IntentSource, Role};
    use triage_router::FALLBACK_INTENT;
    use tracing_test::traced_test;
    use triage_test_utils::{MockProvider, MockReply};

    use OrchestratorState::*;

    fn orchestrator(script: Vec<MockReply>) -> (Orchestrator, Arc<MockProvider>) {
        let provider = Arc::new(MockProvider::with_script(script));
        let orchestrator = Orchestrator::new(provider.clone(), Arc::new(AgentRegistry::builtin()));
        (orchestrator, provider)
    }

    #[tokio::test]
    async fn emotional_message_reaches_emotional_agent() {
        let (orchestrator, provider) = orchestrator(vec![
            MockReply::intent(Intent::Emotional),
            MockReply::text("That sounds stressful."),
        ]);
        let outcome = orchestrator
            .run(vec![Turn::user("I'm stressed about interviews")])
            .await;

        assert_eq!(outcome.trace, vec![Start, Classifying, Routing, Generating, Done]);
        let reply = outcome.reply.unwrap();
        assert_eq!(reply.intent, Intent::Emotional);
        assert_eq!(reply.intent_source, IntentSource::Classified);
        assert_eq!(reply.text, "That sounds stressful.");

        let requests = provider.requests().await;
        assert_eq!(requests.len(), 2);
        assert_eq!(
            requests[1].system_prompt.as_deref(),
            Some(orchestrator.registry().get(Intent::Emotional).system_prompt.as_str())
        );
    }

    #[tokio::test]
    #[traced_test]
    async fn successful_run_logs_resolved_intent() {
        let (orchestrator, _) = orchestrator(vec![
            MockReply::intent(Intent::Planning),
            MockReply::text("Block your mornings."),
        ]);
        orchestrator
            .handle(vec![Turn::user("How do I stop procrastinating?")])
            .await
            .unwrap();
        assert!(logs_contain("reply ready"));
        assert!(logs_contain("planning"));
    }

    #[tokio::test]
    async fn classification_failure_falls_back_to_logical() {
        let (orchestrator, provider) = orchestrator(vec![
            MockReply::Fail("connection reset".into()),
            MockReply::text("Here is an analysis."),
        ]);
        let outcome = orchestrator.run(vec![Turn::user("Compare Rust and Go")]).await;

        assert_eq!(outcome.final_state(), Done);
        let reply = outcome.reply.unwrap();
        assert_eq!(reply.intent, FALLBACK_INTENT);
        assert_eq!(reply.intent_source, IntentSource::Fallback);
        let requests = provider.requests().await;
        assert_eq!(
            requests[1].system_prompt.as_deref(),
            Some(orchestrator.registry().get(Intent::Logical).system_prompt.as_str())
        );
    }

    #[tokio::test]
    async fn out_of_schema_label_falls_back_like_a_failure() {
        let (orchestrator, _) = orchestrator(vec![
            MockReply::Structured(serde_json::json!({"message_type": "humor"})),
            MockReply::text("ok"),
        ]);
        let reply = orchestrator.handle(vec![Turn::user("tell me a joke")]).await.unwrap();
        assert_eq!(reply.intent, Intent::Logical);
        assert_eq!(reply.intent_source, IntentSource::Fallback);
    }

    #[tokio::test]
    async fn missing_user_turn_fails_during_classification() {
        let (orchestrator, provider) = orchestrator(vec![]);
        let outcome = orchestrator.run(vec![Turn::system("be brief")]).await;

        assert_eq!(outcome.trace, vec![Start, Classifying, Failed]);
        let err = outcome.reply.unwrap_err();
        assert_eq!(err.classification_kind(), Some(ClassificationFailure::NoUserTurn));
        assert!(provider.requests().await.is_empty());
    }

    #[tokio::test]
    async fn generation_failure_is_terminal() {
        let (orchestrator, provider) = orchestrator(vec![
            MockReply::intent(Intent::Study),
            MockReply::Fail("overloaded".into()),
        ]);
        let outcome = orchestrator.run(vec![Turn::user("explain monads")]).await;

        assert_eq!(outcome.trace, vec![Start, Classifying, Routing, Generating, Failed]);
        assert!(matches!(
            outcome.reply,
            Err(TriageError::Generation { intent: Intent::Study, .. })
        ));
        // Not retried.
        assert_eq!(provider.requests().await.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn classification_timeout_falls_back() {
        let (orchestrator, _) = orchestrator(vec![MockReply::Hang, MockReply::text("fine")]);
        let orchestrator =
            orchestrator.with_timeouts(Duration::from_secs(1), Duration::from_secs(10));
        let reply = orchestrator.handle(vec![Turn::user("hmm")]).await.unwrap();
        assert_eq!(reply.intent, FALLBACK_INTENT);
        assert_eq!(reply.intent_source, IntentSource::Fallback);
    }

    #[tokio::test(start_paused = true)]
    async fn classify_reports_timeout_kind() {
        let (orchestrator, _) = orchestrator(vec![MockReply::Hang]);
        let orchestrator =
            orchestrator.with_timeouts(Duration::from_secs(2), Duration::from_secs(10));
        let err = orchestrator.classify(&[Turn::user("hmm")]).await.unwrap_err();
        assert_eq!(err.classification_kind(), Some(ClassificationFailure::Timeout));
    }

    #[tokio::test(start_paused = true)]
    async fn generation_timeout_fails_the_run() {
        let (orchestrator, _) =
            orchestrator(vec![MockReply::intent(Intent::Creative), MockReply::Hang]);
        let orchestrator =
            orchestrator.with_timeouts(Duration::from_secs(1), Duration::from_secs(5));
        let outcome = orchestrator.run(vec![Turn::user("write a poem")]).await;
        assert_eq!(outcome.final_state(), Failed);
        match outcome.reply {
            Err(TriageError::Generation { intent, message }) => {
                assert_eq!(intent, Intent::Creative);
                assert!(message.contains("no reply within"));
            }
            other => panic!("expected generation timeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn handle_message_appends_the_new_user_turn() {
        let (orchestrator, provider) = orchestrator(vec![
            MockReply::intent(Intent::Emotional),
            MockReply::text("I'm here for you."),
        ]);
        let history = vec![
            Turn::user("Hi"),
            Turn::assistant("Hello, how can I help?", Intent::Logical),
        ];
        let reply = orchestrator
            .handle_message(history, "Actually I'm sad")
            .await
            .unwrap();
        assert_eq!(reply.intent, Intent::Emotional);

        let requests = provider.requests().await;
        assert_eq!(requests[0].messages.len(), 1);
        assert_eq!(requests[0].messages[0].content, "Actually I'm sad");
        let generation = &requests[1];
        assert_eq!(generation.messages.len(), 3);
        assert_eq!(generation.messages[2].role, Role::User);
    }

    #[tokio::test]
    async fn handle_message_rejects_blank_text() {
        let (orchestrator, provider) = orchestrator(vec![]);
        let err = orchestrator.handle_message(vec![], "   ").await.unwrap_err();
        assert!(matches!(err, TriageError::InvalidInput(_)));
        assert!(provider.requests().await.is_empty());
    }

    #[tokio::test]
    async fn route_only_applies_fallback_without_generating() {
        let (orchestrator, provider) = orchestrator(vec![MockReply::text("dunno")]);
        let decision = orchestrator.route_only(&[Turn::user("?")]).await.unwrap();
        assert_eq!(decision.intent, FALLBACK_INTENT);
        assert_eq!(provider.requests().await.len(), 1);
    }

    #[test]
    fn terminal_states() {
        assert!(Done.is_terminal());
        assert!(Failed.is_terminal());
        assert!(!Generating.is_terminal());
        assert_eq!(Classifying.to_string(), "classifying");
    }
}
