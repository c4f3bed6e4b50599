// SPDX-FileCopyrightText: 2026 Triage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Intent classification through a schema-constrained completion call.
//!
//! Only the most recent user turn is sent to the completion port. The answer
//! must be one of the five intent labels; anything else is rejected rather
//! than coerced.

use std::sync::Arc;

use tracing::debug;
use triage_config::model::ClassifierConfig;
use triage_core::types::latest_user_turn;
use triage_core::{
    ClassificationFailure, CompletionAdapter, CompletionContent, CompletionMessage,
    CompletionRequest, Intent, ResponseSchema, Role, TriageError, Turn,
};

/// Name of the structured-output function the port is asked to fill in.
pub const CLASSIFY_TOOL_NAME: &str = "classify_message";

/// Field of the structured result carrying the intent label.
pub const CLASSIFY_FIELD: &str = "message_type";

/// Built-in system instruction for the classification call.
pub const DEFAULT_INSTRUCTION: &str = "\
Classify the user message based on their primary intent and need.

- emotional: therapy, feelings, mental health, personal support, anxiety, depression
- logical: analysis, reasoning, data, problem-solving, factual questions
- study: learning, explanations, homework, tutoring, \"explain this\", \"help me understand\"
- creative: writing, art, brainstorming, imagination, stories, creative projects
- planning: scheduling, goals, time management, organization, \"help me plan\"";

const FIELD_DESCRIPTION: &str = "The primary intent of the user message.";

const DEFAULT_MAX_TOKENS: u32 = 64;

/// Maps the latest user turn of a history to exactly one [`Intent`].
pub struct IntentClassifier {
    provider: Arc<dyn CompletionAdapter>,
    model: Option<String>,
    max_tokens: u32,
    instruction: String,
}

impl IntentClassifier {
    /// Create a classifier with the built-in instruction and the port's default model.
    pub fn new(provider: Arc<dyn CompletionAdapter>) -> Self {
        Self {
            provider,
            model: None,
            max_tokens: DEFAULT_MAX_TOKENS,
            instruction: DEFAULT_INSTRUCTION.to_string(),
        }
    }

    /// Create a classifier from the `[classifier]` config section.
    pub fn from_config(provider: Arc<dyn CompletionAdapter>, config: &ClassifierConfig) -> Self {
        Self {
            provider,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            instruction: config
                .instruction
                .clone()
                .unwrap_or_else(|| DEFAULT_INSTRUCTION.to_string()),
        }
    }

    /// The closed-enum constraint sent with every classification request.
    pub fn response_schema() -> ResponseSchema {
        ResponseSchema::ClosedEnum {
            name: CLASSIFY_TOOL_NAME.to_string(),
            field: CLASSIFY_FIELD.to_string(),
            description: FIELD_DESCRIPTION.to_string(),
            values: Intent::ALL.iter().map(|i| i.as_str().to_string()).collect(),
        }
    }

    /// Build the classification request for `history`.
    ///
    /// Fails with [`ClassificationFailure::NoUserTurn`] if the history has no
    /// user turn. Earlier turns never reach the request.
    pub fn build_request(&self, history: &[Turn]) -> Result<CompletionRequest, TriageError> {
        let target = latest_user_turn(history).ok_or_else(|| TriageError::Classification {
            kind: ClassificationFailure::NoUserTurn,
            message: "history contains no user turn".to_string(),
        })?;

        Ok(CompletionRequest {
            model: self.model.clone(),
            system_prompt: Some(self.instruction.clone()),
            messages: vec![CompletionMessage {
                role: Role::User,
                content: target.content.clone(),
            }],
            max_tokens: Some(self.max_tokens),
            response_schema: Some(Self::response_schema()),
        })
    }

    /// Classify the most recent user turn of `history`.
    ///
    /// Port failures and out-of-schema answers are returned as
    /// [`TriageError::Classification`]; this method never guesses.
    pub async fn classify(&self, history: &[Turn]) -> Result<Intent, TriageError> {
        let request = self.build_request(history)?;

        let response = self
            .provider
            .complete(request)
            .await
            .map_err(|e| TriageError::Classification {
                kind: ClassificationFailure::Provider,
                message: e.to_string(),
            })?;

        let intent = parse_response(&response.content)?;
        debug!(
            intent = intent.as_str(),
            model = response.model.as_str(),
            input_tokens = response.usage.input_tokens,
            "message classified"
        );
        Ok(intent)
    }
}

/// Extract the intent from a classification answer.
///
/// Accepts `{"message_type": "<label>"}` or a bare text label.
pub fn parse_response(content: &CompletionContent) -> Result<Intent, TriageError> {
    let label = match content {
        CompletionContent::Text(text) => text.as_str(),
        CompletionContent::Structured(value) => value
            .get(CLASSIFY_FIELD)
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| out_of_schema(format!("missing `{CLASSIFY_FIELD}` in {value}")))?,
    };

    Intent::parse_label(label).ok_or_else(|| out_of_schema(format!("got `{}`", label.trim())))
}

fn out_of_schema(message: String) -> TriageError {
    TriageError::Classification {
        kind: ClassificationFailure::OutOfSchema,
        message,
    }
}
