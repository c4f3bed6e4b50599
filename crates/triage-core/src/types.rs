// SPDX-FileCopyrightText: 2026 Triage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across adapter traits and the Triage orchestration core.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

/// Unique identifier for a persisted conversation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationId(pub String);

impl std::fmt::Display for ConversationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the type of adapter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Completion,
    Storage,
}

// --- Conversation types ---

/// Author of a conversation turn.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

/// The closed set of categories describing a user message's primary need.
///
/// Each intent names exactly one agent in the registry.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Intent {
    /// Therapy, feelings, mental health, personal support.
    Emotional,
    /// Analysis, reasoning, data, problem-solving, factual questions.
    Logical,
    /// Learning, explanations, homework, tutoring.
    Study,
    /// Writing, art, brainstorming, stories.
    Creative,
    /// Scheduling, goals, time management, organization.
    Planning,
}

impl Intent {
    /// Every intent, in declaration order.
    pub const ALL: [Intent; 5] = [
        Intent::Emotional,
        Intent::Logical,
        Intent::Study,
        Intent::Creative,
        Intent::Planning,
    ];

    /// The wire label of this intent (`"emotional"`, `"logical"`, ...).
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// Position of this intent in [`Intent::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// Parse a label produced by a completion port.
    ///
    /// Only surrounding whitespace is tolerated; the label itself must match
    /// one of the five lowercase values exactly.
    pub fn parse_label(label: &str) -> Option<Intent> {
        label.trim().parse().ok()
    }
}

/// One role-tagged message in a conversation.
///
/// Turns are immutable once created; conversation order is insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
    /// Set only on assistant turns produced by an agent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<Intent>,
    pub created_at: DateTime<Utc>,
}

impl Turn {
    fn new(role: Role, content: impl Into<String>, intent: Option<Intent>) -> Self {
        Self {
            role,
            content: content.into(),
            intent,
            created_at: Utc::now(),
        }
    }

    /// A user turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content, None)
    }

    /// An assistant turn attributed to the agent that produced it.
    pub fn assistant(content: impl Into<String>, intent: Intent) -> Self {
        Self::new(Role::Assistant, content, Some(intent))
    }

    /// An assistant turn with no agent attribution (e.g. imported history).
    pub fn assistant_unattributed(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content, None)
    }

    /// A system turn.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content, None)
    }
}

/// The unit of work passed through one orchestrator invocation.
///
/// Constructed fresh per request; never shared between requests.
#[derive(Debug, Clone, Default)]
pub struct ConversationState {
    pub turns: Vec<Turn>,
    /// Scratch slot written after classification and read by routing.
    pub current_intent: Option<Intent>,
}

impl ConversationState {
    pub fn new(turns: Vec<Turn>) -> Self {
        Self {
            turns,
            current_intent: None,
        }
    }

    /// The most recent turn with `role == user`, if any.
    pub fn latest_user_turn(&self) -> Option<&Turn> {
        latest_user_turn(&self.turns)
    }
}

/// The most recent user turn in `turns`, if any.
pub fn latest_user_turn(turns: &[Turn]) -> Option<&Turn> {
    turns.iter().rev().find(|t| t.role == Role::User)
}

/// Where the intent recorded on a reply came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum IntentSource {
    /// The classifier produced a valid intent.
    Classified,
    /// Classification failed and the router's fallback intent was substituted.
    Fallback,
}

/// The terminal output of a successful orchestrator run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reply {
    pub text: String,
    /// The intent resolved at routing; always the agent that produced `text`.
    pub intent: Intent,
    pub intent_source: IntentSource,
}

impl Reply {
    /// Convert into the assistant turn the caller persists.
    pub fn to_turn(&self) -> Turn {
        Turn::assistant(self.text.clone(), self.intent)
    }
}

// --- Completion types ---

/// A single message sent to a completion port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionMessage {
    pub role: Role,
    pub content: String,
}

impl From<&Turn> for CompletionMessage {
    fn from(turn: &Turn) -> Self {
        Self {
            role: turn.role,
            content: turn.content.clone(),
        }
    }
}

/// Constraint on the shape of a completion result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseSchema {
    /// The result must be an object `{ <field>: <one of values> }`.
    ClosedEnum {
        /// Name of the structured-output function/tool.
        name: String,
        /// Field carrying the chosen value.
        field: String,
        /// Description of the field shown to the model.
        description: String,
        values: Vec<String>,
    },
}

impl ResponseSchema {
    /// JSON Schema describing the constrained object.
    pub fn to_json_schema(&self) -> serde_json::Value {
        match self {
            ResponseSchema::ClosedEnum {
                field,
                description,
                values,
                ..
            } => {
                let mut properties = serde_json::Map::new();
                properties.insert(
                    field.clone(),
                    serde_json::json!({
                        "type": "string",
                        "enum": values,
                        "description": description,
                    }),
                );
                serde_json::json!({
                    "type": "object",
                    "properties": properties,
                    "required": [field],
                })
            }
        }
    }
}

/// A request to a completion port.
#[derive(Debug, Clone, Default)]
pub struct CompletionRequest {
    /// Model override; the port's default model is used when `None`.
    pub model: Option<String>,
    pub system_prompt: Option<String>,
    pub messages: Vec<CompletionMessage>,
    pub max_tokens: Option<u32>,
    /// When set, the port must return a value constrained to this schema.
    pub response_schema: Option<ResponseSchema>,
}

/// Body of a completion result.
#[derive(Debug, Clone, PartialEq)]
pub enum CompletionContent {
    /// Free-form text.
    Text(String),
    /// Schema-constrained structured value.
    Structured(serde_json::Value),
}

impl CompletionContent {
    /// The text body, or the compact JSON rendering of a structured value.
    pub fn into_text(self) -> String {
        match self {
            CompletionContent::Text(text) => text,
            CompletionContent::Structured(value) => value.to_string(),
        }
    }
}

/// Token usage statistics from a completion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// A response from a completion port.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    pub content: CompletionContent,
    pub model: String,
    pub usage: TokenUsage,
}

// --- Storage types ---

/// Metadata of a persisted conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: ConversationId,
    pub title: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub turn_count: usize,
}
