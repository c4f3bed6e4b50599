// SPDX-FileCopyrightText: 2026 Triage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Triage intent router.

use thiserror::Error;

use crate::types::Intent;

/// Why intent classification failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ClassificationFailure {
    /// The completion port returned an error.
    Provider,
    /// The completion port did not answer within the classification timeout.
    Timeout,
    /// The completion port answered with a value outside the intent enumeration.
    OutOfSchema,
    /// The history contained no user turn to classify.
    NoUserTurn,
}

/// The primary error type used across adapter traits and the orchestration core.
#[derive(Debug, Error)]
pub enum TriageError {
    /// Configuration errors (invalid values, missing credentials).
    #[error("configuration error: {0}")]
    Config(String),

    /// LLM provider errors (transport failure, API error, malformed response).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Intent resolution failed.
    #[error("classification error ({kind}): {message}")]
    Classification {
        kind: ClassificationFailure,
        message: String,
    },

    /// Reply generation failed for the agent selected for `intent`.
    #[error("generation error for {intent} agent: {message}")]
    Generation { intent: Intent, message: String },

    /// The requested conversation does not exist.
    #[error("conversation not found: {0}")]
    ConversationNotFound(String),

    /// The caller supplied input the core cannot process.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl TriageError {
    /// Shorthand for a provider error without an underlying source.
    pub fn provider(message: impl Into<String>) -> Self {
        TriageError::Provider {
            message: message.into(),
            source: None,
        }
    }

    /// Returns the classification failure kind, if this is a classification error.
    pub fn classification_kind(&self) -> Option<ClassificationFailure> {
        match self {
            TriageError::Classification { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}
