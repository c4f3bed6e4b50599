// SPDX-FileCopyrightText: 2026 Triage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Triage intent router.
//!
//! This crate provides the conversation types, the completion port and
//! conversation store traits, and the error type shared by every other
//! crate in the workspace.

pub mod error;
pub mod traits;
pub mod types;

pub use error::{ClassificationFailure, TriageError};
pub use types::{
    CompletionContent, CompletionMessage, CompletionRequest, CompletionResponse,
    Conversation, ConversationId, ConversationState, HealthStatus, Intent, IntentSource, Reply,
    ResponseSchema, Role, TokenUsage, Turn,
};

pub use traits::{CompletionAdapter, ConversationStore, PluginAdapter};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triage_error_messages() {
        let err = TriageError::Classification {
            kind: ClassificationFailure::OutOfSchema,
            message: "got `humor`".into(),
        };
        assert_eq!(
            err.to_string(),
            "classification error (out_of_schema): got `humor`"
        );
        assert_eq!(err.classification_kind(), Some(ClassificationFailure::OutOfSchema));

        let err = TriageError::Generation {
            intent: Intent::Study,
            message: "boom".into(),
        };
        assert_eq!(err.to_string(), "generation error for study agent: boom");
        assert!(err.classification_kind().is_none());
    }

    #[test]
    fn provider_shorthand_has_no_source() {
        let err = TriageError::provider("down");
        assert!(matches!(err, TriageError::Provider { ref message, source: None } if message == "down"));
    }

    #[test]
    fn all_trait_modules_are_exported() {
        fn _assert_completion_adapter<T: CompletionAdapter>() {}
        fn _assert_conversation_store<T: ConversationStore>() {}
        fn _assert_plugin_adapter<T: PluginAdapter>() {}
    }
}
