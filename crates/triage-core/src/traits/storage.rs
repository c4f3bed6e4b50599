// SPDX-FileCopyrightText: 2026 Triage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation store trait for history persistence backends.

use async_trait::async_trait;

use crate::error::TriageError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{Conversation, ConversationId, Turn};

/// Adapter for conversation history persistence.
///
/// Appends to a single conversation must be serialized by the store; the
/// orchestration core only ever reads a consistent snapshot.
#[async_trait]
pub trait ConversationStore: PluginAdapter {
    /// Creates an empty conversation.
    async fn create_conversation(
        &self,
        title: Option<String>,
    ) -> Result<Conversation, TriageError>;

    /// Fetches conversation metadata, or `None` if it does not exist.
    async fn get_conversation(
        &self,
        id: &ConversationId,
    ) -> Result<Option<Conversation>, TriageError>;

    /// Lists all conversations, most recently updated first.
    async fn list_conversations(&self) -> Result<Vec<Conversation>, TriageError>;

    /// Appends a turn and returns its zero-based index in the conversation.
    async fn append_turn(&self, id: &ConversationId, turn: Turn) -> Result<usize, TriageError>;

    /// Returns every turn of the conversation in insertion order.
    async fn turns(&self, id: &ConversationId) -> Result<Vec<Turn>, TriageError>;

    /// Sets the conversation title.
    async fn set_title(&self, id: &ConversationId, title: String) -> Result<(), TriageError>;
}
