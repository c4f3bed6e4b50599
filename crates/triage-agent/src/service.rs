// SPDX-FileCopyrightText: 2026 Triage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation-level entry point: persist, orchestrate, persist.
//!
//! [`ChatService::send`] owns the read-modify-write cycle around one
//! orchestrator run. Requests for the same conversation are serialized here
//! so every run sees a consistent, already-ordered history.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info};
use triage_core::{ConversationId, ConversationStore, Reply, Role, TriageError, Turn};

use crate::orchestrator::Orchestrator;

/// Title used when a conversation has no user message to derive one from.
pub const DEFAULT_TITLE: &str = "New Conversation";

const TITLE_MAX_CHARS: usize = 50;

/// Result of one [`ChatService::send`] call.
#[derive(Debug, Clone)]
pub struct ChatResponse {
    pub conversation_id: ConversationId,
    pub reply: Reply,
    /// Index of the persisted assistant turn within the conversation.
    pub message_index: usize,
}

/// Drives orchestrator runs against a [`ConversationStore`].
pub struct ChatService {
    orchestrator: Arc<Orchestrator>,
    store: Arc<dyn ConversationStore>,
    locks: Mutex<HashMap<ConversationId, Arc<Mutex<()>>>>,
}

impl ChatService {
    pub fn new(orchestrator: Arc<Orchestrator>, store: Arc<dyn ConversationStore>) -> Self {
        Self {
            orchestrator,
            store,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn store(&self) -> &Arc<dyn ConversationStore> {
        &self.store
    }

    /// Send `text` to an existing conversation, or start a new one when
    /// `conversation_id` is `None`.
    ///
    /// The user turn is persisted before the run and stays persisted if the
    /// run fails. The assistant turn is persisted only on success.
    pub async fn send(
        &self,
        conversation_id: Option<&str>,
        text: &str,
    ) -> Result<ChatResponse, TriageError> {
        if text.trim().is_empty() {
            return Err(TriageError::InvalidInput("message text is empty".to_string()));
        }

        let conversation = match conversation_id {
            Some(raw) => {
                let id = ConversationId(raw.to_string());
                self.store
                    .get_conversation(&id)
                    .await?
                    .ok_or_else(|| TriageError::ConversationNotFound(raw.to_string()))?
            }
            None => self.store.create_conversation(None).await?,
        };
        let id = conversation.id.clone();

        let lock = self.lock_for(&id).await;
        let result = {
            let _guard = lock.lock().await;
            self.exchange(&id, text).await
        };
        self.release_lock(&id, lock).await;
        let (reply, message_index) = result?;

        Ok(ChatResponse {
            conversation_id: id,
            reply,
            message_index,
        })
    }

    /// One user turn in, one assistant turn out. Caller holds the
    /// conversation lock.
    async fn exchange(
        &self,
        id: &ConversationId,
        text: &str,
    ) -> Result<(Reply, usize), TriageError> {
        self.store.append_turn(id, Turn::user(text)).await?;
        let history = self.store.turns(id).await?;
        debug!(conversation = %id, turns = history.len(), "history loaded");

        // Titled on the first exchange, whether or not generation succeeds.
        let untitled = self
            .store
            .get_conversation(id)
            .await?
            .is_some_and(|c| c.title.is_none());
        if untitled {
            let title = auto_title(&history);
            info!(conversation = %id, title = title.as_str(), "conversation titled");
            self.store.set_title(id, title).await?;
        }

        let reply = self.orchestrator.handle(history).await?;
        let message_index = self.store.append_turn(id, reply.to_turn()).await?;
        Ok((reply, message_index))
    }

    async fn lock_for(&self, id: &ConversationId) -> Arc<Mutex<()>> {
        self.locks
            .lock()
            .await
            .entry(id.clone())
            .or_default()
            .clone()
    }

    /// Drops the map entry once no other send holds or waits on it.
    async fn release_lock(&self, id: &ConversationId, lock: Arc<Mutex<()>>) {
        let mut locks = self.locks.lock().await;
        // The map and `lock` account for two references.
        if Arc::strong_count(&lock) == 2 {
            locks.remove(id);
        }
    }

    #[cfg(test)]
    async fn lock_count(&self) -> usize {
        self.locks.lock().await.len()
    }
}

/// Title derived from the first user message: its first 50 characters, with
/// `...` appended when truncated.
pub fn auto_title(turns: &[Turn]) -> String {
    let Some(first) = turns.iter().find(|t| t.role == Role::User) else {
        return DEFAULT_TITLE.to_string();
    };
    let mut chars = first.content.chars();
    let mut title: String = chars.by_ref().take(TITLE_MAX_CHARS).collect();
    if chars.next().is_some() {
        title.push_str("...");
    }
    title
}
