// SPDX-FileCopyrightText: 2026 Triage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-process conversation store.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use triage_core::traits::adapter::PluginAdapter;
use triage_core::types::{AdapterType, HealthStatus};
use triage_core::{Conversation, ConversationId, ConversationStore, TriageError, Turn};

struct StoredConversation {
    meta: Conversation,
    turns: Vec<Turn>,
}

/// [`ConversationStore`] keeping every conversation in memory.
///
/// Writes take the store-wide write lock, so appends to one conversation are
/// applied in call order.
#[derive(Default)]
pub struct InMemoryConversationStore {
    conversations: RwLock<HashMap<ConversationId, StoredConversation>>,
}

impl InMemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn not_found(id: &ConversationId) -> TriageError {
    TriageError::ConversationNotFound(id.to_string())
}

#[async_trait]
impl PluginAdapter for InMemoryConversationStore {
    fn name(&self) -> &str {
        "memory-store"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, TriageError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), TriageError> {
        Ok(())
    }
}

#[async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn create_conversation(
        &self,
        title: Option<String>,
    ) -> Result<Conversation, TriageError> {
        let now = Utc::now();
        let meta = Conversation {
            id: ConversationId(uuid::Uuid::new_v4().to_string()),
            title,
            created_at: now,
            updated_at: now,
            turn_count: 0,
        };
        self.conversations.write().await.insert(
            meta.id.clone(),
            StoredConversation {
                meta: meta.clone(),
                turns: Vec::new(),
            },
        );
        Ok(meta)
    }

    async fn get_conversation(
        &self,
        id: &ConversationId,
    ) -> Result<Option<Conversation>, TriageError> {
        Ok(self
            .conversations
            .read()
            .await
            .get(id)
            .map(|c| c.meta.clone()))
    }

    async fn list_conversations(&self) -> Result<Vec<Conversation>, TriageError> {
        let mut all: Vec<Conversation> = self
            .conversations
            .read()
            .await
            .values()
            .map(|c| c.meta.clone())
            .collect();
        all.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(all)
    }

    async fn append_turn(&self, id: &ConversationId, turn: Turn) -> Result<usize, TriageError> {
        let mut conversations = self.conversations.write().await;
        let stored = conversations.get_mut(id).ok_or_else(|| not_found(id))?;
        stored.turns.push(turn);
        stored.meta.turn_count = stored.turns.len();
        stored.meta.updated_at = Utc::now();
        Ok(stored.turns.len() - 1)
    }

    async fn turns(&self, id: &ConversationId) -> Result<Vec<Turn>, TriageError> {
        self.conversations
            .read()
            .await
            .get(id)
            .map(|c| c.turns.clone())
            .ok_or_else(|| not_found(id))
    }

    async fn set_title(&self, id: &ConversationId, title: String) -> Result<(), TriageError> {
        let mut conversations = self.conversations.write().await;
        let stored = conversations.get_mut(id).ok_or_else(|| not_found(id))?;
        stored.meta.title = Some(title);
        stored.meta.updated_at = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use triage_core::{Intent, Role};

    #[tokio::test]
    async fn append_preserves_order_and_counts() {
        let store = InMemoryConversationStore::new();
        let conv = store.create_conversation(None).await.unwrap();
        assert_eq!(conv.turn_count, 0);

        assert_eq!(store.append_turn(&conv.id, Turn::user("Hi")).await.unwrap(), 0);
        assert_eq!(
            store
                .append_turn(&conv.id, Turn::assistant("Hello", Intent::Logical))
                .await
                .unwrap(),
            1
        );

        let turns = store.turns(&conv.id).await.unwrap();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].role, Role::User);
        assert_eq!(turns[1].intent, Some(Intent::Logical));

        let meta = store.get_conversation(&conv.id).await.unwrap().unwrap();
        assert_eq!(meta.turn_count, 2);
        assert!(meta.updated_at >= meta.created_at);
    }

    #[tokio::test]
    async fn unknown_conversation_is_reported() {
        let store = InMemoryConversationStore::new();
        let id = ConversationId("missing".into());
        assert!(store.get_conversation(&id).await.unwrap().is_none());
        assert!(matches!(
            store.append_turn(&id, Turn::user("x")).await,
            Err(TriageError::ConversationNotFound(_))
        ));
        assert!(matches!(
            store.turns(&id).await,
            Err(TriageError::ConversationNotFound(_))
        ));
        assert!(store.set_title(&id, "t".into()).await.is_err());
    }

    #[tokio::test]
    async fn list_is_most_recently_updated_first() {
        let store = InMemoryConversationStore::new();
        let first = store.create_conversation(Some("first".into())).await.unwrap();
        let second = store.create_conversation(Some("second".into())).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        store.append_turn(&first.id, Turn::user("bump")).await.unwrap();

        let listed = store.list_conversations().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, first.id);
        assert_eq!(listed[1].id, second.id);
    }

    #[tokio::test]
    async fn set_title_updates_metadata() {
        let store = InMemoryConversationStore::new();
        let conv = store.create_conversation(None).await.unwrap();
        store.set_title(&conv.id, "Trip planning".into()).await.unwrap();
        let meta = store.get_conversation(&conv.id).await.unwrap().unwrap();
        assert_eq!(meta.title.as_deref(), Some("Trip planning"));
    }
}
