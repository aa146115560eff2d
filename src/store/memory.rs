//! In-memory conversation store (non-persistent).

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::ConversationStore;
use crate::agent::Conversation;
use crate::error::StoreError;

#[derive(Clone, Default)]
pub struct InMemoryStore {
    conversations: Arc<RwLock<HashMap<Uuid, Conversation>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConversationStore for InMemoryStore {
    fn is_persistent(&self) -> bool {
        false
    }

    async fn load_or_create(&self, id: Uuid) -> Result<Conversation, StoreError> {
        if let Some(conversation) = self.conversations.read().await.get(&id) {
            return Ok(conversation.clone());
        }
        Ok(Conversation::new(id))
    }

    async fn save(&self, conversation: &Conversation) -> Result<(), StoreError> {
        self.conversations
            .write()
            .await
            .insert(conversation.id, conversation.clone());
        Ok(())
    }
}
