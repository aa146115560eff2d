//! Conversation checkpoint stores.
//!
//! The orchestrator owns a conversation only for the duration of a turn;
//! between turns (and across an approval suspension) the full record lives
//! in a [`ConversationStore`]. The in-memory store backs tests and
//! single-process deployments; the SQLite store survives restarts.

mod memory;
mod sqlite;

pub use memory::InMemoryStore;
pub use sqlite::SqliteStore;

use async_trait::async_trait;
use uuid::Uuid;

use crate::agent::Conversation;
use crate::error::StoreError;

/// Keyed persistence for conversation state.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Whether checkpoints survive a process restart.
    fn is_persistent(&self) -> bool;

    /// Load the conversation with the given id, creating a fresh one if it
    /// does not exist yet.
    async fn load_or_create(&self, id: Uuid) -> Result<Conversation, StoreError>;

    /// Persist the full record, atomically replacing any previous version.
    async fn save(&self, conversation: &Conversation) -> Result<(), StoreError>;
}
