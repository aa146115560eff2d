//! SQLite-backed conversation store.
//!
//! One row per conversation, the full record as a JSON column. `INSERT OR
//! REPLACE` runs as a single statement, so an overwrite is all-or-nothing;
//! a failed save leaves the previous row intact.

use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::ConversationStore;
use crate::agent::Conversation;
use crate::error::StoreError;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the store at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|e| StoreError(e.to_string()))?;
        Self::init(conn)
    }

    /// In-memory database, for tests.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(|e| StoreError(e.to_string()))?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS conversations (
                id   TEXT PRIMARY KEY,
                data TEXT NOT NULL
            )",
            [],
        )
        .map_err(|e| StoreError(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

#[async_trait]
impl ConversationStore for SqliteStore {
    fn is_persistent(&self) -> bool {
        true
    }

    async fn load_or_create(&self, id: Uuid) -> Result<Conversation, StoreError> {
        let conn = self.conn.lock().map_err(|e| StoreError(e.to_string()))?;
        let row: Option<String> = conn
            .query_row(
                "SELECT data FROM conversations WHERE id = ?1",
                params![id.to_string()],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| StoreError(e.to_string()))?;

        match row {
            Some(data) => serde_json::from_str(&data).map_err(|e| StoreError(e.to_string())),
            None => Ok(Conversation::new(id)),
        }
    }

    async fn save(&self, conversation: &Conversation) -> Result<(), StoreError> {
        let data = serde_json::to_string(conversation).map_err(|e| StoreError(e.to_string()))?;
        let conn = self.conn.lock().map_err(|e| StoreError(e.to_string()))?;
        conn.execute(
            "INSERT OR REPLACE INTO conversations (id, data) VALUES (?1, ?2)",
            params![conversation.id.to_string(), data],
        )
        .map_err(|e| StoreError(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{ChatMessage, ToolCall, ToolCallFunction};

    fn pending_call() -> ToolCall {
        ToolCall {
            id: "call_1".to_string(),
            call_type: "function".to_string(),
            function: ToolCallFunction {
                name: "search_companies_db".to_string(),
                arguments: r#"{"query":"Apple"}"#.to_string(),
            },
        }
    }

    #[tokio::test]
    async fn round_trip_preserves_messages_and_pending_state() {
        let store = SqliteStore::open_in_memory().unwrap();
        let id = Uuid::new_v4();

        let mut conversation = store.load_or_create(id).await.unwrap();
        conversation.push(ChatMessage::user("Show me Apple"));
        conversation.set_pending(vec![pending_call()]);
        store.save(&conversation).await.unwrap();

        let loaded = store.load_or_create(id).await.unwrap();
        assert_eq!(loaded.messages, conversation.messages);
        assert!(loaded.awaiting_approval());
        assert_eq!(loaded.pending_calls(), conversation.pending_calls());
    }

    #[tokio::test]
    async fn reopening_a_file_store_keeps_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conversations.db");
        let id = Uuid::new_v4();

        {
            let store = SqliteStore::open(&path).unwrap();
            let mut conversation = store.load_or_create(id).await.unwrap();
            conversation.push(ChatMessage::user("persist me"));
            store.save(&conversation).await.unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        assert!(store.is_persistent());
        let loaded = store.load_or_create(id).await.unwrap();
        assert_eq!(loaded.messages.len(), 1);
        assert_eq!(loaded.messages[0].content.as_deref(), Some("persist me"));
    }

    #[tokio::test]
    async fn save_overwrites_atomically() {
        let store = SqliteStore::open_in_memory().unwrap();
        let id = Uuid::new_v4();

        let mut conversation = store.load_or_create(id).await.unwrap();
        conversation.push(ChatMessage::user("v1"));
        store.save(&conversation).await.unwrap();

        conversation.push(ChatMessage::user("v2"));
        store.save(&conversation).await.unwrap();

        let loaded = store.load_or_create(id).await.unwrap();
        assert_eq!(loaded.messages.len(), 2);
    }
}
