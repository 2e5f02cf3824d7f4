//! In-memory session store.
//!
//! Keeps session memory in a process-local map. Useful for testing and
//! development; memory does not survive a restart.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::SessionId;
use crate::domain::trip::ConversationMemory;
use crate::ports::{SessionStore, SessionStoreError};

/// In-memory `SessionStore` implementation.
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionStore {
    memories: Arc<RwLock<HashMap<SessionId, ConversationMemory>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sessions (useful for tests).
    pub async fn session_count(&self) -> usize {
        self.memories.read().await.len()
    }

    /// Clear all stored data (useful for tests).
    pub async fn clear(&self) {
        self.memories.write().await.clear();
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load(
        &self,
        session_id: &SessionId,
    ) -> Result<Option<ConversationMemory>, SessionStoreError> {
        Ok(self.memories.read().await.get(session_id).cloned())
    }

    async fn save(
        &self,
        session_id: &SessionId,
        memory: &ConversationMemory,
    ) -> Result<(), SessionStoreError> {
        self.memories
            .write()
            .await
            .insert(*session_id, memory.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn load_returns_none_for_unknown_session() {
        let store = InMemorySessionStore::new();
        let loaded = store.load(&SessionId::new()).await.unwrap();
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn save_then_load_roundtrips() {
        let store = InMemorySessionStore::new();
        let id = SessionId::new();
        let mut memory = ConversationMemory::default();
        memory.bump_preference("quiet", 2.0);

        store.save(&id, &memory).await.unwrap();
        let loaded = store.load(&id).await.unwrap().unwrap();
        assert_eq!(loaded.learned_preferences.get("quiet"), Some(&2.0));
        assert_eq!(store.session_count().await, 1);
    }

    #[tokio::test]
    async fn save_replaces_prior_snapshot() {
        let store = InMemorySessionStore::new();
        let id = SessionId::new();
        let mut memory = ConversationMemory::default();
        store.save(&id, &memory).await.unwrap();

        memory.bump_preference("budget", 1.0);
        store.save(&id, &memory).await.unwrap();

        let loaded = store.load(&id).await.unwrap().unwrap();
        assert_eq!(loaded.learned_preferences.get("budget"), Some(&1.0));
        assert_eq!(store.session_count().await, 1);
    }
}
