//! Session store port.
//!
//! Persists the durable part of a session (its conversation memory) so a
//! session can resume after the process restarts. Live turn state is never
//! stored; it is rebuilt from memory on the next message.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::foundation::SessionId;
use crate::domain::trip::ConversationMemory;

#[derive(Debug, Clone, Error)]
pub enum SessionStoreError {
    #[error("storage failure: {0}")]
    Io(String),

    #[error("serialization failure: {0}")]
    Serialization(String),
}

/// Port for durable session memory.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Loads memory for a session. `None` for a session never seen before.
    async fn load(
        &self,
        session_id: &SessionId,
    ) -> Result<Option<ConversationMemory>, SessionStoreError>;

    /// Saves memory, replacing any previous snapshot for this session.
    async fn save(
        &self,
        session_id: &SessionId,
        memory: &ConversationMemory,
    ) -> Result<(), SessionStoreError>;
}
