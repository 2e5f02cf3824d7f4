//! File-based session store.
//!
//! One YAML file per session under a base directory. Human-readable on
//! disk, which makes debugging a session's learned preferences trivial.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::domain::foundation::SessionId;
use crate::domain::trip::ConversationMemory;
use crate::ports::{SessionStore, SessionStoreError};

/// File-backed `SessionStore` implementation.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    base_path: PathBuf,
}

impl FileSessionStore {
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    fn memory_file_path(&self, session_id: &SessionId) -> PathBuf {
        self.base_path.join(format!("{session_id}.yaml"))
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load(
        &self,
        session_id: &SessionId,
    ) -> Result<Option<ConversationMemory>, SessionStoreError> {
        let path = self.memory_file_path(session_id);
        let raw = match fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(SessionStoreError::Io(err.to_string())),
        };
        let memory = serde_yaml::from_str(&raw)
            .map_err(|e| SessionStoreError::Serialization(e.to_string()))?;
        Ok(Some(memory))
    }

    async fn save(
        &self,
        session_id: &SessionId,
        memory: &ConversationMemory,
    ) -> Result<(), SessionStoreError> {
        fs::create_dir_all(&self.base_path)
            .await
            .map_err(|e| SessionStoreError::Io(e.to_string()))?;

        let yaml = serde_yaml::to_string(memory)
            .map_err(|e| SessionStoreError::Serialization(e.to_string()))?;

        fs::write(self.memory_file_path(session_id), yaml)
            .await
            .map_err(|e| SessionStoreError::Io(e.to_string()))
    }
}
