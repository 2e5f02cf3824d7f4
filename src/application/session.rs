//! Session management.
//!
//! One live `ConversationState` per session, exclusively owned by the task
//! processing that session's current turn. Concurrent turns for the same
//! session serialize on a per-session mutex, since interleaved mutation of
//! conversation memory would corrupt history ordering. Durable memory goes
//! through the `SessionStore` port after every settled turn.

use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::domain::foundation::SessionId;
use crate::domain::trip::{ConversationState, TurnOutcome, UserMessage};
use crate::ports::SessionStore;

use super::orchestrator::{TurnError, TurnOrchestrator, TurnReport};

#[derive(Debug, Clone, Error)]
pub enum SessionError {
    #[error(transparent)]
    Turn(#[from] TurnError),
}

/// A settled turn plus the session it belongs to.
#[derive(Debug, Clone)]
pub struct SessionReply {
    pub session_id: SessionId,
    pub report: TurnReport,
}

/// Owns the live states and serializes turns per session.
pub struct SessionManager {
    orchestrator: Arc<TurnOrchestrator>,
    store: Arc<dyn SessionStore>,
    live: Mutex<HashMap<SessionId, Arc<Mutex<ConversationState>>>>,
}

impl SessionManager {
    pub fn new(orchestrator: Arc<TurnOrchestrator>, store: Arc<dyn SessionStore>) -> Self {
        Self {
            orchestrator,
            store,
            live: Mutex::new(HashMap::new()),
        }
    }

    /// Handles one user message for a session, creating the session on its
    /// first message and resuming persisted memory when available.
    pub async fn handle_message(
        &self,
        session_id: Option<SessionId>,
        text: &str,
    ) -> Result<SessionReply, SessionError> {
        let session_id = session_id.unwrap_or_else(SessionId::new);
        let handle = self.session_handle(session_id).await;

        // Single-flight per session: a second concurrent message for the
        // same session waits here until this turn settles.
        let mut state = handle.lock().await;

        let result = self
            .orchestrator
            .advance(&mut state, UserMessage::new(text))
            .await;

        // Memory is valid on every exit path: untouched on parse failure,
        // pre-generation snapshot on generation failure. Persist it, and
        // treat a store hiccup as a degradation rather than a turn failure.
        if let Err(err) = self
            .store
            .save(&session_id, &state.conversation_memory)
            .await
        {
            warn!(session = %session_id, error = %err, "failed to persist session memory");
        }

        let report = result?;
        if report.outcome == TurnOutcome::Done {
            drop(state);
            self.live.lock().await.remove(&session_id);
            debug!(session = %session_id, "session completed and released");
        }

        Ok(SessionReply { session_id, report })
    }

    /// Number of live (unfinished) sessions, for health reporting.
    pub async fn live_sessions(&self) -> usize {
        self.live.lock().await.len()
    }

    async fn session_handle(&self, session_id: SessionId) -> Arc<Mutex<ConversationState>> {
        let mut live = self.live.lock().await;
        if let Some(handle) = live.get(&session_id) {
            return handle.clone();
        }

        // First message for this session in this process: resume persisted
        // memory if the store has any. The map lock is held across the load
        // so two racing first messages cannot double-create the session.
        let memory = match self.store.load(&session_id).await {
            Ok(Some(memory)) => {
                debug!(session = %session_id, "resuming persisted memory");
                memory
            }
            Ok(None) => Default::default(),
            Err(err) => {
                warn!(session = %session_id, error = %err, "memory load failed; starting fresh");
                Default::default()
            }
        };

        let handle = Arc::new(Mutex::new(ConversationState::with_memory(
            session_id, memory,
        )));
        live.insert(session_id, handle.clone());
        handle
    }
}
