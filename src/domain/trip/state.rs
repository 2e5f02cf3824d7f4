//! The shared conversation state threaded through every workflow step.
//!
//! The orchestrator owns the state exclusively for the duration of one turn.
//! Each step reads what it needs and writes only the fields it owns:
//!
//! | Field | Writer |
//! |---|---|
//! | `raw_query` | set at turn start, immutable for the traversal |
//! | `parsed_intent` | query-parse (revised only via re-parse feedback) |
//! | `candidates` | retrieval writes, re-ranking reorders, enrichment decorates |
//! | `search_relaxed`, `relaxation_note` | retrieval fallback |
//! | `enrichment` | the enrichment join, one sub-field per collaborator |
//! | `conversation_memory` | feedback router and successful generations |
//! | `turn_outcome`, `phase`, `execution_path` | orchestrator |

use serde::{Deserialize, Serialize};

use crate::domain::foundation::SessionId;

use super::candidate::Candidate;
use super::enrichment::EnrichmentData;
use super::intent::ParsedIntent;
use super::memory::ConversationMemory;
use super::message::ChatMessage;
use super::phase::{TurnOutcome, TurnPhase};

/// Central state record for one session's conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationState {
    session_id: SessionId,
    /// The message that started the current turn.
    raw_query: String,
    pub parsed_intent: Option<ParsedIntent>,
    pub candidates: Vec<Candidate>,
    pub search_relaxed: bool,
    pub relaxation_note: Option<String>,
    pub enrichment: EnrichmentData,
    pub conversation_memory: ConversationMemory,
    pub chat_history: Vec<ChatMessage>,
    /// Phases visited by the current turn's traversal, in order.
    pub execution_path: Vec<TurnPhase>,
    phase: TurnPhase,
    pub turn_outcome: TurnOutcome,
    /// Text of the most recent assistant reply.
    pub last_reply: Option<String>,
    /// Set when a turn ended in `Done` because of a fatal step failure.
    pub error_note: Option<String>,
}

impl ConversationState {
    /// Fresh state for a new session.
    pub fn new(session_id: SessionId) -> Self {
        Self::with_memory(session_id, ConversationMemory::default())
    }

    /// State for a session resuming with previously persisted memory.
    pub fn with_memory(session_id: SessionId, memory: ConversationMemory) -> Self {
        Self {
            session_id,
            raw_query: String::new(),
            parsed_intent: None,
            candidates: Vec::new(),
            search_relaxed: false,
            relaxation_note: None,
            enrichment: EnrichmentData::default(),
            conversation_memory: memory,
            chat_history: Vec::new(),
            execution_path: Vec::new(),
            phase: TurnPhase::ParseQuery,
            turn_outcome: TurnOutcome::Continue,
            last_reply: None,
            error_note: None,
        }
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn raw_query(&self) -> &str {
        &self.raw_query
    }

    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    /// Resets per-turn fields and records the incoming message. Candidates
    /// survive into the new turn so a plain-chat follow-up can still refer
    /// to them; a new retrieval overwrites them.
    pub fn begin_turn(&mut self, text: &str) {
        self.raw_query = text.to_string();
        self.chat_history.push(ChatMessage::user(text));
        self.execution_path.clear();
        self.search_relaxed = false;
        self.relaxation_note = None;
        self.enrichment = EnrichmentData::default();
        self.turn_outcome = TurnOutcome::Continue;
        self.last_reply = None;
        self.error_note = None;
    }

    /// Moves to the given phase and records it on the execution path.
    ///
    /// Legality is not re-checked here; the orchestrator only takes edges
    /// from the transition table, and the integration tests verify every
    /// recorded path pairwise against `StateMachine::can_transition_to`.
    pub fn enter_phase(&mut self, phase: TurnPhase) {
        self.phase = phase;
        self.execution_path.push(phase);
    }

    /// Records the assistant reply for this turn.
    pub fn record_reply(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.chat_history.push(ChatMessage::assistant(text.clone()));
        self.last_reply = Some(text);
    }

    /// Settles the turn at a resting phase and derives the outcome.
    pub fn settle(&mut self, phase: TurnPhase) {
        self.enter_phase(phase);
        self.turn_outcome = match phase {
            TurnPhase::Done => TurnOutcome::Done,
            _ => TurnOutcome::AwaitingFeedback,
        };
    }

    /// Read-only projection handed to response generation.
    pub fn view(&self) -> StateView<'_> {
        StateView {
            raw_query: &self.raw_query,
            parsed_intent: self.parsed_intent.as_ref(),
            candidates: &self.candidates,
            search_relaxed: self.search_relaxed,
            relaxation_note: self.relaxation_note.as_deref(),
            enrichment: &self.enrichment,
            memory: &self.conversation_memory,
            chat_history: &self.chat_history,
        }
    }
}

/// Read-only projection of `ConversationState` consumed by the response
/// generator. Borrowing keeps the generator honest: it cannot mutate state.
#[derive(Debug, Clone, Copy)]
pub struct StateView<'a> {
    pub raw_query: &'a str,
    pub parsed_intent: Option<&'a ParsedIntent>,
    pub candidates: &'a [Candidate],
    pub search_relaxed: bool,
    pub relaxation_note: Option<&'a str>,
    pub enrichment: &'a EnrichmentData,
    pub memory: &'a ConversationMemory,
    pub chat_history: &'a [ChatMessage],
}
