//! Turn phases and the workflow transition table.
//!
//! The workflow is a closed enum with an explicit transition table rather
//! than an open node registry, so every edge the orchestrator can take is
//! enumerable and testable.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::StateMachine;

/// One step of a turn traversal.
///
/// A traversal enters at `ParseQuery` (or re-enters from `AwaitFeedback` on a
/// follow-up message) and always settles at `AwaitFeedback` or `Done` before
/// control returns to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnPhase {
    /// Structure the raw query into a `ParsedIntent`.
    ParseQuery,
    /// Inspect the parsed intent and pick the search or direct-chat path.
    Route,
    /// Hybrid retrieval with staged relaxation.
    RetrieveCandidates,
    /// Concurrent enrichment fan-out with a join barrier.
    EnrichParallel,
    /// Compose the reply from the state view.
    GenerateResponse,
    /// Resting state: the turn ended and a follow-up may reopen the loop.
    AwaitFeedback,
    /// Terminal state for the session's current conversation.
    Done,
}

impl TurnPhase {
    /// Short label for logs and execution-path displays.
    pub fn label(&self) -> &'static str {
        match self {
            Self::ParseQuery => "parse_query",
            Self::Route => "route",
            Self::RetrieveCandidates => "retrieve_candidates",
            Self::EnrichParallel => "enrich_parallel",
            Self::GenerateResponse => "generate_response",
            Self::AwaitFeedback => "await_feedback",
            Self::Done => "done",
        }
    }
}

impl StateMachine for TurnPhase {
    fn can_transition_to(&self, target: &Self) -> bool {
        self.valid_transitions().contains(target)
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use TurnPhase::*;
        match self {
            // Done is reachable directly only on an unstructurable query.
            ParseQuery => vec![Route, Done],
            // Destination present -> retrieval; absent -> direct chat, which
            // still generates before resting at AwaitFeedback.
            Route => vec![RetrieveCandidates, GenerateResponse],
            RetrieveCandidates => vec![EnrichParallel],
            EnrichParallel => vec![GenerateResponse],
            GenerateResponse => vec![AwaitFeedback, Done],
            // Feedback reopens the loop: new search, re-parse, plain chat,
            // or session end.
            AwaitFeedback => vec![RetrieveCandidates, ParseQuery, GenerateResponse, Done],
            Done => vec![],
        }
    }
}

impl Default for TurnPhase {
    fn default() -> Self {
        Self::ParseQuery
    }
}

/// Terminal signal checked by the caller after each turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnOutcome {
    /// Mid-traversal; never observed by the caller of a settled turn.
    Continue,
    /// The turn rested at `AwaitFeedback`.
    AwaitingFeedback,
    /// The turn reached `Done`.
    Done,
}

impl Default for TurnOutcome {
    fn default() -> Self {
        Self::Continue
    }
}
