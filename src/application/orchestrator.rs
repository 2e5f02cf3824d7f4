//! Turn orchestration.
//!
//! Drives one user message through the workflow: parse, route, retrieve with
//! fallback, enrich concurrently, generate, and settle at `AwaitFeedback` or
//! `Done`. Per-step failures degrade into state fields; only parse and
//! generation failures escape to the caller. Conversation memory is written
//! before retrieval (feedback deltas, history append) and after successful
//! generation (never by the generation step itself), so a failed generation
//! leaves memory at its pre-generation snapshot.

use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::domain::foundation::{CandidateId, ErrorCode};
use crate::domain::search::adaptive_alpha;
use crate::domain::trip::{
    ConversationState, IntentDelta, ParsedIntent, TurnOutcome, TurnPhase, UserMessage,
};
use crate::ports::{GenerationError, ParseError, QueryParser, ResponseGenerator};

use super::enrichment::EnrichmentService;
use super::feedback::{FeedbackAction, FeedbackRouter};
use super::retrieval::RetrievalService;

/// The only errors that escape a turn. Everything else degrades into notes
/// and absent fields.
#[derive(Debug, Clone, Error)]
pub enum TurnError {
    #[error(transparent)]
    ParseFailure(#[from] ParseError),

    #[error(transparent)]
    GenerationFailure(#[from] GenerationError),
}

impl TurnError {
    pub fn code(&self) -> ErrorCode {
        match self {
            TurnError::ParseFailure(_) => ErrorCode::ParseFailure,
            TurnError::GenerationFailure(_) => ErrorCode::GenerationFailure,
        }
    }
}

/// Caller-facing summary of a settled turn.
#[derive(Debug, Clone)]
pub struct TurnReport {
    pub reply: Option<String>,
    pub outcome: TurnOutcome,
    pub search_relaxed: bool,
    pub relaxation_note: Option<String>,
    pub candidate_count: usize,
}

/// Sequences the workflow steps over the shared conversation state.
pub struct TurnOrchestrator {
    parser: Arc<dyn QueryParser>,
    retrieval: Arc<RetrievalService>,
    enrichment: Arc<EnrichmentService>,
    generator: Arc<dyn ResponseGenerator>,
    feedback: FeedbackRouter,
}

impl TurnOrchestrator {
    pub fn new(
        parser: Arc<dyn QueryParser>,
        retrieval: Arc<RetrievalService>,
        enrichment: Arc<EnrichmentService>,
        generator: Arc<dyn ResponseGenerator>,
    ) -> Self {
        Self {
            parser,
            retrieval,
            enrichment,
            generator,
            feedback: FeedbackRouter::new(),
        }
    }

    /// Processes exactly one user message: a full traversal that always
    /// stops at `AwaitFeedback` or `Done` before returning.
    ///
    /// # Errors
    ///
    /// - `ParseFailure` when the query cannot be structured at all; the
    ///   state settles in `Done` with an error note, memory untouched.
    /// - `GenerationFailure` when the response step throws; memory stays at
    ///   its pre-generation snapshot.
    #[instrument(skip_all, fields(session = %state.session_id()))]
    pub async fn advance(
        &self,
        state: &mut ConversationState,
        input: UserMessage,
    ) -> Result<TurnReport, TurnError> {
        let resuming = state.phase() == TurnPhase::AwaitFeedback;
        state.begin_turn(input.text());

        let mut direct_chat = false;
        let mut reparse_merge = false;

        let mut phase = if resuming {
            match self.feedback.classify(input.text()) {
                FeedbackAction::Terminate => {
                    info!("feedback: session ended by user");
                    TurnPhase::Done
                }
                FeedbackAction::ContinueChat => {
                    info!("feedback: plain chat, no new search");
                    direct_chat = true;
                    TurnPhase::GenerateResponse
                }
                FeedbackAction::RetrySearch { deltas } => {
                    info!("feedback: retry search with refined preferences");
                    let shown: Vec<CandidateId> =
                        state.candidates.iter().map(|c| c.id.clone()).collect();
                    state.conversation_memory.reject(shown);
                    state.conversation_memory.absorb(&deltas);
                    TurnPhase::RetrieveCandidates
                }
                FeedbackAction::Reparse { deltas } => {
                    info!("feedback: re-parse requested");
                    if let Some(intent) = state.parsed_intent.as_mut() {
                        intent.apply_delta(&deltas);
                    }
                    reparse_merge = true;
                    TurnPhase::ParseQuery
                }
            }
        } else {
            TurnPhase::ParseQuery
        };

        loop {
            match phase {
                TurnPhase::AwaitFeedback | TurnPhase::Done => {
                    state.settle(phase);
                    return Ok(report(state));
                }
                working => {
                    state.enter_phase(working);
                    phase = self.run_phase(working, state, &mut direct_chat, reparse_merge).await?;
                }
            }
        }
    }

    async fn run_phase(
        &self,
        phase: TurnPhase,
        state: &mut ConversationState,
        direct_chat: &mut bool,
        reparse_merge: bool,
    ) -> Result<TurnPhase, TurnError> {
        match phase {
            TurnPhase::ParseQuery => self.parse_query(state, reparse_merge).await,
            TurnPhase::Route => Ok(route(state, direct_chat)),
            TurnPhase::RetrieveCandidates => Ok(self.retrieve(state, direct_chat).await),
            TurnPhase::EnrichParallel => Ok(self.enrich(state).await),
            TurnPhase::GenerateResponse => self.generate(state, *direct_chat).await,
            // Resting phases are handled by the advance loop.
            TurnPhase::AwaitFeedback | TurnPhase::Done => Ok(phase),
        }
    }

    async fn parse_query(
        &self,
        state: &mut ConversationState,
        reparse_merge: bool,
    ) -> Result<TurnPhase, TurnError> {
        let today = Utc::now().date_naive();
        match self.parser.parse(state.raw_query(), today).await {
            Ok(parsed) => {
                info!(destination = ?parsed.destination, "query parsed");
                match (reparse_merge, state.parsed_intent.as_mut()) {
                    // Re-parse is a partial update: what the new message
                    // specified replaces, everything else is retained.
                    (true, Some(prior)) => prior.apply_delta(&delta_from(parsed)),
                    _ => state.parsed_intent = Some(parsed),
                }
                Ok(TurnPhase::Route)
            }
            Err(err) => {
                warn!(error = %err, "query parse failed; turn is fatal");
                state.error_note = Some(err.to_string());
                state.settle(TurnPhase::Done);
                Err(TurnError::ParseFailure(err))
            }
        }
    }

    async fn retrieve(&self, state: &mut ConversationState, direct_chat: &mut bool) -> TurnPhase {
        let Some(intent) = state.parsed_intent.clone() else {
            // A refine request arrived before any search ever ran; fall
            // through the (empty) enrichment join into a chat reply.
            *direct_chat = true;
            return TurnPhase::EnrichParallel;
        };

        let query_text =
            RetrievalService::build_query_text(&intent, &state.conversation_memory);
        let filters = self
            .retrieval
            .build_filters(&intent, &state.conversation_memory);
        let alpha = adaptive_alpha(&intent.preference_text());
        info!(%query_text, alpha, "retrieving candidates");

        let outcome = self
            .retrieval
            .search_with_fallback(&query_text, &filters, alpha)
            .await;
        state.candidates = outcome.candidates;
        state.search_relaxed = outcome.relaxed;
        state.relaxation_note = outcome.note;
        state.conversation_memory.record_search(&intent);

        TurnPhase::EnrichParallel
    }

    async fn enrich(&self, state: &mut ConversationState) -> TurnPhase {
        let Some(intent) = state.parsed_intent.clone() else {
            return TurnPhase::GenerateResponse;
        };
        state.enrichment = self.enrichment.enrich(&intent, &state.candidates).await;
        TurnPhase::GenerateResponse
    }

    async fn generate(
        &self,
        state: &mut ConversationState,
        direct_chat: bool,
    ) -> Result<TurnPhase, TurnError> {
        match self.generator.generate(state.view()).await {
            Ok(response) => {
                state.record_reply(&response.text);
                // A direct-chat turn always waits for the next message.
                if direct_chat || response.needs_feedback {
                    Ok(TurnPhase::AwaitFeedback)
                } else {
                    Ok(TurnPhase::Done)
                }
            }
            Err(err) => {
                warn!(error = %err, "response generation failed; turn is fatal");
                state.error_note = Some(err.to_string());
                state.settle(TurnPhase::Done);
                Err(TurnError::GenerationFailure(err))
            }
        }
    }
}

/// Routing after parse: a destination sends the turn into retrieval,
/// anything else is handled as direct chat.
fn route(state: &ConversationState, direct_chat: &mut bool) -> TurnPhase {
    let has_destination = state
        .parsed_intent
        .as_ref()
        .map_or(false, ParsedIntent::has_destination);
    if has_destination {
        TurnPhase::RetrieveCandidates
    } else {
        info!("no destination parsed; handling as direct chat");
        *direct_chat = true;
        TurnPhase::GenerateResponse
    }
}

/// The freshly parsed fields, viewed as a partial update.
fn delta_from(parsed: ParsedIntent) -> IntentDelta {
    IntentDelta {
        destination: parsed.destination,
        date_range: parsed.date_range,
        party_size: parsed.party_size,
        budget: parsed.budget,
        add_preferences: parsed.preferences,
        max_price: None,
        preference_weights: Default::default(),
    }
}

fn report(state: &ConversationState) -> TurnReport {
    TurnReport {
        reply: state.last_reply.clone(),
        outcome: state.turn_outcome,
        search_relaxed: state.search_relaxed,
        relaxation_note: state.relaxation_note.clone(),
        candidate_count: state.candidates.len(),
    }
}
