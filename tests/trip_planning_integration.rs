//! End-to-end workflow tests: one user message per traversal, settling at
//! AwaitFeedback or Done, with degradation instead of failure everywhere
//! except parse and generation.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use wayfarer::adapters::generator::TemplateResponseGenerator;
use wayfarer::adapters::index::{sample_catalog, InMemorySearchIndex};
use wayfarer::adapters::parser::RuleBasedQueryParser;
use wayfarer::adapters::providers::mock::{
    MockCurrencyProvider, MockPriceProvider, MockSafetyProvider, MockWeatherProvider,
};
use wayfarer::adapters::providers::ReviewHeuristicPriceProvider;
use wayfarer::adapters::store::InMemorySessionStore;
use wayfarer::application::{
    EnrichmentService, RetrievalService, SessionManager, TurnError, TurnOrchestrator,
};
use wayfarer::config::SearchConfig;
use wayfarer::domain::foundation::{CandidateId, SessionId, StateMachine};
use wayfarer::domain::search::{IndexHit, LexicalOverlapReranker, SearchFilters};
use wayfarer::domain::trip::{ConversationState, StateView, TurnOutcome, TurnPhase, UserMessage};
use wayfarer::ports::{
    GeneratedResponse, GenerationError, IndexError, ResponseGenerator, SearchIndex, SessionStore,
};

/// Index wrapper that records every filter set it was called with.
struct RecordingIndex {
    inner: InMemorySearchIndex,
    calls: Mutex<Vec<SearchFilters>>,
}

impl RecordingIndex {
    async fn over_sample_catalog() -> Self {
        Self {
            inner: InMemorySearchIndex::with_documents(sample_catalog()).await,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<SearchFilters> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchIndex for RecordingIndex {
    async fn search(
        &self,
        query_text: &str,
        filters: &SearchFilters,
        top_k: usize,
    ) -> Result<Vec<IndexHit>, IndexError> {
        self.calls.lock().unwrap().push(filters.clone());
        self.inner.search(query_text, filters, top_k).await
    }
}

/// Generator that always asks for feedback, keeping the loop open.
struct AlwaysAskGenerator;

#[async_trait]
impl ResponseGenerator for AlwaysAskGenerator {
    async fn generate(&self, view: StateView<'_>) -> Result<GeneratedResponse, GenerationError> {
        Ok(GeneratedResponse {
            text: format!("{} stays found — want me to refine?", view.candidates.len()),
            needs_feedback: true,
        })
    }
}

/// Generator that always fails, for the turn-fatal path.
struct BrokenGenerator;

#[async_trait]
impl ResponseGenerator for BrokenGenerator {
    async fn generate(&self, _view: StateView<'_>) -> Result<GeneratedResponse, GenerationError> {
        Err(GenerationError::Failed("template engine exploded".to_string()))
    }
}

struct Harness {
    orchestrator: Arc<TurnOrchestrator>,
}

impl Harness {
    async fn standard() -> Self {
        Self::build(
            Arc::new(InMemorySearchIndex::with_documents(sample_catalog()).await),
            Arc::new(TemplateResponseGenerator::new()),
            MockWeatherProvider::new(),
            Duration::from_millis(500),
        )
    }

    fn build(
        index: Arc<dyn SearchIndex>,
        generator: Arc<dyn ResponseGenerator>,
        weather: MockWeatherProvider,
        enrichment_deadline: Duration,
    ) -> Self {
        let config = SearchConfig::default();
        let retrieval = Arc::new(RetrievalService::new(
            index,
            Arc::new(LexicalOverlapReranker::new()),
            config.clone(),
        ));
        let enrichment = Arc::new(EnrichmentService::new(
            Arc::new(weather),
            Arc::new(MockPriceProvider::new(130.0)),
            Arc::new(MockCurrencyProvider::new()),
            Arc::new(MockSafetyProvider::new()),
            enrichment_deadline,
        ));
        Self {
            orchestrator: Arc::new(TurnOrchestrator::new(
                Arc::new(RuleBasedQueryParser::new()),
                retrieval,
                enrichment,
                generator,
            )),
        }
    }
}

fn assert_path_is_legal(state: &ConversationState, resumed: bool) {
    let path = &state.execution_path;
    assert!(!path.is_empty(), "a settled turn records its traversal");
    let entry_ok = if resumed {
        TurnPhase::AwaitFeedback.can_transition_to(&path[0])
    } else {
        path[0] == TurnPhase::ParseQuery
    };
    assert!(entry_ok, "illegal entry phase {:?}", path[0]);
    for pair in path.windows(2) {
        assert!(
            pair[0].can_transition_to(&pair[1]),
            "illegal transition {:?} -> {:?}",
            pair[0],
            pair[1]
        );
    }
}

mod end_to_end {
    use super::*;

    #[tokio::test]
    async fn paris_scenario_completes_without_feedback() {
        let harness = Harness::standard().await;
        let mut state = ConversationState::new(SessionId::new());

        let report = harness
            .orchestrator
            .advance(
                &mut state,
                UserMessage::new("Paris, Dec 15-18, romantic, quiet hotel"),
            )
            .await
            .unwrap();

        // Parsed intent
        let intent = state.parsed_intent.as_ref().unwrap();
        assert_eq!(intent.destination.as_deref(), Some("Paris"));
        assert!(intent.preferences.contains("romantic"));
        assert!(intent.preferences.contains("quiet"));

        // Retrieval satisfied the threshold at full strictness
        assert!(!state.search_relaxed);
        assert!(state.relaxation_note.is_none());
        assert!(report.candidate_count >= 1);
        assert!(state.candidates.iter().all(|c| c.location == "Paris"));

        // Enrichment attached one forecast entry per stay day
        assert_eq!(state.enrichment.weather.as_ref().map(Vec::len), Some(4));

        // Generation was satisfied with the result set
        assert_eq!(report.outcome, TurnOutcome::Done);
        assert!(report.reply.unwrap().contains("Paris"));
        assert_path_is_legal(&state, false);
    }

    #[tokio::test]
    async fn small_talk_rests_at_await_feedback() {
        let harness = Harness::standard().await;
        let mut state = ConversationState::new(SessionId::new());

        let report = harness
            .orchestrator
            .advance(&mut state, UserMessage::new("hello, can you help me?"))
            .await
            .unwrap();

        assert_eq!(report.outcome, TurnOutcome::AwaitingFeedback);
        assert_eq!(report.candidate_count, 0);
        assert!(state.execution_path.contains(&TurnPhase::GenerateResponse));
        assert!(!state
            .execution_path
            .contains(&TurnPhase::RetrieveCandidates));
        assert_path_is_legal(&state, false);
    }

    #[tokio::test]
    async fn relaxed_search_reports_a_note_and_keeps_the_loop_open() {
        let harness = Harness::standard().await;
        let mut state = ConversationState::new(SessionId::new());

        // Only one Paris hotel carries the spa tag, so full strictness
        // under-returns and stage two engages.
        let report = harness
            .orchestrator
            .advance(&mut state, UserMessage::new("Paris, spa hotel for 2 people"))
            .await
            .unwrap();

        assert!(state.search_relaxed);
        let note = state.relaxation_note.as_deref().unwrap();
        assert!(note.contains("spa"));
        assert_eq!(report.outcome, TurnOutcome::AwaitingFeedback);
        assert!(report.reply.unwrap().contains(note));
        assert_path_is_legal(&state, false);
    }
}

mod degradation {
    use super::*;

    #[tokio::test]
    async fn weather_timeout_leaves_other_enrichment_intact() {
        let harness = Harness::build(
            Arc::new(InMemorySearchIndex::with_documents(sample_catalog()).await),
            Arc::new(TemplateResponseGenerator::new()),
            MockWeatherProvider::new().with_delay(Duration::from_millis(300)),
            Duration::from_millis(30),
        );
        let mut state = ConversationState::new(SessionId::new());

        let report = harness
            .orchestrator
            .advance(
                &mut state,
                UserMessage::new("Paris, Dec 15-18, romantic, quiet hotel"),
            )
            .await
            .unwrap();

        // Weather missed its deadline; price still made it
        assert!(state.enrichment.weather.is_none());
        assert!(state.enrichment.live_price.is_some());

        // The turn still generated and settled normally
        assert!(state.execution_path.contains(&TurnPhase::GenerateResponse));
        assert!(state.error_note.is_none());
        assert_eq!(report.outcome, TurnOutcome::Done);
    }

    #[tokio::test]
    async fn unknown_destination_degrades_to_empty_results() {
        let harness = Harness::standard().await;
        let mut state = ConversationState::new(SessionId::new());

        let report = harness
            .orchestrator
            .advance(&mut state, UserMessage::new("Atlantis, Dec 15-18, quiet hotel"))
            .await
            .unwrap();

        assert_eq!(report.candidate_count, 0);
        assert!(state.search_relaxed);
        // Empty results ask the user to adjust rather than erroring
        assert_eq!(report.outcome, TurnOutcome::AwaitingFeedback);
    }
}

mod turn_fatal {
    use super::*;

    #[tokio::test]
    async fn unstructurable_query_is_a_parse_failure_with_memory_untouched() {
        let harness = Harness::standard().await;
        let mut state = ConversationState::new(SessionId::new());

        let result = harness
            .orchestrator
            .advance(&mut state, UserMessage::new("?!?..."))
            .await;

        assert!(matches!(result, Err(TurnError::ParseFailure(_))));
        assert_eq!(state.turn_outcome, TurnOutcome::Done);
        assert!(state.error_note.is_some());
        assert!(state.conversation_memory.search_history.is_empty());
        assert!(state.conversation_memory.learned_preferences.is_empty());
    }

    #[tokio::test]
    async fn generation_failure_rolls_back_to_pre_generation_memory() {
        let harness = Harness::build(
            Arc::new(InMemorySearchIndex::with_documents(sample_catalog()).await),
            Arc::new(BrokenGenerator),
            MockWeatherProvider::new(),
            Duration::from_millis(500),
        );
        let mut state = ConversationState::new(SessionId::new());

        let result = harness
            .orchestrator
            .advance(
                &mut state,
                UserMessage::new("Paris, Dec 15-18, quiet hotel"),
            )
            .await;

        assert!(matches!(result, Err(TurnError::GenerationFailure(_))));
        assert_eq!(state.turn_outcome, TurnOutcome::Done);
        // Pre-generation snapshot: the search itself is remembered, but no
        // assistant reply was committed.
        assert_eq!(state.conversation_memory.search_history.len(), 1);
        assert!(state.last_reply.is_none());
    }
}

mod feedback_loop {
    use super::*;

    #[tokio::test]
    async fn retry_search_merges_max_price_into_the_next_filters() {
        let index = Arc::new(RecordingIndex::over_sample_catalog().await);
        let harness = Harness::build(
            index.clone(),
            Arc::new(AlwaysAskGenerator),
            MockWeatherProvider::new(),
            Duration::from_millis(500),
        );
        let mut state = ConversationState::new(SessionId::new());

        harness
            .orchestrator
            .advance(
                &mut state,
                UserMessage::new("Paris, Dec 15-18, quiet hotel"),
            )
            .await
            .unwrap();
        assert_eq!(state.turn_outcome, TurnOutcome::AwaitingFeedback);
        let shown: Vec<String> = state
            .candidates
            .iter()
            .map(|c| c.id.to_string())
            .collect();
        assert!(!shown.is_empty());
        let calls_before = index.calls().len();

        harness
            .orchestrator
            .advance(
                &mut state,
                UserMessage::new("show me different hotels under $100"),
            )
            .await
            .unwrap();

        let calls = index.calls();
        assert!(calls.len() > calls_before);
        let retry_filters = &calls[calls_before];
        // The price cap merged with the otherwise-unchanged filters
        assert_eq!(retry_filters.max_price, Some(100.0));
        assert_eq!(retry_filters.destination.as_deref(), Some("Paris"));
        // What was shown before is now excluded
        for id in &shown {
            assert!(retry_filters
                .exclude_ids
                .contains(&CandidateId::from(id.as_str())));
        }
        assert_eq!(
            state.conversation_memory.max_price(),
            Some(100.0),
            "delta persisted into learned preferences"
        );
        assert_path_is_legal(&state, true);
    }

    #[tokio::test]
    async fn reparse_updates_destination_but_keeps_dates() {
        let harness = Harness::build(
            Arc::new(InMemorySearchIndex::with_documents(sample_catalog()).await),
            Arc::new(AlwaysAskGenerator),
            MockWeatherProvider::new(),
            Duration::from_millis(500),
        );
        let mut state = ConversationState::new(SessionId::new());

        harness
            .orchestrator
            .advance(
                &mut state,
                UserMessage::new("Paris, Dec 15-18, quiet hotel"),
            )
            .await
            .unwrap();
        let original_range = state.parsed_intent.as_ref().unwrap().date_range.unwrap();

        harness
            .orchestrator
            .advance(&mut state, UserMessage::new("what about Rome"))
            .await
            .unwrap();

        let intent = state.parsed_intent.as_ref().unwrap();
        assert_eq!(intent.destination.as_deref(), Some("Rome"));
        // Partial update: the unspecified dates survived
        assert_eq!(intent.date_range, Some(original_range));
        assert!(state.candidates.iter().all(|c| c.location == "Rome"));
        assert_path_is_legal(&state, true);
    }

    #[tokio::test]
    async fn terminate_closes_the_session() {
        let harness = Harness::build(
            Arc::new(InMemorySearchIndex::with_documents(sample_catalog()).await),
            Arc::new(AlwaysAskGenerator),
            MockWeatherProvider::new(),
            Duration::from_millis(500),
        );
        let mut state = ConversationState::new(SessionId::new());

        harness
            .orchestrator
            .advance(
                &mut state,
                UserMessage::new("Paris, Dec 15-18, quiet hotel"),
            )
            .await
            .unwrap();

        let report = harness
            .orchestrator
            .advance(&mut state, UserMessage::new("that's all, goodbye"))
            .await
            .unwrap();

        assert_eq!(report.outcome, TurnOutcome::Done);
        assert_eq!(state.phase(), TurnPhase::Done);
    }

    #[tokio::test]
    async fn search_history_is_append_only_across_turns() {
        let harness = Harness::build(
            Arc::new(InMemorySearchIndex::with_documents(sample_catalog()).await),
            Arc::new(AlwaysAskGenerator),
            MockWeatherProvider::new(),
            Duration::from_millis(500),
        );
        let mut state = ConversationState::new(SessionId::new());

        harness
            .orchestrator
            .advance(
                &mut state,
                UserMessage::new("Paris, Dec 15-18, quiet hotel"),
            )
            .await
            .unwrap();
        harness
            .orchestrator
            .advance(&mut state, UserMessage::new("something cheaper please"))
            .await
            .unwrap();

        let history = &state.conversation_memory.search_history;
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].destination.as_deref(), Some("Paris"));
        assert_eq!(history[1].destination.as_deref(), Some("Paris"));
    }
}

mod sessions {
    use super::*;

    #[tokio::test]
    async fn session_manager_persists_memory_after_each_turn() {
        let harness = Harness::build(
            Arc::new(InMemorySearchIndex::with_documents(sample_catalog()).await),
            Arc::new(AlwaysAskGenerator),
            MockWeatherProvider::new(),
            Duration::from_millis(500),
        );
        let store = Arc::new(InMemorySessionStore::new());
        let manager = SessionManager::new(harness.orchestrator.clone(), store.clone());

        let reply = manager
            .handle_message(None, "Paris, Dec 15-18, quiet hotel")
            .await
            .unwrap();
        assert_eq!(reply.report.outcome, TurnOutcome::AwaitingFeedback);

        let memory = store.load(&reply.session_id).await.unwrap().unwrap();
        assert_eq!(memory.search_history.len(), 1);

        // The same session id continues the conversation
        let second = manager
            .handle_message(Some(reply.session_id), "cheaper please")
            .await
            .unwrap();
        assert_eq!(second.session_id, reply.session_id);

        let memory = store.load(&reply.session_id).await.unwrap().unwrap();
        assert!(memory.learned_preferences.contains_key("budget"));
    }

    #[tokio::test]
    async fn completed_sessions_are_released() {
        let harness = Harness::standard().await;
        let store = Arc::new(InMemorySessionStore::new());
        let manager = SessionManager::new(harness.orchestrator.clone(), store.clone());

        // The standard harness generator completes on a good result set
        let reply = manager
            .handle_message(None, "Paris, Dec 15-18, romantic, quiet hotel")
            .await
            .unwrap();
        assert_eq!(reply.report.outcome, TurnOutcome::Done);
        assert_eq!(manager.live_sessions().await, 0);
        // Memory survives for the next conversation
        assert!(store.load(&reply.session_id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn price_heuristic_quotes_reach_the_reply() {
        // Swap the mock price provider for the review heuristic to cover
        // the stub provider end to end.
        let config = SearchConfig::default();
        let retrieval = Arc::new(RetrievalService::new(
            Arc::new(InMemorySearchIndex::with_documents(sample_catalog()).await),
            Arc::new(LexicalOverlapReranker::new()),
            config.clone(),
        ));
        let enrichment = Arc::new(EnrichmentService::new(
            Arc::new(MockWeatherProvider::new()),
            Arc::new(ReviewHeuristicPriceProvider::new()),
            Arc::new(MockCurrencyProvider::new()),
            Arc::new(MockSafetyProvider::new()),
            Duration::from_millis(500),
        ));
        let orchestrator = TurnOrchestrator::new(
            Arc::new(RuleBasedQueryParser::new()),
            retrieval,
            enrichment,
            Arc::new(TemplateResponseGenerator::new()),
        );

        let mut state = ConversationState::new(SessionId::new());
        let report = orchestrator
            .advance(
                &mut state,
                UserMessage::new("Paris, Dec 15-18, romantic, quiet hotel"),
            )
            .await
            .unwrap();

        let quotes = state.enrichment.live_price.as_ref().unwrap();
        assert!(!quotes.is_empty());
        assert!(report.reply.unwrap().contains("per night"));
    }
}
