//! Application layer: the workflow services wired over ports.

mod enrichment;
mod feedback;
mod orchestrator;
mod retrieval;
mod session;

pub use enrichment::EnrichmentService;
pub use feedback::{FeedbackAction, FeedbackRouter};
pub use orchestrator::{TurnError, TurnOrchestrator, TurnReport};
pub use retrieval::{RetrievalOutcome, RetrievalService};
pub use session::{SessionError, SessionManager, SessionReply};

#[cfg(test)]
pub(crate) mod test_support {
    //! Minimal stub wiring for unit tests that need a whole orchestrator.

    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::sync::Arc;
    use std::time::Duration;

    use crate::config::SearchConfig;
    use crate::domain::search::{IndexHit, LexicalOverlapReranker, SearchFilters};
    use crate::domain::trip::{
        Candidate, DateRange, DayForecast, ParsedIntent, SafetyInfo, StateView,
    };
    use crate::ports::{
        CurrencyProvider, GeneratedResponse, GenerationError, IndexError, ParseError,
        PriceProvider, ProviderError, QueryParser, ResponseGenerator, SafetyProvider,
        SearchIndex, WeatherProvider,
    };

    use super::{EnrichmentService, RetrievalService, TurnOrchestrator};

    pub struct StubParser;

    #[async_trait]
    impl QueryParser for StubParser {
        async fn parse(
            &self,
            raw_query: &str,
            _today: NaiveDate,
        ) -> Result<ParsedIntent, ParseError> {
            if raw_query.trim().is_empty() {
                return Err(ParseError::unstructurable("empty query"));
            }
            Ok(ParsedIntent {
                destination: Some("Paris".to_string()),
                ..Default::default()
            })
        }
    }

    pub struct StubIndex;

    #[async_trait]
    impl SearchIndex for StubIndex {
        async fn search(
            &self,
            _query_text: &str,
            _filters: &SearchFilters,
            _top_k: usize,
        ) -> Result<Vec<IndexHit>, IndexError> {
            Ok((0..3)
                .map(|i| IndexHit {
                    id: format!("h{i}").into(),
                    name: format!("Hotel {i}"),
                    location: "Paris".to_string(),
                    rating: 4.0,
                    snippet: "clean quiet rooms".to_string(),
                    tags: vec![],
                    lexical_score: 3.0 - i as f32,
                    vector_score: 0.5,
                })
                .collect())
        }
    }

    pub struct AbsentWeather;

    #[async_trait]
    impl WeatherProvider for AbsentWeather {
        async fn forecast(
            &self,
            _destination: &str,
            _range: DateRange,
        ) -> Result<Option<Vec<DayForecast>>, ProviderError> {
            Ok(None)
        }
    }

    pub struct AbsentPrice;

    #[async_trait]
    impl PriceProvider for AbsentPrice {
        async fn quotes(
            &self,
            _candidates: &[Candidate],
            _range: Option<DateRange>,
        ) -> Result<
            Option<std::collections::BTreeMap<crate::domain::foundation::CandidateId, crate::domain::trip::PriceQuote>>,
            ProviderError,
        > {
            Ok(None)
        }
    }

    pub struct AbsentCurrency;

    #[async_trait]
    impl CurrencyProvider for AbsentCurrency {
        async fn rates(
            &self,
            _base: &str,
        ) -> Result<Option<std::collections::BTreeMap<String, f64>>, ProviderError> {
            Ok(None)
        }
    }

    pub struct AbsentSafety;

    #[async_trait]
    impl SafetyProvider for AbsentSafety {
        async fn info(&self, _destination: &str) -> Result<Option<SafetyInfo>, ProviderError> {
            Ok(None)
        }
    }

    pub struct EchoGenerator;

    #[async_trait]
    impl ResponseGenerator for EchoGenerator {
        async fn generate(&self, view: StateView<'_>) -> Result<GeneratedResponse, GenerationError> {
            Ok(GeneratedResponse {
                text: format!("{} candidates", view.candidates.len()),
                needs_feedback: view.candidates.is_empty(),
            })
        }
    }

    pub fn orchestrator() -> Arc<TurnOrchestrator> {
        let config = SearchConfig::default();
        let retrieval = Arc::new(RetrievalService::new(
            Arc::new(StubIndex),
            Arc::new(LexicalOverlapReranker::new()),
            config.clone(),
        ));
        let enrichment = Arc::new(EnrichmentService::new(
            Arc::new(AbsentWeather),
            Arc::new(AbsentPrice),
            Arc::new(AbsentCurrency),
            Arc::new(AbsentSafety),
            Duration::from_millis(200),
        ));
        Arc::new(TurnOrchestrator::new(
            Arc::new(StubParser),
            retrieval,
            enrichment,
            Arc::new(EchoGenerator),
        ))
    }
}
