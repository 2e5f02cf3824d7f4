//! Wayfarer binary: configuration, tracing, adapter wiring, HTTP serve.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use wayfarer::adapters::generator::TemplateResponseGenerator;
use wayfarer::adapters::http::{api_routes, ChatHandlers};
use wayfarer::adapters::index::{sample_catalog, InMemorySearchIndex};
use wayfarer::adapters::parser::RuleBasedQueryParser;
use wayfarer::adapters::providers::{
    ExchangeRateProvider, OpenMeteoWeatherProvider, RestCountriesSafetyProvider,
    ReviewHeuristicPriceProvider,
};
use wayfarer::adapters::store::FileSessionStore;
use wayfarer::application::{
    EnrichmentService, RetrievalService, SessionManager, TurnOrchestrator,
};
use wayfarer::config::AppConfig;
use wayfarer::domain::search::{
    CrossSignalReranker, FailoverReranker, LexicalOverlapReranker, Reranker,
};

const SESSION_DIR: &str = "data/sessions";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.server.log_level.clone())),
        )
        .init();

    info!(environment = ?config.server.environment, "starting wayfarer");

    // Search stack: in-memory index over the bundled catalog, lexical
    // re-ranker with an optional cross-signal primary.
    let index = Arc::new(InMemorySearchIndex::with_documents(sample_catalog()).await);
    info!(documents = index.len().await, "search index ready");

    let primary_reranker: Option<Box<dyn Reranker>> = config
        .search
        .cross_signal_weights_path
        .as_deref()
        .and_then(|path| match CrossSignalReranker::load(Path::new(path)) {
            Ok(reranker) => Some(Box::new(reranker) as Box<dyn Reranker>),
            Err(err) => {
                warn!(error = %err, "cross-signal re-ranker unavailable, using lexical fallback");
                None
            }
        });
    let reranker = Arc::new(FailoverReranker::new(
        primary_reranker,
        Box::new(LexicalOverlapReranker::with_blend(config.search.rerank_blend)),
    ));

    let retrieval = Arc::new(RetrievalService::new(
        index,
        reranker,
        config.search.clone(),
    ));

    let enrichment = Arc::new(EnrichmentService::new(
        Arc::new(OpenMeteoWeatherProvider::new(
            config.providers.weather_base_url.clone(),
            config.providers.geocoding_base_url.clone(),
        )),
        Arc::new(ReviewHeuristicPriceProvider::new()),
        Arc::new(ExchangeRateProvider::new(config.providers.fx_base_url.clone())),
        Arc::new(RestCountriesSafetyProvider::new(
            config.providers.countries_base_url.clone(),
        )),
        config.providers.enrichment_timeout(),
    ));

    let orchestrator = Arc::new(TurnOrchestrator::new(
        Arc::new(RuleBasedQueryParser::new()),
        retrieval,
        enrichment,
        Arc::new(TemplateResponseGenerator::new()),
    ));

    let sessions = Arc::new(SessionManager::new(
        orchestrator,
        Arc::new(FileSessionStore::new(SESSION_DIR)),
    ));

    let app = api_routes(ChatHandlers { sessions })
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(CorsLayer::permissive());

    let addr = config.server.socket_addr()?;
    info!(%addr, "listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
