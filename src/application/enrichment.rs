//! Concurrent enrichment fan-out.
//!
//! The four collaborators have no ordering dependency on each other, only a
//! join barrier before generation. Each call carries its own deadline; a
//! slow or failed collaborator leaves its field absent and never stalls the
//! others. Cancellation is structural: all four futures are owned by this
//! one join, so dropping the turn drops them.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::domain::trip::{Candidate, EnrichmentData, ParsedIntent};
use crate::ports::{
    CurrencyProvider, PriceProvider, ProviderError, SafetyProvider, WeatherProvider,
};

/// Base currency the fx collaborator quotes against.
const FX_BASE_CURRENCY: &str = "USD";

/// Dispatches the enrichment collaborators and joins their partial results.
pub struct EnrichmentService {
    weather: Arc<dyn WeatherProvider>,
    price: Arc<dyn PriceProvider>,
    currency: Arc<dyn CurrencyProvider>,
    safety: Arc<dyn SafetyProvider>,
    deadline: Duration,
}

impl EnrichmentService {
    pub fn new(
        weather: Arc<dyn WeatherProvider>,
        price: Arc<dyn PriceProvider>,
        currency: Arc<dyn CurrencyProvider>,
        safety: Arc<dyn SafetyProvider>,
        deadline: Duration,
    ) -> Self {
        Self {
            weather,
            price,
            currency,
            safety,
            deadline,
        }
    }

    /// Fans out all applicable collaborators and returns whatever completed
    /// within the deadline. Never fails: absence is the degradation.
    pub async fn enrich(&self, intent: &ParsedIntent, candidates: &[Candidate]) -> EnrichmentData {
        let destination = intent.destination.as_deref();

        let weather_call = async {
            match (destination, intent.date_range) {
                (Some(destination), Some(range)) => {
                    timeout(self.deadline, self.weather.forecast(destination, range))
                        .await
                        .map_err(|_| Elapsed)
                }
                _ => {
                    debug!("weather skipped: destination or dates missing");
                    Ok(Ok(None))
                }
            }
        };

        let price_call = async {
            if candidates.is_empty() {
                debug!("price lookup skipped: no candidates");
                Ok(Ok(None))
            } else {
                timeout(self.deadline, self.price.quotes(candidates, intent.date_range))
                    .await
                    .map_err(|_| Elapsed)
            }
        };

        let currency_call = async {
            timeout(self.deadline, self.currency.rates(FX_BASE_CURRENCY))
                .await
                .map_err(|_| Elapsed)
        };

        let safety_call = async {
            match destination {
                Some(destination) => timeout(self.deadline, self.safety.info(destination))
                    .await
                    .map_err(|_| Elapsed),
                None => Ok(Ok(None)),
            }
        };

        // The join barrier: all four run concurrently, none blocks another.
        let (weather, live_price, fx_rates, safety) =
            tokio::join!(weather_call, price_call, currency_call, safety_call);

        let data = EnrichmentData {
            weather: settle("weather", weather),
            live_price: settle("live_price", live_price),
            safety: settle("safety", safety),
            fx_rates: settle("fx_rates", fx_rates),
        };
        debug!(populated = data.populated_count(), "enrichment joined");
        data
    }
}

struct Elapsed;

/// Collapses the timeout/transport/absent layers into the field value.
/// Failure of any kind is absence, logged at warn and nothing more.
fn settle<T>(field: &str, outcome: Result<Result<Option<T>, ProviderError>, Elapsed>) -> Option<T> {
    match outcome {
        Ok(Ok(value)) => value,
        Ok(Err(err)) => {
            warn!(field, error = %err, "enrichment collaborator failed; field left absent");
            None
        }
        Err(Elapsed) => {
            warn!(field, "enrichment collaborator timed out; field left absent");
            None
        }
    }
}
