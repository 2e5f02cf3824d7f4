//! Template response generator.
//!
//! Renders the state view into the reply text: trip overview, top stays,
//! weather, practical information and any graceful-degradation note. The
//! relaxation note is woven into the prose, never shown as an error code.
//! An LLM-backed generator can implement the same port; the information
//! contract is what matters, not the wording.

use async_trait::async_trait;
use std::fmt::Write as _;

use crate::domain::trip::StateView;
use crate::ports::{GeneratedResponse, GenerationError, ResponseGenerator};

/// How many candidates the reply presents in detail.
const TOP_PICKS: usize = 3;

/// Deterministic, template-driven generator.
#[derive(Debug, Clone, Default)]
pub struct TemplateResponseGenerator;

impl TemplateResponseGenerator {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ResponseGenerator for TemplateResponseGenerator {
    async fn generate(&self, view: StateView<'_>) -> Result<GeneratedResponse, GenerationError> {
        let Some(intent) = view.parsed_intent.filter(|i| i.has_destination()) else {
            return Ok(GeneratedResponse {
                text: "I can help you plan a trip. Tell me where you'd like to go, \
                       when, and what kind of stay you're after."
                    .to_string(),
                needs_feedback: true,
            });
        };

        let destination = intent.destination.as_deref().unwrap_or_default();
        let mut text = String::new();

        match intent.date_range {
            Some(range) => {
                let _ = writeln!(
                    text,
                    "Here is your {destination} plan for {} to {} ({} nights):",
                    range.start, range.end, range.nights()
                );
            }
            None => {
                let _ = writeln!(text, "Here is your {destination} plan:");
            }
        }

        if let Some(note) = view.relaxation_note {
            let _ = writeln!(text, "\n{note}");
        }

        if view.candidates.is_empty() {
            let _ = writeln!(
                text,
                "\nI couldn't find any stays matching your request. \
                 Would you like to adjust the dates, budget or preferences?"
            );
        } else {
            let _ = writeln!(text, "\nTop stays:");
            for candidate in view.candidates.iter().take(TOP_PICKS) {
                let _ = write!(
                    text,
                    "{}. {} — {:.1}/5",
                    candidate.rank, candidate.name, candidate.rating
                );
                if let Some(quote) = view
                    .enrichment
                    .live_price
                    .as_ref()
                    .and_then(|quotes| quotes.get(&candidate.id))
                {
                    let _ = write!(
                        text,
                        ", about {:.0} {} per night",
                        quote.nightly_rate, quote.currency
                    );
                }
                if let Some(highlights) = candidate
                    .decoration("highlights")
                    .and_then(|v| v.as_array())
                {
                    let rendered: Vec<&str> =
                        highlights.iter().filter_map(|h| h.as_str()).collect();
                    if !rendered.is_empty() {
                        let _ = write!(text, " ({})", rendered.join(", "));
                    }
                }
                let _ = writeln!(text);
            }
        }

        if let Some(forecast) = &view.enrichment.weather {
            if !forecast.is_empty() {
                let _ = writeln!(text, "\nWeather outlook:");
                for day in forecast {
                    let _ = writeln!(
                        text,
                        "- {}: {:.0}–{:.0}°C, {}",
                        day.date, day.temp_min_c, day.temp_max_c, day.description
                    );
                }
            }
        }

        if let Some(safety) = &view.enrichment.safety {
            let _ = writeln!(
                text,
                "\nGood to know: local currency is {}; emergency numbers: {}.",
                safety.currency,
                safety
                    .emergency_numbers
                    .iter()
                    .map(|(service, number)| format!("{service} {number}"))
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }

        if let Some(rates) = &view.enrichment.fx_rates {
            if let Some(eur) = rates.get("EUR") {
                let _ = writeln!(text, "Exchange rate: 1 USD ≈ {eur:.2} EUR.");
            }
        }

        let needs_feedback = view.search_relaxed || view.candidates.is_empty();
        if needs_feedback && !view.candidates.is_empty() {
            let _ = writeln!(
                text,
                "\nTell me if you'd like me to refine any of this — tighter budget, \
                 different area, other dates."
            );
        }

        Ok(GeneratedResponse {
            text,
            needs_feedback,
        })
    }
}
