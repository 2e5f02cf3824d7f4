//! Trip-planning domain: conversation state, intents, candidates, memory.

mod candidate;
mod enrichment;
mod intent;
mod memory;
mod message;
mod phase;
mod state;

pub use candidate::Candidate;
pub use enrichment::{DayForecast, EnrichmentData, PriceQuote, SafetyInfo};
pub use intent::{DateRange, IntentDelta, ParsedIntent};
pub use memory::{ConversationMemory, MAX_PRICE_KEY};
pub use message::{ChatMessage, MessageRole, UserMessage};
pub use phase::{TurnOutcome, TurnPhase};
pub use state::{ConversationState, StateView};
