//! Query parser port.

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::trip::ParsedIntent;

/// The raw query could not be structured at all. This is one of the two
/// turn-fatal errors: the caller receives it as a clarification request.
#[derive(Debug, Clone, Error)]
pub enum ParseError {
    #[error("query could not be structured: {reason}")]
    Unstructurable { reason: String },
}

impl ParseError {
    pub fn unstructurable(reason: impl Into<String>) -> Self {
        Self::Unstructurable {
            reason: reason.into(),
        }
    }
}

/// Port for structuring a free-form travel query.
///
/// `today` anchors relative date expressions ("next week") so parsing stays
/// deterministic and testable.
#[async_trait]
pub trait QueryParser: Send + Sync {
    async fn parse(&self, raw_query: &str, today: NaiveDate) -> Result<ParsedIntent, ParseError>;
}
