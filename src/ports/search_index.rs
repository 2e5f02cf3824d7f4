//! Search index port.
//!
//! The index executes one query and returns ranked hits carrying separate
//! lexical and vector sub-scores; fusion happens on our side. Hard filters
//! are applied by the index before scoring, so a document failing them never
//! reaches the fused ranking. An empty result set is a value, not an error.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::search::{IndexHit, SearchFilters};

/// The index was unreachable or failed mid-query. The orchestrator treats
/// this as recoverable-with-notice: generation proceeds with an empty
/// candidate set and a note.
#[derive(Debug, Clone, Error)]
pub enum IndexError {
    #[error("search index unreachable: {0}")]
    Unavailable(String),
}

/// Port for the combined lexical + vector document index.
#[async_trait]
pub trait SearchIndex: Send + Sync {
    /// Runs one filtered query.
    ///
    /// # Errors
    ///
    /// - `Unavailable` only for genuine transport failure. "Nothing matched"
    ///   is `Ok(vec![])`.
    async fn search(
        &self,
        query_text: &str,
        filters: &SearchFilters,
        top_k: usize,
    ) -> Result<Vec<IndexHit>, IndexError>;
}
