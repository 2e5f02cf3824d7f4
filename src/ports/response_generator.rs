//! Response generation port.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::trip::StateView;

/// Response generation threw. Turn-fatal: surfaced to the caller verbatim,
/// with the state rolled back to its pre-generation snapshot.
#[derive(Debug, Clone, Error)]
pub enum GenerationError {
    #[error("response generation failed: {0}")]
    Failed(String),
}

/// What the generation step produced for one turn.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedResponse {
    pub text: String,
    /// True when the reply ends with a question the user should answer
    /// (relaxed search, empty results, missing dates).
    pub needs_feedback: bool,
}

/// Port for composing the user-facing reply.
///
/// Consumes a read-only projection of the conversation state and must not
/// mutate anything. Degradation notes (relaxation, empty index) are rendered
/// into the reply text here, never as raw error codes.
#[async_trait]
pub trait ResponseGenerator: Send + Sync {
    async fn generate(&self, view: StateView<'_>) -> Result<GeneratedResponse, GenerationError>;
}
