//! Hybrid search ranking engine: adaptive weighting, score fusion, staged
//! relaxation and re-ranking. Everything here is pure computation over
//! values; the index itself sits behind a port.

mod alpha;
mod filters;
mod fusion;
mod rerank;

pub use alpha::{adaptive_alpha, classify, QueryProfile};
pub use filters::{RelaxationStage, SearchFilters};
pub use fusion::{compare_fused, fuse, IndexHit};
pub use rerank::{
    CrossSignalReranker, FailoverReranker, LexicalOverlapReranker, RerankError, Reranker,
};
