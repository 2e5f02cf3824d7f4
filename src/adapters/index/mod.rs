//! Search index adapters.

mod in_memory;

pub use in_memory::{sample_catalog, HotelDoc, InMemorySearchIndex};
