//! In-memory hybrid search index.
//!
//! An in-process implementation of the `SearchIndex` port over a hotel
//! review catalog: tokenized lexical scoring with a hotel-domain synonym
//! table, deterministic feature-hash embeddings for the vector side, and
//! hard structured filtering before any scoring. Useful for development,
//! demos and tests; a remote index implements the same port in production.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tokio::sync::RwLock;

use crate::domain::foundation::CandidateId;
use crate::domain::search::{IndexHit, SearchFilters};
use crate::domain::trip::DateRange;
use crate::ports::{IndexError, SearchIndex};

const EMBED_DIM: usize = 64;

/// Synonym groups for the hotel domain. A query token matching any member
/// of a group matches every member during lexical scoring.
const SYNONYM_GROUPS: &[&[&str]] = &[
    &["quiet", "peaceful", "calm", "tranquil", "serene"],
    &["romantic", "intimate", "cozy", "charming"],
    &["luxury", "luxurious", "premium", "upscale", "elegant"],
    &["budget", "cheap", "affordable", "economical", "inexpensive"],
    &["clean", "tidy", "spotless", "pristine", "immaculate"],
    &["friendly", "hospitable", "welcoming", "warm", "helpful"],
    &["central", "downtown", "center"],
    &["breakfast", "brunch"],
    &["wifi", "internet", "wireless"],
    &["pool", "swimming"],
    &["gym", "fitness"],
    &["spa", "wellness", "massage"],
    &["parking", "garage"],
    &["spacious", "large", "roomy", "big"],
    &["modern", "contemporary", "renovated"],
];

/// One catalog entry: a hotel with its aggregated review text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HotelDoc {
    pub id: String,
    pub name: String,
    pub location: String,
    pub rating: f32,
    pub nightly_rate: f64,
    pub review: String,
    pub tags: Vec<String>,
    /// Bookable windows; empty means always available.
    #[serde(default)]
    pub available: Vec<DateRange>,
}

impl HotelDoc {
    fn passes_hard_filters(&self, filters: &SearchFilters) -> bool {
        if let Some(destination) = &filters.destination {
            if !self
                .location
                .to_lowercase()
                .contains(&destination.to_lowercase())
            {
                return false;
            }
        }
        if let Some(min_rating) = filters.min_rating {
            if self.rating < min_rating {
                return false;
            }
        }
        if let Some(max_price) = filters.max_price {
            if self.nightly_rate > max_price {
                return false;
            }
        }
        if let Some(range) = filters.date_range {
            if !self.available.is_empty()
                && !self
                    .available
                    .iter()
                    .any(|window| window.start <= range.start && range.end <= window.end)
            {
                return false;
            }
        }
        if !filters.preference_tags.is_empty() {
            let wanted: BTreeSet<String> = filters
                .preference_tags
                .iter()
                .map(|t| t.to_lowercase())
                .collect();
            if !self.tags.iter().any(|tag| wanted.contains(&tag.to_lowercase())) {
                return false;
            }
        }
        if filters.exclude_ids.contains(&CandidateId::new(&self.id)) {
            return false;
        }
        true
    }
}

struct IndexedDoc {
    doc: HotelDoc,
    vector: Vec<f32>,
    tokens: BTreeSet<String>,
}

/// In-process `SearchIndex` implementation.
pub struct InMemorySearchIndex {
    docs: RwLock<Vec<IndexedDoc>>,
}

impl InMemorySearchIndex {
    pub fn new() -> Self {
        Self {
            docs: RwLock::new(Vec::new()),
        }
    }

    pub async fn with_documents(docs: Vec<HotelDoc>) -> Self {
        let index = Self::new();
        index.add_documents(docs).await;
        index
    }

    pub async fn add_documents(&self, docs: Vec<HotelDoc>) {
        let mut indexed = self.docs.write().await;
        for doc in docs {
            let searchable = format!("{} {} {}", doc.name, doc.review, doc.tags.join(" "));
            indexed.push(IndexedDoc {
                vector: embed(&searchable),
                tokens: tokenize(&searchable),
                doc,
            });
        }
    }

    pub async fn len(&self) -> usize {
        self.docs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.docs.read().await.is_empty()
    }
}

impl Default for InMemorySearchIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SearchIndex for InMemorySearchIndex {
    async fn search(
        &self,
        query_text: &str,
        filters: &SearchFilters,
        top_k: usize,
    ) -> Result<Vec<IndexHit>, IndexError> {
        let query_tokens = expand_synonyms(&tokenize(query_text));
        let query_vector = embed(query_text);

        let docs = self.docs.read().await;
        let mut hits: Vec<IndexHit> = docs
            .iter()
            .filter(|entry| entry.doc.passes_hard_filters(filters))
            .map(|entry| {
                let lexical = lexical_score(&query_tokens, entry);
                let vector = cosine(&query_vector, &entry.vector);
                IndexHit {
                    id: CandidateId::new(&entry.doc.id),
                    name: entry.doc.name.clone(),
                    location: entry.doc.location.clone(),
                    rating: entry.doc.rating,
                    snippet: snippet_of(&entry.doc.review),
                    tags: entry.doc.tags.clone(),
                    lexical_score: lexical,
                    vector_score: vector,
                }
            })
            .collect();

        // Pre-rank by raw signal sum; real ranking happens in fusion.
        hits.sort_by(|a, b| {
            (b.lexical_score + b.vector_score)
                .partial_cmp(&(a.lexical_score + a.vector_score))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(top_k);
        Ok(hits)
    }
}

fn tokenize(text: &str) -> BTreeSet<String> {
    text.split_whitespace()
        .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase())
        .filter(|t| t.len() > 1)
        .collect()
}

/// Expands query tokens through the synonym table.
fn expand_synonyms(tokens: &BTreeSet<String>) -> BTreeSet<String> {
    let mut expanded = tokens.clone();
    for group in SYNONYM_GROUPS {
        if group.iter().any(|word| tokens.contains(*word)) {
            expanded.extend(group.iter().map(|w| w.to_string()));
        }
    }
    expanded
}

/// Matched-token count, with name tokens counted double.
fn lexical_score(query_tokens: &BTreeSet<String>, entry: &IndexedDoc) -> f32 {
    if query_tokens.is_empty() {
        return 0.0;
    }
    let name_tokens = tokenize(&entry.doc.name);
    let mut score = 0.0;
    for token in query_tokens {
        if name_tokens.contains(token) {
            score += 2.0;
        } else if entry.tokens.contains(token) {
            score += 1.0;
        }
    }
    score
}

/// Deterministic bag-of-tokens feature-hash embedding, L2 normalized.
fn embed(text: &str) -> Vec<f32> {
    let mut vector = vec![0.0f32; EMBED_DIM];
    for token in tokenize(text) {
        let bucket = (fnv1a(token.as_bytes()) % EMBED_DIM as u64) as usize;
        vector[bucket] += 1.0;
    }
    let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
        for value in &mut vector {
            *value /= norm;
        }
    }
    vector
}

fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in bytes {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum::<f32>().max(0.0)
}

fn snippet_of(review: &str) -> String {
    const SNIPPET_LEN: usize = 200;
    if review.len() <= SNIPPET_LEN {
        return review.to_string();
    }
    let mut end = SNIPPET_LEN;
    while !review.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &review[..end])
}

/// A small built-in catalog for development and demos.
pub fn sample_catalog() -> Vec<HotelDoc> {
    let doc = |id: &str, name: &str, location: &str, rating: f32, rate: f64, review: &str, tags: &[&str]| HotelDoc {
        id: id.to_string(),
        name: name.to_string(),
        location: location.to_string(),
        rating,
        nightly_rate: rate,
        review: review.to_string(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        available: vec![],
    };
    vec![
        doc(
            "paris-001",
            "Hotel Lumière",
            "Paris",
            4.6,
            240.0,
            "A quiet and romantic retreat near the Seine. Spotless rooms, friendly staff and an excellent breakfast. Perfect for couples.",
            &["romantic", "quiet", "breakfast"],
        ),
        doc(
            "paris-002",
            "Le Jardin Secret",
            "Paris",
            4.4,
            190.0,
            "Charming boutique hotel with a peaceful courtyard garden. Intimate atmosphere, modern bathrooms, very clean.",
            &["romantic", "quiet", "garden"],
        ),
        doc(
            "paris-003",
            "Gare du Nord Express",
            "Paris",
            3.9,
            110.0,
            "Practical budget stay right by the station. Free wifi and parking nearby, breakfast costs extra. Can be noisy at night.",
            &["budget", "wifi", "parking"],
        ),
        doc(
            "paris-004",
            "Maison Montmartre",
            "Paris",
            4.2,
            160.0,
            "Cozy rooms with amazing views over Montmartre. Friendly staff, great location for walking, spacious suites on the top floor.",
            &["romantic", "view"],
        ),
        doc(
            "paris-005",
            "Palais Rivoli",
            "Paris",
            4.8,
            420.0,
            "Luxury hotel in the first arrondissement. Elegant spa, premium service, superb restaurant. Expensive but worth it.",
            &["luxury", "spa", "restaurant"],
        ),
        doc(
            "rome-001",
            "Trastevere Charm",
            "Rome",
            4.5,
            170.0,
            "Romantic hideaway in Trastevere with a rooftop terrace. Quiet side street, excellent coffee, warm hosts.",
            &["romantic", "quiet", "terrace"],
        ),
        doc(
            "rome-002",
            "Colosseo Budget Inn",
            "Rome",
            3.7,
            85.0,
            "Cheap and cheerful near the Colosseum. Clean enough, free wifi, breakfast included. Great value.",
            &["budget", "wifi", "breakfast"],
        ),
        doc(
            "seoul-001",
            "Han River Serenity",
            "Seoul",
            4.7,
            200.0,
            "조용한 호텔 with beautiful river views. Immaculate rooms, tranquil spa, wonderful service. 주차 가능.",
            &["quiet", "spa", "parking"],
        ),
        doc(
            "seoul-002",
            "Gangnam City Stay",
            "Seoul",
            4.1,
            140.0,
            "Modern business hotel in Gangnam. Close to the subway, free parking, gym and fast wifi. 조식 included.",
            &["business", "parking", "gym", "wifi"],
        ),
        doc(
            "london-001",
            "Covent Garden House",
            "London",
            4.3,
            260.0,
            "Elegant townhouse hotel in the heart of Covent Garden. Spacious rooms, great location, lovely afternoon tea.",
            &["central", "elegant"],
        ),
    ]
}
