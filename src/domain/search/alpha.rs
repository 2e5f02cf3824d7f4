//! Adaptive fusion-weight selection.
//!
//! Classifies free-text preferences into a query profile by a presence test
//! against two fixed cue sets. This is a pure function of the input text so
//! it can be tested in isolation; no configuration or hidden state feeds it.

use serde::{Deserialize, Serialize};

/// Atmosphere and sentiment cues: the query is about how a place feels,
/// which lexical matching handles poorly. English and Korean forms, since
/// the review corpus and its users are bilingual.
const SEMANTIC_CUES: &[&str] = &[
    "romantic", "quiet", "cozy", "intimate", "relax", "luxury", "scenic", "peaceful", "charming",
    "serene", "tranquil", "stylish", "조용", "낭만", "아늑", "고급", "한적", "분위기",
];

/// Amenity and location literals: the query names a concrete thing the
/// review text either contains or does not.
const KEYWORD_CUES: &[&str] = &[
    "near", "nearby", "center", "close", "breakfast", "parking", "pool", "wifi", "gym", "spa",
    "airport", "station", "주차", "조식", "수영장", "와이파이", "역세권", "공항",
];

/// Query profile derived from the preference text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryProfile {
    /// Atmosphere-dominated: lean on the vector score.
    SemanticHeavy,
    /// Literal-amenity-dominated: lean on the lexical score.
    KeywordHeavy,
    /// Neither dominates.
    Balanced,
}

impl QueryProfile {
    /// The fusion weight this profile selects (vector share).
    pub fn alpha(&self) -> f32 {
        match self {
            Self::SemanticHeavy => 0.7,
            Self::KeywordHeavy => 0.3,
            Self::Balanced => 0.5,
        }
    }
}

/// Classifies preference text by cue presence counts.
pub fn classify(preference_text: &str) -> QueryProfile {
    let lower = preference_text.to_lowercase();
    let semantic_hits = SEMANTIC_CUES.iter().filter(|cue| lower.contains(*cue)).count();
    let keyword_hits = KEYWORD_CUES.iter().filter(|cue| lower.contains(*cue)).count();

    if semantic_hits > keyword_hits {
        QueryProfile::SemanticHeavy
    } else if keyword_hits > semantic_hits {
        QueryProfile::KeywordHeavy
    } else {
        QueryProfile::Balanced
    }
}

/// Convenience: classify and return the alpha directly.
pub fn adaptive_alpha(preference_text: &str) -> f32 {
    classify(preference_text).alpha()
}
