//! Feedback routing.
//!
//! Classifies a free-form follow-up into one of four closed actions so the
//! workflow's transition table stays exhaustive. The heuristics are cue
//! tables plus two small regexes; an LLM classifier could replace the
//! internals, but the output contract never widens.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};

use crate::domain::trip::IntentDelta;

/// What the follow-up asks the workflow to do next.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedbackAction {
    /// Re-run retrieval with preference deltas merged into memory.
    RetrySearch { deltas: IntentDelta },
    /// Re-parse the message and partially update the intent.
    Reparse { deltas: IntentDelta },
    /// End the session.
    Terminate,
    /// Plain conversation; reply without searching.
    ContinueChat,
}

/// Session-ending signals. Kept narrow so a "thanks, but..." request does
/// not end the session.
const TERMINATE_CUES: &[&str] = &[
    "bye",
    "goodbye",
    "that's all",
    "that is all",
    "we're done",
    "end the session",
    "i'm done",
    "고마워요 끝",
    "종료",
    "안녕히",
];

/// Signals that the user wants the same search redone differently.
/// Each cue carries the preference keyword it reinforces.
const RETRY_CUES: &[(&str, &str)] = &[
    ("cheaper", "budget"),
    ("more affordable", "budget"),
    ("less expensive", "budget"),
    ("lower price", "budget"),
    ("더 저렴", "budget"),
    ("fancier", "luxury"),
    ("more upscale", "luxury"),
    ("more luxurious", "luxury"),
    ("더 고급", "luxury"),
    ("quieter", "quiet"),
    ("more quiet", "quiet"),
    ("더 조용", "quiet"),
    ("closer to the center", "central"),
    ("closer to center", "central"),
    ("more central", "central"),
    ("중심가", "central"),
];

/// Asking for alternatives rejects what was shown without changing intent.
const ALTERNATIVE_CUES: &[&str] = &[
    "different hotel",
    "other hotel",
    "another hotel",
    "other options",
    "something else",
    "show me more",
    "다른 호텔",
    "다른 곳",
];

/// Signals that the trip itself changed and the message should be re-parsed.
const REPARSE_CUES: &[&str] = &[
    "instead",
    "what about",
    "how about",
    "change the destination",
    "different city",
    "change the dates",
    "start over",
    "from scratch",
    "처음부터",
    "다시 시작",
    "다른 도시",
];

static PRICE_CAP_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:under|below|less than|max(?:imum)?|at most)\s*\$?\s*(\d+(?:\.\d+)?)")
        .expect("valid price-cap regex")
});

static NEW_DESTINATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:what about|how about|instead of [A-Z][a-zA-Z]*,? (?:try|go to)|go to|try)\s+([A-Z][a-zA-Z]+(?:\s[A-Z][a-zA-Z]+)*)")
        .expect("valid destination regex")
});

/// Classifies feedback messages into workflow actions.
#[derive(Debug, Clone, Default)]
pub struct FeedbackRouter;

impl FeedbackRouter {
    pub fn new() -> Self {
        Self
    }

    pub fn classify(&self, message: &str) -> FeedbackAction {
        let lower = message.to_lowercase();

        if TERMINATE_CUES.iter().any(|cue| lower.contains(cue)) {
            return FeedbackAction::Terminate;
        }

        // A concrete new destination outranks preference tweaks: the trip
        // itself changed.
        let new_destination = NEW_DESTINATION_RE
            .captures(message)
            .map(|caps| caps[1].to_string());
        let reparse_cue = REPARSE_CUES.iter().any(|cue| lower.contains(cue));
        if let Some(destination) = new_destination {
            return FeedbackAction::Reparse {
                deltas: IntentDelta {
                    destination: Some(destination),
                    ..Default::default()
                },
            };
        }

        let mut weights: BTreeMap<String, f64> = BTreeMap::new();
        let mut preferences: BTreeSet<String> = BTreeSet::new();
        for (cue, keyword) in RETRY_CUES {
            if lower.contains(cue) {
                *weights.entry((*keyword).to_string()).or_insert(0.0) += 1.0;
                preferences.insert((*keyword).to_string());
            }
        }
        let wants_alternatives = ALTERNATIVE_CUES.iter().any(|cue| lower.contains(cue));
        let max_price = PRICE_CAP_RE
            .captures(&lower)
            .and_then(|caps| caps[1].parse::<f64>().ok());

        if !weights.is_empty() || wants_alternatives || max_price.is_some() {
            return FeedbackAction::RetrySearch {
                deltas: IntentDelta {
                    add_preferences: preferences,
                    max_price,
                    preference_weights: weights,
                    ..Default::default()
                },
            };
        }

        if reparse_cue {
            // No extractable delta; the parser re-reads the whole message.
            return FeedbackAction::Reparse {
                deltas: IntentDelta::default(),
            };
        }

        FeedbackAction::ContinueChat
    }
}
