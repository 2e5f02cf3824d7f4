//! Structured search filters and staged query relaxation.
//!
//! Relaxation is a strict, ordered degradation: each stage drops exactly one
//! class of constraints, and no stage is ever skipped. Rejected candidate
//! ids are memory-driven exclusions, not soft filters, so every stage keeps
//! them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::domain::foundation::CandidateId;
use crate::domain::trip::DateRange;

/// Hard and soft constraints for one retrieval call.
///
/// `destination`, `min_rating`, `date_range` and `max_price` are hard
/// pre-filters: a document failing them never enters the fused ranking.
/// `preference_tags` are soft and are the first to go when relaxing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchFilters {
    pub destination: Option<String>,
    pub min_rating: Option<f32>,
    pub date_range: Option<DateRange>,
    pub max_price: Option<f64>,
    pub preference_tags: Vec<String>,
    /// Previously rejected candidates; excluded at every relaxation stage.
    pub exclude_ids: BTreeSet<CandidateId>,
}

impl SearchFilters {
    /// True when only the destination (and exclusions) constrain the search.
    pub fn is_destination_only(&self) -> bool {
        self.min_rating.is_none()
            && self.date_range.is_none()
            && self.max_price.is_none()
            && self.preference_tags.is_empty()
    }
}

/// The three relaxation stages, in the order they must be tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelaxationStage {
    /// Full filter set.
    Full,
    /// Soft preference filters dropped; destination and minimum rating kept.
    DropSoftPreferences,
    /// Destination only.
    DestinationOnly,
}

impl RelaxationStage {
    /// All stages in degradation order.
    pub const ORDERED: [RelaxationStage; 3] = [
        RelaxationStage::Full,
        RelaxationStage::DropSoftPreferences,
        RelaxationStage::DestinationOnly,
    ];

    pub fn is_relaxed(&self) -> bool {
        !matches!(self, RelaxationStage::Full)
    }

    /// Derives this stage's filter set from the original.
    pub fn apply(&self, original: &SearchFilters) -> SearchFilters {
        match self {
            RelaxationStage::Full => original.clone(),
            RelaxationStage::DropSoftPreferences => SearchFilters {
                destination: original.destination.clone(),
                min_rating: original.min_rating,
                date_range: None,
                max_price: None,
                preference_tags: Vec::new(),
                exclude_ids: original.exclude_ids.clone(),
            },
            RelaxationStage::DestinationOnly => SearchFilters {
                destination: original.destination.clone(),
                min_rating: None,
                date_range: None,
                max_price: None,
                preference_tags: Vec::new(),
                exclude_ids: original.exclude_ids.clone(),
            },
        }
    }

    /// Human-readable note naming what this stage dropped from the original
    /// filter set. `None` for the unrelaxed stage.
    pub fn note(&self, original: &SearchFilters) -> Option<String> {
        match self {
            RelaxationStage::Full => None,
            RelaxationStage::DropSoftPreferences => {
                let mut dropped: Vec<String> = Vec::new();
                if !original.preference_tags.is_empty() {
                    dropped.push(format!(
                        "preference filters ({})",
                        original.preference_tags.join(", ")
                    ));
                }
                if original.max_price.is_some() {
                    dropped.push("the price cap".to_string());
                }
                if original.date_range.is_some() {
                    dropped.push("date availability".to_string());
                }
                let dropped = if dropped.is_empty() {
                    "optional filters".to_string()
                } else {
                    dropped.join(" and ")
                };
                Some(format!(
                    "Few exact matches, so I widened the search by dropping {dropped} while keeping the destination and minimum rating."
                ))
            }
            RelaxationStage::DestinationOnly => {
                let destination = original
                    .destination
                    .as_deref()
                    .unwrap_or("the destination");
                Some(format!(
                    "I had to relax the search to its broadest form: these are all stays found for {destination}, with every other filter dropped."
                ))
            }
        }
    }
}
