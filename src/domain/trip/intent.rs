//! Parsed travel intent and partial-update deltas.
//!
//! A `ParsedIntent` is written once per turn by the query-parse step and only
//! revised through a re-parse feedback loop, which applies an `IntentDelta`
//! as a partial update (unspecified fields are retained).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::domain::foundation::ValidationError;

/// Inclusive travel date range (check-in through check-out day).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Creates a range, rejecting end-before-start.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ValidationError> {
        if end < start {
            return Err(ValidationError::invalid_format(
                "date_range",
                format!("check-out {} precedes check-in {}", end, start),
            ));
        }
        Ok(Self { start, end })
    }

    /// Number of calendar days covered, inclusive of both endpoints.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Number of nights between check-in and check-out.
    pub fn nights(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    /// Iterates every date in the range, inclusive.
    pub fn iter_days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        let count = self.days() as usize;
        self.start.iter_days().take(count)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// Structured travel intent extracted from a free-form query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedIntent {
    /// Target city or region. Absent for small-talk turns.
    pub destination: Option<String>,
    /// Check-in/check-out window.
    pub date_range: Option<DateRange>,
    /// Number of travelers.
    pub party_size: Option<u32>,
    /// Nightly budget ceiling, in the traveler's currency.
    pub budget: Option<f64>,
    /// Free-text preference keywords (atmosphere, amenities, activities).
    pub preferences: BTreeSet<String>,
}

impl ParsedIntent {
    pub fn has_destination(&self) -> bool {
        self.destination.as_deref().map_or(false, |d| !d.is_empty())
    }

    /// Preference keywords joined into the text the alpha classifier and
    /// search query consume.
    pub fn preference_text(&self) -> String {
        self.preferences
            .iter()
            .cloned()
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Applies a re-parse delta: present fields replace, absent fields are
    /// retained, preference additions are unioned in.
    pub fn apply_delta(&mut self, delta: &IntentDelta) {
        if let Some(destination) = &delta.destination {
            self.destination = Some(destination.clone());
        }
        if let Some(range) = delta.date_range {
            self.date_range = Some(range);
        }
        if let Some(party) = delta.party_size {
            self.party_size = Some(party);
        }
        if let Some(budget) = delta.budget {
            self.budget = Some(budget);
        }
        self.preferences.extend(delta.add_preferences.iter().cloned());
    }
}

/// Partial update extracted from a feedback message.
///
/// Used two ways: a re-parse replaces the matching `ParsedIntent` fields,
/// while a retry-search folds `preference_weights` and `max_price` into
/// conversation memory before re-invoking retrieval.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntentDelta {
    pub destination: Option<String>,
    pub date_range: Option<DateRange>,
    pub party_size: Option<u32>,
    pub budget: Option<f64>,
    pub add_preferences: BTreeSet<String>,
    /// Hard price ceiling extracted from the message ("under $100").
    pub max_price: Option<f64>,
    /// Preference weight adjustments ("cheaper" bumps `budget`).
    pub preference_weights: BTreeMap<String, f64>,
}

impl IntentDelta {
    pub fn is_empty(&self) -> bool {
        self.destination.is_none()
            && self.date_range.is_none()
            && self.party_size.is_none()
            && self.budget.is_none()
            && self.add_preferences.is_empty()
            && self.max_price.is_none()
            && self.preference_weights.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    mod date_range {
        use super::*;

        #[test]
        fn rejects_inverted_range() {
            assert!(DateRange::new(date(2026, 12, 18), date(2026, 12, 15)).is_err());
        }

        #[test]
        fn four_day_stay_has_four_days_and_three_nights() {
            let range = DateRange::new(date(2026, 12, 15), date(2026, 12, 18)).unwrap();
            assert_eq!(range.days(), 4);
            assert_eq!(range.nights(), 3);
        }

        #[test]
        fn single_day_range_is_valid() {
            let range = DateRange::new(date(2026, 12, 15), date(2026, 12, 15)).unwrap();
            assert_eq!(range.days(), 1);
            assert_eq!(range.nights(), 0);
        }

        #[test]
        fn iter_days_covers_both_endpoints() {
            let range = DateRange::new(date(2026, 12, 15), date(2026, 12, 18)).unwrap();
            let days: Vec<_> = range.iter_days().collect();
            assert_eq!(days.len(), 4);
            assert_eq!(days[0], date(2026, 12, 15));
            assert_eq!(days[3], date(2026, 12, 18));
        }
    }

    mod apply_delta {
        use super::*;

        fn paris_intent() -> ParsedIntent {
            ParsedIntent {
                destination: Some("Paris".to_string()),
                date_range: Some(DateRange::new(date(2026, 12, 15), date(2026, 12, 18)).unwrap()),
                party_size: Some(2),
                budget: Some(200.0),
                preferences: ["romantic", "quiet"].iter().map(|s| s.to_string()).collect(),
            }
        }

        #[test]
        fn absent_fields_are_retained() {
            let mut intent = paris_intent();
            let delta = IntentDelta {
                destination: Some("Lyon".to_string()),
                ..Default::default()
            };
            intent.apply_delta(&delta);
            assert_eq!(intent.destination.as_deref(), Some("Lyon"));
            // Dates, party and budget survive the partial update
            assert!(intent.date_range.is_some());
            assert_eq!(intent.party_size, Some(2));
            assert_eq!(intent.budget, Some(200.0));
        }

        #[test]
        fn preference_additions_are_unioned() {
            let mut intent = paris_intent();
            let delta = IntentDelta {
                add_preferences: ["spa"].iter().map(|s| s.to_string()).collect(),
                ..Default::default()
            };
            intent.apply_delta(&delta);
            assert!(intent.preferences.contains("spa"));
            assert!(intent.preferences.contains("romantic"));
        }
    }
}
