//! Rule-based query parser.
//!
//! Structures a free-form travel query with regular expressions and keyword
//! tables: destination, date window (absolute, month-day and relative
//! forms), party size, budget and preference keywords. An LLM parser can
//! implement the same port; this one is deterministic and needs no network.

use async_trait::async_trait;
use chrono::{Datelike, Days, NaiveDate, Weekday};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

use crate::domain::trip::{DateRange, ParsedIntent};
use crate::ports::{ParseError, QueryParser};

/// Default stay length when only a check-in is given.
const DEFAULT_STAY_NIGHTS: u64 = 3;

const MONTHS: &[(&str, u32)] = &[
    ("jan", 1),
    ("feb", 2),
    ("mar", 3),
    ("apr", 4),
    ("may", 5),
    ("jun", 6),
    ("jul", 7),
    ("aug", 8),
    ("sep", 9),
    ("oct", 10),
    ("nov", 11),
    ("dec", 12),
];

/// Canonical preference keyword -> trigger words.
const PREFERENCE_CUES: &[(&str, &[&str])] = &[
    ("quiet", &["quiet", "peaceful", "calm", "tranquil", "조용"]),
    ("romantic", &["romantic", "intimate", "honeymoon", "couples", "낭만"]),
    ("luxury", &["luxury", "luxurious", "premium", "upscale", "고급"]),
    ("budget", &["budget", "cheap", "affordable", "economical", "저렴"]),
    ("family", &["family", "kids", "children", "가족"]),
    ("wifi", &["wifi", "wi-fi", "internet", "와이파이"]),
    ("breakfast", &["breakfast", "조식"]),
    ("parking", &["parking", "car park", "주차"]),
    ("pool", &["pool", "swimming", "수영장"]),
    ("gym", &["gym", "fitness"]),
    ("spa", &["spa", "massage", "wellness"]),
    ("central", &["center", "central", "downtown", "중심"]),
];

static DESTINATION_PREPOSITION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:\bin|\bto|\bat|\bvisit(?:ing)?|\bnear)\s+([A-Z][a-zA-Z]+(?:\s[A-Z][a-zA-Z]+)*)")
        .expect("valid destination regex")
});

static DESTINATION_LEADING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([A-Z][a-zA-Z]+(?:\s[A-Z][a-zA-Z]+)*)\s*[,:]").expect("valid leading regex")
});

static DESTINATION_SUFFIX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([A-Z][a-zA-Z]+(?:\s[A-Z][a-zA-Z]+)*)\s+(?:hotels?|trip|travel|stay)")
        .expect("valid suffix regex")
});

static ISO_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{4})-(\d{2})-(\d{2})").expect("valid iso date regex"));

static MONTH_DAY_RANGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?\s+(\d{1,2})\s*(?:-|–|to|through)\s*(\d{1,2})\b",
    )
    .expect("valid month-day regex")
});

static PARTY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d+)\s*(?:people|persons?|travellers?|travelers?|guests?|adults?|명)")
        .expect("valid party regex")
});

static BUDGET_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$\s?(\d+(?:,\d{3})*(?:\.\d{1,2})?)").expect("valid budget regex")
});

/// Deterministic regex/keyword parser for the `QueryParser` port.
#[derive(Debug, Clone, Default)]
pub struct RuleBasedQueryParser;

impl RuleBasedQueryParser {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl QueryParser for RuleBasedQueryParser {
    async fn parse(&self, raw_query: &str, today: NaiveDate) -> Result<ParsedIntent, ParseError> {
        let trimmed = raw_query.trim();
        if trimmed.is_empty() {
            return Err(ParseError::unstructurable("the message was empty"));
        }
        if !trimmed.chars().any(|c| c.is_alphanumeric()) {
            return Err(ParseError::unstructurable(
                "the message contained no readable words",
            ));
        }

        Ok(ParsedIntent {
            destination: extract_destination(trimmed),
            date_range: extract_dates(trimmed, today),
            party_size: extract_party(trimmed),
            budget: extract_budget(trimmed),
            preferences: extract_preferences(trimmed),
        })
    }
}

fn is_month_word(word: &str) -> bool {
    let lower = word.to_lowercase();
    MONTHS.iter().any(|(m, _)| lower.starts_with(m))
}

fn extract_destination(query: &str) -> Option<String> {
    for re in [
        &*DESTINATION_PREPOSITION_RE,
        &*DESTINATION_LEADING_RE,
        &*DESTINATION_SUFFIX_RE,
    ] {
        if let Some(caps) = re.captures(query) {
            let candidate = caps[1].trim().to_string();
            if !is_month_word(&candidate) {
                return Some(candidate);
            }
        }
    }
    None
}

fn extract_dates(query: &str, today: NaiveDate) -> Option<DateRange> {
    // Absolute ISO dates win
    let iso: Vec<NaiveDate> = ISO_DATE_RE
        .captures_iter(query)
        .filter_map(|caps| {
            NaiveDate::from_ymd_opt(
                caps[1].parse().ok()?,
                caps[2].parse().ok()?,
                caps[3].parse().ok()?,
            )
        })
        .collect();
    match iso.len() {
        0 => {}
        1 => {
            let start = iso[0];
            let end = start.checked_add_days(Days::new(DEFAULT_STAY_NIGHTS))?;
            return DateRange::new(start, end).ok();
        }
        _ => {
            let (a, b) = (iso[0].min(iso[1]), iso[0].max(iso[1]));
            return DateRange::new(a, b).ok();
        }
    }

    // "Dec 15-18" style: year inferred as the next occurrence of the month
    if let Some(caps) = MONTH_DAY_RANGE_RE.captures(query) {
        let month = MONTHS
            .iter()
            .find(|(name, _)| caps[1].to_lowercase().starts_with(name))
            .map(|(_, m)| *m)?;
        let day_start: u32 = caps[2].parse().ok()?;
        let day_end: u32 = caps[3].parse().ok()?;
        let year = if month >= today.month() {
            today.year()
        } else {
            today.year() + 1
        };
        let start = NaiveDate::from_ymd_opt(year, month, day_start)?;
        let end = NaiveDate::from_ymd_opt(year, month, day_end)?;
        return DateRange::new(start, end).ok();
    }

    // Relative expressions
    let lower = query.to_lowercase();
    if lower.contains("next week") {
        let start = today.checked_add_days(Days::new(7))?;
        let end = start.checked_add_days(Days::new(DEFAULT_STAY_NIGHTS))?;
        return DateRange::new(start, end).ok();
    }
    if lower.contains("this weekend") {
        let days_to_saturday = (Weekday::Sat.num_days_from_monday() + 7
            - today.weekday().num_days_from_monday())
            % 7;
        let start = today.checked_add_days(Days::new(u64::from(days_to_saturday.max(1))))?;
        let end = start.checked_add_days(Days::new(1))?;
        return DateRange::new(start, end).ok();
    }
    if lower.contains("next month") {
        let start = today.checked_add_days(Days::new(30))?;
        let end = start.checked_add_days(Days::new(DEFAULT_STAY_NIGHTS))?;
        return DateRange::new(start, end).ok();
    }

    None
}

fn extract_party(query: &str) -> Option<u32> {
    PARTY_RE
        .captures(query)
        .and_then(|caps| caps[1].parse().ok())
}

fn extract_budget(query: &str) -> Option<f64> {
    BUDGET_RE
        .captures(query)
        .and_then(|caps| caps[1].replace(',', "").parse().ok())
}

fn extract_preferences(query: &str) -> BTreeSet<String> {
    let lower = query.to_lowercase();
    PREFERENCE_CUES
        .iter()
        .filter(|(_, cues)| cues.iter().any(|cue| lower.contains(cue)))
        .map(|(canonical, _)| (*canonical).to_string())
        .collect()
}
