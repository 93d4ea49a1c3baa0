//! Rule-based query classification.
//!
//! Cheap, deterministic, no model call: the profile only steers routing
//! weight, it never answers the query. Same input text always yields the
//! same profile.

use std::collections::BTreeMap;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Maharashtra RERA registration numbers: one or two letters followed by a
/// long digit run (e.g. P51700012345).
static RERA_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b([A-Za-z]{1,2}\d{10,13})\b").expect("rera id pattern"));

static PIN_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(\d{6})\b").expect("pin pattern"));

static YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(20\d{2})\b").expect("year pattern"));

static TOP_N: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\btop\s+(\d+)\b").expect("top n pattern"));

const COMPARISON_KEYWORDS: &[&str] =
    &["compare", "versus", " vs ", " vs.", "difference between", "contrast"];

const AGGREGATION_KEYWORDS: &[&str] = &[
    "how many",
    "number of",
    "count of",
    "total",
    "average",
    "sum of",
    "aggregate",
    "statistics",
    "distribution",
    "percentage",
];

/// District and taluka names seen in the corpus; lowercase for matching.
const KNOWN_LOCATIONS: &[&str] = &[
    "mumbai",
    "mumbai suburban",
    "pune",
    "pune city",
    "thane",
    "nashik",
    "raigarh",
    "panvel",
    "gadhinglaj",
    "shahapur",
    "borivali",
    "bandra",
    "adai",
];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IntentCategory {
    FactualLookup,
    Comparison,
    AggregationStatistic,
    LocationBased,
    Ambiguous,
}

impl fmt::Display for IntentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IntentCategory::FactualLookup => "factual_lookup",
            IntentCategory::Comparison => "comparison",
            IntentCategory::AggregationStatistic => "aggregation_statistic",
            IntentCategory::LocationBased => "location_based",
            IntentCategory::Ambiguous => "ambiguous",
        };
        f.write_str(s)
    }
}

/// Derived, transient profile of one query. `entities` is ordered so any
/// string rendered from it is reproducible.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryProfile {
    pub intent: IntentCategory,
    pub entities: BTreeMap<String, String>,
    pub confidence: f32,
}

/// Classify a raw query.
///
/// Priority: an exact registration id beats everything, then comparison,
/// aggregation, location. Entity extraction runs regardless of the winning
/// intent; a pattern that does not match simply omits its key.
pub fn classify(query: &str) -> QueryProfile {
    let lower = query.to_lowercase();
    let entities = extract_entities(query, &lower);

    let has_registration = entities.contains_key("registration_number");
    let has_location = entities.contains_key("district");
    let has_comparison = COMPARISON_KEYWORDS.iter().any(|kw| lower.contains(kw));
    let has_aggregation = AGGREGATION_KEYWORDS.iter().any(|kw| lower.contains(kw));

    let (intent, confidence) = if has_registration {
        (IntentCategory::FactualLookup, 1.0)
    } else if has_comparison {
        (IntentCategory::Comparison, 0.7)
    } else if has_aggregation {
        (IntentCategory::AggregationStatistic, 0.7)
    } else if has_location {
        (IntentCategory::LocationBased, 0.9)
    } else {
        (IntentCategory::Ambiguous, 0.2)
    };

    QueryProfile { intent, entities, confidence }
}

fn extract_entities(query: &str, lower: &str) -> BTreeMap<String, String> {
    let mut entities = BTreeMap::new();

    if let Some(m) = RERA_ID.captures(query).and_then(|c| c.get(1)) {
        entities.insert("registration_number".to_string(), m.as_str().to_uppercase());
    }

    // Longest names first so "mumbai suburban" wins over "mumbai".
    let mut locations: Vec<&str> = KNOWN_LOCATIONS.to_vec();
    locations.sort_by_key(|name| std::cmp::Reverse(name.len()));
    for name in locations {
        if lower.contains(name) {
            entities.insert("district".to_string(), name.to_string());
            break;
        }
    }

    if let Some(m) = PIN_CODE.captures(query).and_then(|c| c.get(1)) {
        // A 6-digit run inside a registration number is not a PIN code.
        if !entities.get("registration_number").is_some_and(|r| r.contains(m.as_str())) {
            entities.insert("pin_code".to_string(), m.as_str().to_string());
        }
    }

    if let Some(m) = YEAR.captures(query).and_then(|c| c.get(1)) {
        if !entities.get("registration_number").is_some_and(|r| r.contains(m.as_str())) {
            entities.insert("year".to_string(), m.as_str().to_string());
        }
    }

    if let Some(m) = TOP_N.captures(lower).and_then(|c| c.get(1)) {
        entities.insert("top_n".to_string(), m.as_str().to_string());
    }

    entities
}
