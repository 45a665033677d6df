//! Domain profiles for retrieval tuning.
//!
//! A domain is picked once per query by scanning the persona and task
//! text for keywords. Each domain bundles the BM25 parameters, the
//! lexical/semantic fusion weights, and the query-expansion vocabulary
//! that work well for that kind of corpus. Profiles are fixed tables,
//! never mutated.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Okapi BM25 tuning: `k1` saturates term frequency, `b` scales length
/// normalization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bm25Params {
    pub k1: f32,
    pub b: f32,
}

/// Linear fusion weights; each profile's pair sums to 1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FusionWeights {
    pub lexical: f32,
    pub semantic: f32,
}

/// One domain's full tuning bundle.
#[derive(Debug, Clone, Copy)]
pub struct DomainProfile {
    pub bm25: Bm25Params,
    pub weights: FusionWeights,
    /// Trigger term -> synonyms appended to the query when the trigger
    /// appears in it.
    pub expansions: &'static [(&'static str, &'static [&'static str])],
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Travel,
    Research,
    Business,
    Culinary,
    General,
}

/// Detection keywords, checked in declaration order; first hit wins.
const DETECTION: &[(Domain, &[&str])] = &[
    (
        Domain::Travel,
        &["travel", "trip", "vacation", "tourist", "planner", "itinerary"],
    ),
    (
        Domain::Research,
        &["research", "study", "analysis", "investigation", "academic"],
    ),
    (
        Domain::Business,
        &["business", "professional", "hr", "compliance", "management"],
    ),
    (
        Domain::Culinary,
        &["food", "cooking", "recipe", "chef", "culinary", "menu"],
    ),
];

const TRAVEL_EXPANSIONS: &[(&str, &[&str])] = &[
    ("trip", &["vacation", "journey", "travel", "visit", "tour"]),
    ("hotel", &["accommodation", "lodging", "stay", "resort", "inn"]),
    ("restaurant", &["dining", "food", "cuisine", "meal", "eatery"]),
    ("attraction", &["sight", "landmark", "destination", "place", "spot"]),
    ("transport", &["transportation", "travel", "commute", "journey"]),
];

const RESEARCH_EXPANSIONS: &[(&str, &[&str])] = &[
    ("study", &["research", "analysis", "investigation", "examination"]),
    ("method", &["approach", "technique", "procedure", "methodology"]),
    ("result", &["finding", "outcome", "conclusion", "discovery"]),
    ("data", &["information", "evidence", "statistics", "figures"]),
];

const BUSINESS_EXPANSIONS: &[(&str, &[&str])] = &[
    ("form", &["document", "template", "application", "form", "paperwork"]),
    ("compliance", &["regulation", "policy", "requirement", "standard"]),
    ("process", &["procedure", "workflow", "system", "method"]),
    ("management", &["administration", "oversight", "supervision"]),
];

const CULINARY_EXPANSIONS: &[(&str, &[&str])] = &[
    ("recipe", &["dish", "meal", "cooking", "preparation"]),
    ("ingredient", &["component", "element", "item", "material"]),
    ("cooking", &["preparation", "making", "creating", "preparing"]),
    ("meal", &["dish", "course", "serving", "food"]),
];

impl Domain {
    /// Pick the domain for a persona/task pair. The concatenated text is
    /// scanned for each domain's keywords in a fixed order; no hit means
    /// [`Domain::General`].
    pub fn detect(persona: &str, task: &str) -> Domain {
        let haystack = format!("{persona} {task}").to_lowercase();
        for (domain, keywords) in DETECTION {
            if keywords.iter().any(|keyword| haystack.contains(keyword)) {
                return *domain;
            }
        }
        Domain::General
    }

    pub fn profile(self) -> DomainProfile {
        match self {
            Domain::Travel => DomainProfile {
                bm25: Bm25Params { k1: 1.2, b: 0.75 },
                weights: FusionWeights {
                    lexical: 0.6,
                    semantic: 0.4,
                },
                expansions: TRAVEL_EXPANSIONS,
            },
            Domain::Research => DomainProfile {
                bm25: Bm25Params { k1: 1.5, b: 0.6 },
                weights: FusionWeights {
                    lexical: 0.4,
                    semantic: 0.6,
                },
                expansions: RESEARCH_EXPANSIONS,
            },
            Domain::Business => DomainProfile {
                bm25: Bm25Params { k1: 1.0, b: 0.8 },
                weights: FusionWeights {
                    lexical: 0.5,
                    semantic: 0.5,
                },
                expansions: BUSINESS_EXPANSIONS,
            },
            Domain::Culinary => DomainProfile {
                bm25: Bm25Params { k1: 1.3, b: 0.7 },
                weights: FusionWeights {
                    lexical: 0.7,
                    semantic: 0.3,
                },
                expansions: CULINARY_EXPANSIONS,
            },
            Domain::General => DomainProfile {
                bm25: Bm25Params { k1: 1.2, b: 0.75 },
                weights: FusionWeights {
                    lexical: 0.6,
                    semantic: 0.4,
                },
                expansions: &[],
            },
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Domain::Travel => "travel",
            Domain::Research => "research",
            Domain::Business => "business",
            Domain::Culinary => "culinary",
            Domain::General => "general",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Domain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "travel" => Ok(Domain::Travel),
            "research" => Ok(Domain::Research),
            "business" => Ok(Domain::Business),
            "culinary" => Ok(Domain::Culinary),
            "general" => Ok(Domain::General),
            other => Err(format!(
                "unknown domain '{other}' (expected travel, research, \
                 business, culinary, or general)"
            )),
        }
    }
}
