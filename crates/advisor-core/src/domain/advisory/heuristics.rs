//! Keyword heuristics used when inference is unavailable
//!
//! All matching is case-insensitive substring matching against fixed
//! vocabularies. Nothing here can fail.

use super::model::{AnalysisSource, Intent, QueryAnalysis, Urgency};

/// Intent triggers, checked in order; the first matching group wins
const INTENT_RULES: &[(Intent, &[&str])] = &[
    (Intent::IdentifyPainPoints, &["problem", "issue", "challenge"]),
    (Intent::RequestSolutions, &["how to", "solution", "fix"]),
    (Intent::FindTools, &["tool", "software", "system"]),
    (Intent::CostAnalysis, &["cost", "budget", "roi"]),
    (Intent::ImplementationPlan, &["implement", "plan", "steps"]),
];

const TOPIC_TERMS: &[&str] = &[
    "customer service",
    "inventory",
    "cash flow",
    "efficiency",
    "quality",
    "scheduling",
    "communication",
    "automation",
    "training",
    "sales",
];

const INDUSTRY_HINT_TERMS: &[(&str, &[&str])] = &[
    ("restaurant", &["restaurant", "food", "dining", "kitchen", "menu"]),
    ("retail", &["retail", "store", "shop", "inventory", "sales"]),
    ("manufacturing", &["manufacturing", "production", "factory", "assembly"]),
    ("healthcare", &["healthcare", "medical", "patient", "clinic"]),
    ("professional_services", &["consulting", "legal", "accounting", "advisory"]),
];

/// Broader vocabulary for classifying whole documents
const DOCUMENT_INDUSTRY_TERMS: &[(&str, &[&str])] = &[
    ("restaurant", &["restaurant", "food", "dining", "kitchen", "menu", "chef"]),
    ("retail", &["retail", "store", "shop", "inventory", "merchandise", "sales"]),
    (
        "manufacturing",
        &["manufacturing", "production", "factory", "assembly", "quality control"],
    ),
    (
        "healthcare",
        &["healthcare", "medical", "patient", "clinic", "hospital", "treatment"],
    ),
    (
        "professional_services",
        &["consulting", "legal", "accounting", "advisory", "professional"],
    ),
    ("construction", &["construction", "building", "contractor", "site"]),
];

const CRITICAL_TERMS: &[&str] = &["urgent", "asap", "immediately", "crisis", "emergency"];
const HIGH_PRIORITY_TERMS: &[&str] = &["important", "priority", "soon", "quickly"];
const LOW_PRIORITY_TERMS: &[&str] = &["when possible", "eventually"];

const BUDGET_TERMS: &[&str] = &[
    "free",
    "low cost",
    "budget",
    "affordable",
    "cheap",
    "expensive",
    "investment",
    "roi",
    "return on investment",
];

/// Classify a query without inference. Always returns a fully populated analysis.
pub fn analyze_fallback(query: &str) -> QueryAnalysis {
    let lower = query.to_lowercase();

    QueryAnalysis {
        intent: classify_intent(&lower),
        extracted_topics: matching_terms(&lower, TOPIC_TERMS),
        industry_hints: INDUSTRY_HINT_TERMS
            .iter()
            .filter(|(_, terms)| contains_any(&lower, terms))
            .map(|(industry, _)| industry.to_string())
            .collect(),
        urgency: assess_urgency(&lower),
        budget_hints: matching_terms(&lower, BUDGET_TERMS),
        source: AnalysisSource::Heuristic,
    }
}

/// Pick the first intent whose trigger words appear in the text
pub fn classify_intent(text: &str) -> Intent {
    let lower = text.to_lowercase();
    INTENT_RULES
        .iter()
        .find(|(_, triggers)| contains_any(&lower, triggers))
        .map(|(intent, _)| *intent)
        .unwrap_or(Intent::GeneralAdvisory)
}

pub fn assess_urgency(text: &str) -> Urgency {
    let lower = text.to_lowercase();
    if contains_any(&lower, CRITICAL_TERMS) {
        Urgency::Critical
    } else if contains_any(&lower, HIGH_PRIORITY_TERMS) {
        Urgency::High
    } else if contains_any(&lower, LOW_PRIORITY_TERMS) {
        Urgency::Low
    } else {
        Urgency::Medium
    }
}

/// Best-guess industry for a document, if any keyword matches
pub fn detect_industry(document: &str) -> Option<&'static str> {
    let lower = document.to_lowercase();
    DOCUMENT_INDUSTRY_TERMS
        .iter()
        .find(|(_, terms)| contains_any(&lower, terms))
        .map(|(industry, _)| *industry)
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

fn matching_terms(haystack: &str, terms: &[&str]) -> Vec<String> {
    terms
        .iter()
        .filter(|term| haystack.contains(*term))
        .map(|term| term.to_string())
        .collect()
}
