//! Query intent classification

use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, warn};

use super::heuristics::analyze_fallback;
use super::model::{AnalysisSource, Intent, QueryAnalysis, Urgency};
use super::parse::{Validate, parse_response};
use super::prompts::classification_prompt;
use crate::error::{Error, Result};
use crate::gateway::InferenceGateway;

/// Classifies free-text queries, falling back to keyword heuristics
#[derive(Clone)]
pub struct QueryAnalyzer {
    gateway: Arc<dyn InferenceGateway>,
}

impl QueryAnalyzer {
    pub fn new(gateway: Arc<dyn InferenceGateway>) -> Self {
        Self { gateway }
    }

    /// Classify a query. Never fails: inference or parse errors yield the
    /// heuristic analysis instead.
    pub async fn analyze(&self, query: &str) -> QueryAnalysis {
        match self.classify(query).await {
            Ok(analysis) => {
                debug!(intent = %analysis.intent, urgency = %analysis.urgency, "Query classified");
                analysis
            }
            Err(e) => {
                warn!(error = %e, gateway = self.gateway.name(), "Query classification failed, using heuristics");
                analyze_fallback(query)
            }
        }
    }

    /// Classify through the gateway only
    pub async fn classify(&self, query: &str) -> Result<QueryAnalysis> {
        let response = self.gateway.submit(&classification_prompt(query)).await?;
        let parsed: ClassificationResponse = parse_response(&response)?;
        parsed.into_analysis()
    }
}

#[derive(Debug, Deserialize)]
struct ClassificationResponse {
    intent: String,
    #[serde(default)]
    extracted_topics: Vec<String>,
    #[serde(default)]
    industry_hints: Vec<String>,
    urgency: String,
    #[serde(default)]
    budget_hints: Vec<String>,
}

impl Validate for ClassificationResponse {
    fn validate(&self) -> Result<()> {
        if Intent::parse(&self.intent).is_none() {
            return Err(Error::Parse(format!("unknown intent '{}'", self.intent)));
        }
        if Urgency::parse(&self.urgency).is_none() {
            return Err(Error::Parse(format!("unknown urgency '{}'", self.urgency)));
        }
        Ok(())
    }
}

impl ClassificationResponse {
    fn into_analysis(self) -> Result<QueryAnalysis> {
        let intent = Intent::parse(&self.intent)
            .ok_or_else(|| Error::Parse(format!("unknown intent '{}'", self.intent)))?;
        let urgency = Urgency::parse(&self.urgency)
            .ok_or_else(|| Error::Parse(format!("unknown urgency '{}'", self.urgency)))?;

        Ok(QueryAnalysis {
            intent,
            extracted_topics: clean(self.extracted_topics),
            industry_hints: clean(self.industry_hints),
            urgency,
            budget_hints: clean(self.budget_hints),
            source: AnalysisSource::Inference,
        })
    }
}

fn clean(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}
