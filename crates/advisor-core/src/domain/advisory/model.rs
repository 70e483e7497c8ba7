//! Query analysis and recommendation types

use serde::{Deserialize, Serialize};

/// What the user is asking for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    IdentifyPainPoints,
    RequestSolutions,
    FindTools,
    CostAnalysis,
    ImplementationPlan,
    GeneralAdvisory,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::IdentifyPainPoints => "identify_pain_points",
            Self::RequestSolutions => "request_solutions",
            Self::FindTools => "find_tools",
            Self::CostAnalysis => "cost_analysis",
            Self::ImplementationPlan => "implementation_plan",
            Self::GeneralAdvisory => "general_advisory",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "identify_pain_points" => Some(Self::IdentifyPainPoints),
            "request_solutions" => Some(Self::RequestSolutions),
            "find_tools" => Some(Self::FindTools),
            "cost_analysis" => Some(Self::CostAnalysis),
            "implementation_plan" => Some(Self::ImplementationPlan),
            "general_advisory" => Some(Self::GeneralAdvisory),
            _ => None,
        }
    }

    pub fn all() -> &'static [Intent] {
        &[
            Self::IdentifyPainPoints,
            Self::RequestSolutions,
            Self::FindTools,
            Self::CostAnalysis,
            Self::ImplementationPlan,
            Self::GeneralAdvisory,
        ]
    }

    /// One-line description used in the classification prompt
    pub fn description(&self) -> &'static str {
        match self {
            Self::IdentifyPainPoints => "user wants to understand their business problems",
            Self::RequestSolutions => "user wants solutions to specific problems",
            Self::FindTools => "user wants software or tool recommendations",
            Self::CostAnalysis => "user wants cost or ROI information",
            Self::ImplementationPlan => "user wants step-by-step implementation guidance",
            Self::GeneralAdvisory => "general business advice",
        }
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How pressing the user's request is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Low,
    Medium,
    High,
    Critical,
}

impl Urgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            "critical" => Some(Self::Critical),
            _ => None,
        }
    }
}

impl std::fmt::Display for Urgency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where a query analysis came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisSource {
    Inference,
    Heuristic,
}

/// Intermediate classification of a free-text query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryAnalysis {
    pub intent: Intent,
    pub extracted_topics: Vec<String>,
    pub industry_hints: Vec<String>,
    pub urgency: Urgency,
    pub budget_hints: Vec<String>,
    pub source: AnalysisSource,
}

/// A pain point as summarized in a recommendation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PainPointSummary {
    pub name: String,
    pub severity: String,
    pub cost_impact: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolutionSummary {
    pub name: String,
    #[serde(rename = "type")]
    pub solution_type: String,
    pub roi: String,
    pub timeline: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSummary {
    pub name: String,
    pub vendor: String,
    pub cost: String,
    pub complexity: String,
}

/// One phase of a rollout plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImplementationPhase {
    pub name: String,
    pub duration: String,
    pub activities: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub deliverables: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImplementationPlan {
    pub phases: Vec<ImplementationPhase>,
    pub total_timeline: String,
    #[serde(default)]
    pub success_factors: Vec<String>,
    #[serde(default)]
    pub risk_factors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoiProjection {
    pub implementation_cost: String,
    pub annual_savings: String,
    pub payback_period: String,
    pub three_year_roi: String,
}

impl RoiProjection {
    /// Projection used when nothing could be calculated
    pub fn unavailable() -> Self {
        let text = "Unable to calculate".to_string();
        Self {
            implementation_cost: text.clone(),
            annual_savings: text.clone(),
            payback_period: text.clone(),
            three_year_roi: text,
        }
    }
}

/// Response to a free-text advisory query.
///
/// `confidence_score` is the synthesis step's own reliability signal: 0 for
/// a hard failure, 70 for the deterministic fallback, higher when backed by
/// inference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvisoryRecommendation {
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    pub pain_points_identified: Vec<PainPointSummary>,
    pub recommended_solutions: Vec<SolutionSummary>,
    pub suggested_tools: Vec<ToolSummary>,
    pub implementation_plan: ImplementationPlan,
    pub roi_projection: RoiProjection,
    pub next_steps: Vec<String>,
    pub confidence_score: u8,
    /// Set only on hard-failure responses
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AdvisoryRecommendation {
    /// Zero-confidence response carrying the failure cause and remediation
    pub fn error(query: impl Into<String>, cause: &str) -> Self {
        Self {
            query: query.into(),
            industry: None,
            pain_points_identified: Vec::new(),
            recommended_solutions: Vec::new(),
            suggested_tools: Vec::new(),
            implementation_plan: ImplementationPlan {
                phases: Vec::new(),
                total_timeline: "Unable to determine".to_string(),
                success_factors: Vec::new(),
                risk_factors: vec![format!("Analysis error: {}", cause)],
            },
            roi_projection: RoiProjection::unavailable(),
            next_steps: vec![
                "Please rephrase your question".to_string(),
                "Contact support if issue persists".to_string(),
            ],
            confidence_score: 0,
            error: Some(cause.to_string()),
        }
    }

    /// Whether this is a hard-failure response
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_roundtrip() {
        for intent in Intent::all() {
            assert_eq!(Intent::parse(intent.as_str()), Some(*intent));
            let json = serde_json::to_string(intent).unwrap();
            assert_eq!(json, format!("\"{}\"", intent.as_str()));
        }
        assert_eq!(Intent::parse("unknown"), None);
    }

    #[test]
    fn test_urgency_ordering() {
        assert!(Urgency::Critical > Urgency::High);
        assert!(Urgency::Low < Urgency::Medium);
        assert_eq!(Urgency::parse("HIGH"), Some(Urgency::High));
    }

    #[test]
    fn test_error_recommendation_shape() {
        let rec = AdvisoryRecommendation::error("why?", "strategy table has no route");
        assert!(rec.is_error());
        assert_eq!(rec.error.as_deref(), Some("strategy table has no route"));
        assert!(rec.industry.is_none());
        assert_eq!(rec.implementation_plan.total_timeline, "Unable to determine");
        assert_eq!(
            rec.implementation_plan.risk_factors,
            vec!["Analysis error: strategy table has no route".to_string()]
        );
        assert_eq!(rec.roi_projection.three_year_roi, "Unable to calculate");
        assert_eq!(rec.next_steps.len(), 2);
    }

    #[test]
    fn test_recommendation_serializes_solution_type_as_type() {
        let solution = SolutionSummary {
            name: "POS integration".into(),
            solution_type: "technology".into(),
            roi: "200%".into(),
            timeline: "4 weeks".into(),
        };
        let json = serde_json::to_value(&solution).unwrap();
        assert_eq!(json["type"], "technology");
    }
}
