//! Business facts extracted from documents
//!
//! Pain points, solutions and tools are the domain facts that become nodes in
//! the knowledge graph. The remaining types are the secondary artifacts of an
//! extraction: roadmap, ROI bands, urgency and complexity.

use serde::{Deserialize, Serialize};

use super::model::Urgency;
use super::parse::{Validate, confidence, require_name};
use crate::error::{Error, Result};

macro_rules! text_enum {
    ($name:ident { $($variant:ident => $text:literal $(| $alias:literal)*),+ $(,)? }) => {
        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }

            /// Case-insensitive parse, accepting spaces or dashes for underscores
            pub fn parse(s: &str) -> Option<Self> {
                let key = s.trim().to_lowercase().replace([' ', '-'], "_");
                match key.as_str() {
                    $($text $(| $alias)* => Some(Self::$variant),)+
                    _ => None,
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }

        impl TryFrom<String> for $name {
            type Error = String;

            fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
                Self::parse(&value)
                    .ok_or_else(|| format!("unknown {} '{}'", stringify!($name), value))
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum PainPointCategory {
    Operational,
    Financial,
    Customer,
    Compliance,
    Strategic,
    IndustrySpecific,
}

text_enum!(PainPointCategory {
    Operational => "operational",
    Financial => "financial",
    Customer => "customer",
    Compliance => "compliance",
    Strategic => "strategic",
    IndustrySpecific => "industry_specific",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

text_enum!(Severity {
    Low => "low",
    Medium => "medium" | "moderate",
    High => "high",
    Critical => "critical",
});

/// How soon a pain point should be addressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum ResolutionWindow {
    Immediate,
    ShortTerm,
    MediumTerm,
    LongTerm,
}

text_enum!(ResolutionWindow {
    Immediate => "immediate",
    ShortTerm => "short_term",
    MediumTerm => "medium_term",
    LongTerm => "long_term",
});

/// Skill needed to adopt a tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum SkillLevel {
    Beginner,
    Intermediate,
    Advanced,
}

text_enum!(SkillLevel {
    Beginner => "beginner" | "low" | "easy",
    Intermediate => "intermediate" | "medium" | "moderate",
    Advanced => "advanced" | "high" | "hard",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum ComplexityLevel {
    Low,
    Medium,
    High,
}

text_enum!(ComplexityLevel {
    Low => "low",
    Medium => "medium",
    High => "high",
});

fn to_be_determined() -> String {
    "To be determined".to_string()
}

fn medium_term() -> ResolutionWindow {
    ResolutionWindow::MediumTerm
}

fn default_pain_point_confidence() -> f32 {
    70.0
}

fn default_solution_confidence() -> f32 {
    75.0
}

fn default_tool_confidence() -> f32 {
    70.0
}

fn unknown_vendor() -> String {
    "Unknown".to_string()
}

fn default_smb_suitability() -> u8 {
    5
}

/// Models often answer with fractions like 8.5; round and clamp into 0-10
fn suitability_score<'de, D>(deserializer: D) -> std::result::Result<u8, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    if !value.is_finite() {
        return Err(serde::de::Error::custom("smb_suitability must be a finite number"));
    }
    Ok(value.round().clamp(0.0, 10.0) as u8)
}

fn intermediate() -> SkillLevel {
    SkillLevel::Intermediate
}

/// A business problem observed in a document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PainPoint {
    pub name: String,
    pub category: PainPointCategory,
    #[serde(default)]
    pub industry_specific: bool,
    pub severity: Severity,
    #[serde(default)]
    pub symptoms: Vec<String>,
    #[serde(default = "to_be_determined")]
    pub cost_impact: String,
    #[serde(default)]
    pub evidence: Vec<String>,
    #[serde(default = "default_pain_point_confidence")]
    pub confidence: f32,
    #[serde(default = "medium_term")]
    pub urgency: ResolutionWindow,
}

impl PainPoint {
    pub fn new(name: impl Into<String>, category: PainPointCategory, severity: Severity) -> Self {
        Self {
            name: name.into(),
            category,
            industry_specific: false,
            severity,
            symptoms: Vec::new(),
            cost_impact: to_be_determined(),
            evidence: Vec::new(),
            confidence: default_pain_point_confidence(),
            urgency: medium_term(),
        }
    }

    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = confidence.clamp(0.0, 100.0);
        self
    }

    pub fn with_symptoms(mut self, symptoms: Vec<String>) -> Self {
        self.symptoms = symptoms;
        self
    }

    pub fn with_evidence(mut self, evidence: Vec<String>) -> Self {
        self.evidence = evidence;
        self
    }

    pub fn with_cost_impact(mut self, cost_impact: impl Into<String>) -> Self {
        self.cost_impact = cost_impact.into();
        self
    }
}

/// A remedy for one or more pain points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    pub name: String,
    #[serde(rename = "type", default = "process_type")]
    pub solution_type: String,
    #[serde(default)]
    pub description: String,
    /// Names of the pain points this solution addresses
    #[serde(default)]
    pub addresses_pain_points: Vec<String>,
    #[serde(default)]
    pub implementation_difficulty: String,
    #[serde(default)]
    pub time_to_value: String,
    #[serde(default)]
    pub typical_roi: String,
    #[serde(default)]
    pub prerequisites: Vec<String>,
    #[serde(default)]
    pub success_factors: Vec<String>,
    #[serde(default)]
    pub risk_factors: Vec<String>,
    #[serde(default = "default_solution_confidence")]
    pub confidence: f32,
}

fn process_type() -> String {
    "process".to_string()
}

impl Solution {
    pub fn new(name: impl Into<String>, solution_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            solution_type: solution_type.into(),
            description: String::new(),
            addresses_pain_points: Vec::new(),
            implementation_difficulty: String::new(),
            time_to_value: String::new(),
            typical_roi: String::new(),
            prerequisites: Vec::new(),
            success_factors: Vec::new(),
            risk_factors: Vec::new(),
            confidence: default_solution_confidence(),
        }
    }

    pub fn addressing(mut self, pain_points: Vec<String>) -> Self {
        self.addresses_pain_points = pain_points;
        self
    }

    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = confidence.clamp(0.0, 100.0);
        self
    }
}

/// A product that implements one or more solutions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    pub name: String,
    #[serde(default = "unknown_vendor")]
    pub vendor: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub cost: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_range: Option<String>,
    #[serde(default)]
    pub free_tier: bool,
    #[serde(default = "intermediate")]
    pub complexity: SkillLevel,
    /// 1-10 fit for small and medium businesses
    #[serde(default = "default_smb_suitability", deserialize_with = "suitability_score")]
    pub smb_suitability: u8,
    #[serde(default)]
    pub implementation_time: String,
    #[serde(default)]
    pub learning_curve: String,
    #[serde(default)]
    pub key_features: Vec<String>,
    #[serde(default)]
    pub use_cases: Vec<String>,
    /// Names of the solutions this tool implements
    #[serde(default)]
    pub implements_solutions: Vec<String>,
    #[serde(default = "default_tool_confidence")]
    pub confidence: f32,
}

impl Tool {
    pub fn new(name: impl Into<String>, vendor: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            vendor: vendor.into(),
            category: String::new(),
            cost: String::new(),
            cost_range: None,
            free_tier: false,
            complexity: intermediate(),
            smb_suitability: default_smb_suitability(),
            implementation_time: String::new(),
            learning_curve: String::new(),
            key_features: Vec::new(),
            use_cases: Vec::new(),
            implements_solutions: Vec::new(),
            confidence: default_tool_confidence(),
        }
    }

    pub fn implementing(mut self, solutions: Vec<String>) -> Self {
        self.implements_solutions = solutions;
        self
    }

    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = confidence.clamp(0.0, 100.0);
        self
    }

    /// Price text for display, preferring the explicit range
    pub fn price(&self) -> &str {
        self.cost_range.as_deref().unwrap_or(&self.cost)
    }
}

impl Validate for PainPoint {
    fn validate(&self) -> Result<()> {
        require_name(&self.name, "pain point")?;
        confidence(f64::from(self.confidence), "pain point confidence")?;
        Ok(())
    }
}

impl Validate for Solution {
    fn validate(&self) -> Result<()> {
        require_name(&self.name, "solution")?;
        confidence(f64::from(self.confidence), "solution confidence")?;
        Ok(())
    }
}

impl Validate for Tool {
    fn validate(&self) -> Result<()> {
        require_name(&self.name, "tool")?;
        confidence(f64::from(self.confidence), "tool confidence")?;
        if self.smb_suitability > 10 {
            return Err(Error::Parse(format!(
                "tool '{}' smb_suitability must be within 0-10, got {}",
                self.name, self.smb_suitability
            )));
        }
        Ok(())
    }
}

/// Per-section reliability of an extraction, each 0-100
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceScores {
    pub overall: f32,
    pub pain_points: f32,
    pub solutions: f32,
    pub tools: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadmapAction {
    pub action: String,
    pub tools: Vec<String>,
    pub timeline: String,
    pub cost: String,
    pub expected_impact: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadmapPhase {
    pub timeline: String,
    pub focus: String,
    pub actions: Vec<RoadmapAction>,
    pub success_metrics: Vec<String>,
}

/// Three-phase rollout: quick wins, foundation, optimization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImplementationRoadmap {
    pub phase_1_quick_wins: RoadmapPhase,
    pub phase_2_foundation: RoadmapPhase,
    pub phase_3_optimization: RoadmapPhase,
}

impl ImplementationRoadmap {
    pub fn phases(&self) -> [&RoadmapPhase; 3] {
        [
            &self.phase_1_quick_wins,
            &self.phase_2_foundation,
            &self.phase_3_optimization,
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImplementationCosts {
    pub technology: String,
    pub training: String,
    pub consulting: String,
    pub total_initial: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectedBenefits {
    pub annual_labor_savings: String,
    pub productivity_gains: String,
    pub revenue_increase: String,
    pub total_annual_benefit: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaybackAnalysis {
    pub payback_period: String,
    pub year_1_roi: String,
    pub year_3_roi: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoiAnalysis {
    pub implementation_costs: ImplementationCosts,
    pub projected_benefits: ProjectedBenefits,
    pub payback_analysis: PaybackAnalysis,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrgencyAssessment {
    pub level: Urgency,
    pub timeline: String,
    pub recommendation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplexityRating {
    pub level: ComplexityLevel,
    pub score: f32,
    pub reasoning: String,
}

/// Everything learned from one document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessAdvisoryExtraction {
    pub pain_points: Vec<PainPoint>,
    pub solutions: Vec<Solution>,
    pub tools: Vec<Tool>,
    pub industry: String,
    pub confidence_scores: ConfidenceScores,
    pub implementation_roadmap: ImplementationRoadmap,
    pub roi_analysis: RoiAnalysis,
    pub urgency_assessment: UrgencyAssessment,
    pub complexity_rating: ComplexityRating,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enums_parse_leniently_but_reject_unknown() {
        assert_eq!(Severity::parse("High"), Some(Severity::High));
        assert_eq!(Severity::parse("moderate"), Some(Severity::Medium));
        assert_eq!(
            PainPointCategory::parse("Industry Specific"),
            Some(PainPointCategory::IndustrySpecific)
        );
        assert_eq!(ResolutionWindow::parse("short-term"), Some(ResolutionWindow::ShortTerm));
        assert_eq!(SkillLevel::parse("Low"), Some(SkillLevel::Beginner));
        assert_eq!(Severity::parse("apocalyptic"), None);
    }

    #[test]
    fn test_pain_point_defaults_on_deserialize() {
        let point: PainPoint = serde_json::from_str(
            r#"{"name": "Late deliveries", "category": "Operational", "severity": "HIGH"}"#,
        )
        .unwrap();

        assert_eq!(point.category, PainPointCategory::Operational);
        assert_eq!(point.severity, Severity::High);
        assert_eq!(point.confidence, 70.0);
        assert_eq!(point.cost_impact, "To be determined");
        assert_eq!(point.urgency, ResolutionWindow::MediumTerm);
    }

    #[test]
    fn test_pain_point_requires_category() {
        let result = serde_json::from_str::<PainPoint>(r#"{"name": "x", "severity": "low"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_enum_serializes_snake_case() {
        let json = serde_json::to_string(&ResolutionWindow::MediumTerm).unwrap();
        assert_eq!(json, "\"medium_term\"");
    }

    #[test]
    fn test_tool_defaults_and_validation() {
        let tool: Tool = serde_json::from_str(r#"{"name": "Toast POS"}"#).unwrap();
        assert_eq!(tool.vendor, "Unknown");
        assert_eq!(tool.smb_suitability, 5);
        assert_eq!(tool.confidence, 70.0);
        assert!(tool.validate().is_ok());

        let mut bad = tool.clone();
        bad.smb_suitability = 11;
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_fractional_smb_suitability_is_rounded() {
        let score = |raw: &str| {
            serde_json::from_str::<Tool>(&format!(r#"{{"name": "Toast POS", "smb_suitability": {}}}"#, raw))
                .map(|tool| tool.smb_suitability)
        };

        assert_eq!(score("8.5").unwrap(), 9);
        assert_eq!(score("7.2").unwrap(), 7);
        assert_eq!(score("14").unwrap(), 10);
        assert_eq!(score("-2").unwrap(), 0);
        assert!(score("\"high\"").is_err());
    }

    #[test]
    fn test_tool_price_prefers_range() {
        let mut tool = Tool::new("Zapier", "Zapier");
        tool.cost = "$20/month".into();
        assert_eq!(tool.price(), "$20/month");
        tool.cost_range = Some("$0-50/month".into());
        assert_eq!(tool.price(), "$0-50/month");
    }

    #[test]
    fn test_builders_clamp_confidence() {
        let point = PainPoint::new("x", PainPointCategory::Financial, Severity::Low).with_confidence(140.0);
        assert_eq!(point.confidence, 100.0);
        let solution = Solution::new("y", "technology").with_confidence(-3.0);
        assert_eq!(solution.confidence, 0.0);
    }
}
