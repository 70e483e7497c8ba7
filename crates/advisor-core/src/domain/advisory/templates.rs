//! Canned advisory content
//!
//! Fallback recommendations, strategy plans, the three-phase roadmap, ROI
//! bands and keyword patterns are data, not code. The built-in defaults can
//! be replaced section by section from a TOML file.

use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use super::extraction::{
    ComplexityLevel, ComplexityRating, ConfidenceScores, ImplementationCosts,
    ImplementationRoadmap, PainPoint, PainPointCategory, PaybackAnalysis, ProjectedBenefits,
    ResolutionWindow, RoadmapAction, RoadmapPhase, RoiAnalysis, Severity, SkillLevel, Solution,
    Tool, UrgencyAssessment,
};
use super::model::{
    AdvisoryRecommendation, ImplementationPhase, ImplementationPlan, PainPointSummary,
    RoiProjection, SolutionSummary, ToolSummary, Urgency,
};

/// All editable advisory content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisoryTemplates {
    /// Returned when inference fails or its response cannot be parsed
    pub fallback_recommendation: RecommendationTemplate,
    /// Plan, ROI and next steps attached to tool suggestions
    pub tool_plan: PlanTemplate,
    /// Defaults for sections an implementation plan response leaves out
    pub implementation_plan: PlanTemplate,
    pub roadmap: ImplementationRoadmap,
    pub roi_analysis: RoiAnalysis,
    /// Keyword patterns that flag pain points in documents
    pub pain_patterns: Vec<PainPattern>,
    /// Used when the document analysis response cannot be parsed
    pub basic_analysis: AnalysisSeed,
    /// Used when document analysis fails outright
    pub fallback_extraction: FallbackExtractionTemplate,
}

/// Confidence reported by the canned recommendation, whatever the template says
pub const FALLBACK_CONFIDENCE: u8 = 70;

/// Complete canned recommendation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationTemplate {
    pub pain_points: Vec<PainPointSummary>,
    pub solutions: Vec<SolutionSummary>,
    pub tools: Vec<ToolSummary>,
    pub implementation_plan: ImplementationPlan,
    pub roi_projection: RoiProjection,
    pub next_steps: Vec<String>,
}

impl RecommendationTemplate {
    pub fn render(&self, query: &str, industry: Option<&str>) -> AdvisoryRecommendation {
        AdvisoryRecommendation {
            query: query.to_string(),
            industry: industry.map(str::to_string),
            pain_points_identified: self.pain_points.clone(),
            recommended_solutions: self.solutions.clone(),
            suggested_tools: self.tools.clone(),
            implementation_plan: self.implementation_plan.clone(),
            roi_projection: self.roi_projection.clone(),
            next_steps: self.next_steps.clone(),
            confidence_score: FALLBACK_CONFIDENCE,
            error: None,
        }
    }
}

/// Plan sections filled in around a strategy's own findings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanTemplate {
    pub implementation_plan: ImplementationPlan,
    pub roi_projection: RoiProjection,
    pub next_steps: Vec<String>,
    pub confidence_score: u8,
}

/// Keyword pattern that flags a pain point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PainPattern {
    /// snake_case key; the pain point name is its title-cased form
    pub key: String,
    pub keywords: Vec<String>,
    pub category: PainPointCategory,
    pub severity: Severity,
}

impl PainPattern {
    pub fn new(
        key: impl Into<String>,
        keywords: &[&str],
        category: PainPointCategory,
        severity: Severity,
    ) -> Self {
        Self {
            key: key.into(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            category,
            severity,
        }
    }

    /// Keywords present in already-lowercased text
    pub fn matches<'a>(&'a self, lower_text: &str) -> Vec<&'a str> {
        self.keywords
            .iter()
            .filter(|keyword| lower_text.contains(keyword.to_lowercase().as_str()))
            .map(String::as_str)
            .collect()
    }
}

/// Minimal analysis used in place of an unusable inference response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSeed {
    pub pain_points: Vec<PainPoint>,
    pub solutions: Vec<Solution>,
    pub tools: Vec<Tool>,
    pub overall_confidence: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FallbackExtractionTemplate {
    pub pain_points: Vec<PainPoint>,
    pub solutions: Vec<Solution>,
    pub tools: Vec<Tool>,
    pub confidence_scores: ConfidenceScores,
    pub urgency_assessment: UrgencyAssessment,
    pub complexity_rating: ComplexityRating,
}

impl AdvisoryTemplates {
    /// Load templates from a TOML file; missing sections keep their defaults
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read templates file: {}", path.display()))?;
        let templates: AdvisoryTemplates = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse templates file: {}", path.display()))?;
        Ok(templates)
    }

    /// Render as TOML, e.g. to seed a custom templates file
    pub fn to_toml(&self) -> anyhow::Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize templates")
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for AdvisoryTemplates {
    fn default() -> Self {
        Self {
            fallback_recommendation: default_fallback_recommendation(),
            tool_plan: default_tool_plan(),
            implementation_plan: default_implementation_plan(),
            roadmap: default_roadmap(),
            roi_analysis: default_roi_analysis(),
            pain_patterns: default_pain_patterns(),
            basic_analysis: default_basic_analysis(),
            fallback_extraction: default_fallback_extraction(),
        }
    }
}

fn default_fallback_recommendation() -> RecommendationTemplate {
    RecommendationTemplate {
        pain_points: vec![PainPointSummary {
            name: "Business Challenge Identified".to_string(),
            severity: "medium".to_string(),
            cost_impact: "Varies by situation".to_string(),
        }],
        solutions: vec![SolutionSummary {
            name: "Process Analysis and Improvement".to_string(),
            solution_type: "process".to_string(),
            roi: "150-300%".to_string(),
            timeline: "4-12 weeks".to_string(),
        }],
        tools: vec![ToolSummary {
            name: "Business Process Analysis".to_string(),
            vendor: "Various".to_string(),
            cost: "Low to Medium".to_string(),
            complexity: "moderate".to_string(),
        }],
        implementation_plan: ImplementationPlan {
            phases: vec![ImplementationPhase {
                name: "Assessment".to_string(),
                duration: "2 weeks".to_string(),
                activities: strings(&["Current state analysis", "Problem identification"]),
                deliverables: strings(&["Assessment report"]),
            }],
            total_timeline: "8-12 weeks".to_string(),
            success_factors: strings(&["Clear objectives", "Stakeholder buy-in"]),
            risk_factors: strings(&["Resource constraints", "Change resistance"]),
        },
        roi_projection: RoiProjection {
            implementation_cost: "$2,000-15,000".to_string(),
            annual_savings: "$10,000-50,000".to_string(),
            payback_period: "3-6 months".to_string(),
            three_year_roi: "200-400%".to_string(),
        },
        next_steps: strings(&[
            "Define specific objectives",
            "Conduct detailed assessment",
            "Develop action plan",
        ]),
    }
}

fn default_tool_plan() -> PlanTemplate {
    PlanTemplate {
        implementation_plan: ImplementationPlan {
            phases: Vec::new(),
            total_timeline: "2-8 weeks".to_string(),
            success_factors: strings(&["Proper training", "Data migration", "User adoption"]),
            risk_factors: strings(&["Integration challenges", "Learning curve", "Cost overruns"]),
        },
        roi_projection: RoiProjection {
            implementation_cost: "Varies by tool selection".to_string(),
            annual_savings: "Tool-dependent".to_string(),
            payback_period: "3-12 months".to_string(),
            three_year_roi: "150-400%".to_string(),
        },
        next_steps: strings(&[
            "Evaluate top 3 tools",
            "Request demos",
            "Check integration requirements",
        ]),
        confidence_score: 80,
    }
}

fn default_implementation_plan() -> PlanTemplate {
    PlanTemplate {
        implementation_plan: ImplementationPlan {
            phases: vec![ImplementationPhase {
                name: "Discovery & Planning".to_string(),
                duration: "1-2 weeks".to_string(),
                activities: strings(&[
                    "Requirements gathering",
                    "Stakeholder interviews",
                    "Solution design",
                ]),
                deliverables: strings(&[
                    "Requirements document",
                    "Implementation plan",
                    "Resource allocation",
                ]),
            }],
            total_timeline: "8-16 weeks".to_string(),
            success_factors: strings(&[
                "Executive sponsorship",
                "Clear communication",
                "Proper training",
            ]),
            risk_factors: strings(&["Scope creep", "Resource constraints", "User resistance"]),
        },
        roi_projection: RoiProjection {
            implementation_cost: "$5,000-25,000".to_string(),
            annual_savings: "$15,000-75,000".to_string(),
            payback_period: "4-8 months".to_string(),
            three_year_roi: "300-500%".to_string(),
        },
        next_steps: strings(&[
            "Form project team",
            "Secure budget approval",
            "Begin discovery phase",
        ]),
        confidence_score: 85,
    }
}

fn roadmap_phase(
    timeline: &str,
    focus: &str,
    action: RoadmapAction,
    success_metrics: &[&str],
) -> RoadmapPhase {
    RoadmapPhase {
        timeline: timeline.to_string(),
        focus: focus.to_string(),
        actions: vec![action],
        success_metrics: strings(success_metrics),
    }
}

fn roadmap_action(action: &str, tools: &[&str], timeline: &str, cost: &str, impact: &str) -> RoadmapAction {
    RoadmapAction {
        action: action.to_string(),
        tools: strings(tools),
        timeline: timeline.to_string(),
        cost: cost.to_string(),
        expected_impact: impact.to_string(),
    }
}

fn default_roadmap() -> ImplementationRoadmap {
    ImplementationRoadmap {
        phase_1_quick_wins: roadmap_phase(
            "Weeks 1-4",
            "Immediate impact with minimal investment",
            roadmap_action(
                "Deploy free automation tools",
                &["Zapier Free", "Google Workspace"],
                "Week 1-2",
                "$0-50",
                "15-25% time savings",
            ),
            &["Time saved per week", "Task completion rate"],
        ),
        phase_2_foundation: roadmap_phase(
            "Weeks 5-16",
            "Core system implementation",
            roadmap_action(
                "Advanced automation deployment",
                &["Zapier Professional"],
                "Week 5-10",
                "$200-800/month",
                "40-60% reduction in manual work",
            ),
            &["Process automation percentage", "Efficiency gains"],
        ),
        phase_3_optimization: roadmap_phase(
            "Weeks 17-26",
            "Advanced analytics and optimization",
            roadmap_action(
                "Business intelligence implementation",
                &["Power BI", "Google Analytics"],
                "Week 17-22",
                "$200-1000/month",
                "Data-driven decision making",
            ),
            &["ROI achievement", "Business growth"],
        ),
    }
}

fn default_roi_analysis() -> RoiAnalysis {
    RoiAnalysis {
        implementation_costs: ImplementationCosts {
            technology: "$3,000-12,000".to_string(),
            training: "$1,500-5,000".to_string(),
            consulting: "$2,000-8,000".to_string(),
            total_initial: "$6,500-25,000".to_string(),
        },
        projected_benefits: ProjectedBenefits {
            annual_labor_savings: "$20,000-80,000".to_string(),
            productivity_gains: "$15,000-60,000".to_string(),
            revenue_increase: "$10,000-50,000".to_string(),
            total_annual_benefit: "$45,000-190,000".to_string(),
        },
        payback_analysis: PaybackAnalysis {
            payback_period: "3-8 months".to_string(),
            year_1_roi: "200-500%".to_string(),
            year_3_roi: "400-1000%".to_string(),
        },
    }
}

fn default_pain_patterns() -> Vec<PainPattern> {
    vec![
        PainPattern::new(
            "manual_processes",
            &["manual", "spreadsheet", "paper", "email"],
            PainPointCategory::Operational,
            Severity::High,
        ),
        PainPattern::new(
            "communication_issues",
            &["miscommunication", "missed", "confusion"],
            PainPointCategory::Operational,
            Severity::Medium,
        ),
    ]
}

fn google_workspace() -> Tool {
    let mut tool = Tool::new("Google Workspace", "Google");
    tool.category = "productivity".to_string();
    tool.cost = "$6-18/user/month".to_string();
    tool.free_tier = true;
    tool.complexity = SkillLevel::Beginner;
    tool.smb_suitability = 9;
    tool.implementation_time = "1 week".to_string();
    tool.learning_curve = "Minimal".to_string();
    tool.key_features = strings(&["Email", "Documents"]);
    tool.use_cases = strings(&["Communication", "Collaboration"]);
    tool
}

fn default_basic_analysis() -> AnalysisSeed {
    let pain_point = PainPoint::new(
        "Process Optimization Opportunity",
        PainPointCategory::Operational,
        Severity::Medium,
    )
    .with_confidence(70.0);

    let solution = Solution::new("Business Process Review", "process")
        .addressing(vec![pain_point.name.clone()])
        .with_confidence(75.0);

    let mut tool = google_workspace().implementing(vec![solution.name.clone()]);
    tool.cost = "Low".to_string();

    AnalysisSeed {
        pain_points: vec![pain_point],
        solutions: vec![solution],
        tools: vec![tool],
        overall_confidence: 70.0,
    }
}

fn default_fallback_extraction() -> FallbackExtractionTemplate {
    let mut pain_point = PainPoint::new(
        "General Business Optimization Opportunity",
        PainPointCategory::Operational,
        Severity::Medium,
    )
    .with_symptoms(strings(&["Unspecified business challenges"]))
    .with_confidence(60.0);
    pain_point.urgency = ResolutionWindow::MediumTerm;

    let mut solution = Solution::new("Comprehensive Business Assessment", "process")
        .addressing(vec![pain_point.name.clone()])
        .with_confidence(70.0);
    solution.description = "Systematic review to identify opportunities".to_string();
    solution.implementation_difficulty = "easy".to_string();
    solution.time_to_value = "2-4 weeks".to_string();
    solution.typical_roi = "150-300%".to_string();
    solution.prerequisites = strings(&["Management commitment"]);
    solution.success_factors = strings(&["Clear objectives"]);
    solution.risk_factors = strings(&["Limited scope"]);

    let tool = google_workspace().implementing(vec![solution.name.clone()]);

    FallbackExtractionTemplate {
        pain_points: vec![pain_point],
        solutions: vec![solution],
        tools: vec![tool],
        confidence_scores: ConfidenceScores {
            overall: 65.0,
            pain_points: 60.0,
            solutions: 70.0,
            tools: 80.0,
        },
        urgency_assessment: UrgencyAssessment {
            level: Urgency::Medium,
            timeline: "1-3 months".to_string(),
            recommendation: "Plan systematic approach".to_string(),
        },
        complexity_rating: ComplexityRating {
            level: ComplexityLevel::Low,
            score: 1.5,
            reasoning: "Simple assessment approach".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_recommendation_defaults() {
        let rec = AdvisoryTemplates::default()
            .fallback_recommendation
            .render("anything", Some("retail"));

        assert_eq!(rec.confidence_score, 70);
        assert_eq!(rec.industry.as_deref(), Some("retail"));
        assert_eq!(rec.recommended_solutions.len(), 1);
        assert_eq!(rec.suggested_tools.len(), 1);
        assert_eq!(rec.implementation_plan.phases.len(), 1);
        assert_eq!(rec.implementation_plan.phases[0].name, "Assessment");
    }

    #[test]
    fn test_fallback_confidence_ignores_template_override() {
        let templates: AdvisoryTemplates = toml::from_str(
            r#"
[fallback_recommendation]
pain_points = []
solutions = []
tools = []
next_steps = ["Call us"]
confidence_score = 95

[fallback_recommendation.implementation_plan]
phases = []
total_timeline = "soon"
success_factors = []
risk_factors = []

[fallback_recommendation.roi_projection]
implementation_cost = "?"
annual_savings = "?"
payback_period = "?"
three_year_roi = "?"
"#,
        )
        .unwrap();

        let rec = templates.fallback_recommendation.render("q", None);
        assert_eq!(rec.next_steps, vec!["Call us"]);
        assert_eq!(rec.confidence_score, FALLBACK_CONFIDENCE);
    }

    #[test]
    fn test_roadmap_covers_26_weeks() {
        let roadmap = AdvisoryTemplates::default().roadmap;
        let timelines: Vec<&str> = roadmap.phases().iter().map(|p| p.timeline.as_str()).collect();
        assert_eq!(timelines, vec!["Weeks 1-4", "Weeks 5-16", "Weeks 17-26"]);
    }

    #[test]
    fn test_pattern_matching_is_case_insensitive_on_keywords() {
        let pattern = PainPattern::new("x", &["Spreadsheet"], PainPointCategory::Operational, Severity::High);
        assert_eq!(pattern.matches("we live in a spreadsheet"), vec!["Spreadsheet"]);
        assert!(pattern.matches("all digital").is_empty());
    }

    #[test]
    fn test_toml_roundtrip() {
        let templates = AdvisoryTemplates::default();
        let toml_text = templates.to_toml().unwrap();
        let parsed: AdvisoryTemplates = toml::from_str(&toml_text).unwrap();
        assert_eq!(parsed, templates);
    }

    #[test]
    fn test_partial_override_keeps_other_sections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("templates.toml");
        std::fs::write(
            &path,
            r#"
[[pain_patterns]]
key = "cash_flow_strain"
keywords = ["late payment", "overdue"]
category = "financial"
severity = "critical"
"#,
        )
        .unwrap();

        let templates = AdvisoryTemplates::load(&path).unwrap();
        assert_eq!(templates.pain_patterns.len(), 1);
        assert_eq!(templates.pain_patterns[0].severity, Severity::Critical);
        assert_eq!(templates.roadmap, AdvisoryTemplates::default().roadmap);
    }

    #[test]
    fn test_load_missing_file_fails() {
        assert!(AdvisoryTemplates::load(Path::new("/nonexistent/templates.toml")).is_err());
    }
}
