//! Document knowledge extraction
//!
//! Combines an inference-backed read of the document with a keyword pattern
//! scan, then attaches roadmap, ROI, urgency and complexity artifacts.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;
use tracing::{info, warn};

use super::extraction::{
    BusinessAdvisoryExtraction, ComplexityLevel, ComplexityRating, ConfidenceScores, PainPoint,
    Solution, Tool, UrgencyAssessment,
};
use super::heuristics::detect_industry;
use super::model::Urgency;
use super::normalize::{normalize, title_case};
use super::parse::{Validate, confidence, parse_response};
use super::prompts::document_analysis_prompt;
use super::templates::AdvisoryTemplates;
use crate::error::Result;
use crate::gateway::InferenceGateway;

const URGENT_TERMS: &[&str] = &["urgent", "critical", "emergency", "asap"];

const DEFAULT_OVERALL_CONFIDENCE: f32 = 75.0;

/// Extracts pain points, solutions and tools from business documents
#[derive(Clone)]
pub struct EnhancedBusinessAnalyzer {
    gateway: Arc<dyn InferenceGateway>,
    templates: Arc<AdvisoryTemplates>,
    dedupe_pain_points: bool,
}

/// Pain points, solutions and tools read from a document
#[derive(Debug, Clone, PartialEq)]
struct DocumentAnalysis {
    pain_points: Vec<PainPoint>,
    solutions: Vec<Solution>,
    tools: Vec<Tool>,
    overall_confidence: Option<f32>,
}

impl EnhancedBusinessAnalyzer {
    pub fn new(gateway: Arc<dyn InferenceGateway>) -> Self {
        Self {
            gateway,
            templates: Arc::new(AdvisoryTemplates::default()),
            dedupe_pain_points: false,
        }
    }

    pub fn with_templates(mut self, templates: Arc<AdvisoryTemplates>) -> Self {
        self.templates = templates;
        self
    }

    /// Merge pain points with the same normalized name, keeping the highest
    /// confidence. Off by default.
    pub fn with_dedupe(mut self, dedupe: bool) -> Self {
        self.dedupe_pain_points = dedupe;
        self
    }

    /// Analyze a document. Never fails: an unusable inference response is
    /// replaced by a basic analysis, and any other failure yields the
    /// fallback extraction.
    pub async fn extract_business_advisory_knowledge(
        &self,
        document: &str,
        file_name: &str,
        industry: Option<&str>,
    ) -> BusinessAdvisoryExtraction {
        let industry = resolve_industry(document, industry);

        match self.extract(document, file_name, &industry).await {
            Ok(extraction) => {
                info!(
                    file = file_name,
                    industry = %extraction.industry,
                    pain_points = extraction.pain_points.len(),
                    solutions = extraction.solutions.len(),
                    tools = extraction.tools.len(),
                    "Document analysis complete"
                );
                extraction
            }
            Err(e) => {
                warn!(file = file_name, error = %e, "Document analysis failed, using fallback extraction");
                self.fallback_extraction(file_name, &industry)
            }
        }
    }

    async fn extract(
        &self,
        document: &str,
        file_name: &str,
        industry: &str,
    ) -> Result<BusinessAdvisoryExtraction> {
        let ai = self.ai_analysis(document, file_name, industry).await?;
        let patterns = self.pattern_analysis(document, file_name);
        let solutions_count = ai.solutions.len();

        let pain_points = if self.dedupe_pain_points {
            dedupe_by_name(ai.pain_points.into_iter().chain(patterns).collect())
        } else {
            ai.pain_points.into_iter().chain(patterns).collect()
        };

        Ok(BusinessAdvisoryExtraction {
            pain_points,
            solutions: ai.solutions,
            tools: ai.tools,
            industry: industry.to_string(),
            confidence_scores: ConfidenceScores {
                overall: ai.overall_confidence.unwrap_or(DEFAULT_OVERALL_CONFIDENCE),
                pain_points: 80.0,
                solutions: 75.0,
                tools: 70.0,
            },
            implementation_roadmap: self.templates.roadmap.clone(),
            roi_analysis: self.templates.roi_analysis.clone(),
            urgency_assessment: assess_document_urgency(document),
            complexity_rating: rate_complexity(solutions_count),
        })
    }

    async fn ai_analysis(
        &self,
        document: &str,
        file_name: &str,
        industry: &str,
    ) -> Result<DocumentAnalysis> {
        let prompt = document_analysis_prompt(document, file_name, Some(industry));
        let response = self.gateway.submit(&prompt).await?;

        match parse_response::<AnalysisResponse>(&response) {
            Ok(parsed) => Ok(parsed.into()),
            Err(e) => {
                warn!(file = file_name, error = %e, "Unusable document analysis response, using basic analysis");
                Ok(self.basic_analysis())
            }
        }
    }

    fn basic_analysis(&self) -> DocumentAnalysis {
        let seed = &self.templates.basic_analysis;
        DocumentAnalysis {
            pain_points: seed.pain_points.clone(),
            solutions: seed.solutions.clone(),
            tools: seed.tools.clone(),
            overall_confidence: Some(seed.overall_confidence),
        }
    }

    /// Pain points flagged by keyword patterns
    fn pattern_analysis(&self, document: &str, file_name: &str) -> Vec<PainPoint> {
        let lower = document.to_lowercase();

        self.templates
            .pain_patterns
            .iter()
            .filter_map(|pattern| {
                let hits = pattern.matches(&lower);
                if hits.is_empty() {
                    return None;
                }
                let confidence = (60 + 15 * hits.len()).min(95) as f32;
                let symptoms = hits.iter().map(|hit| format!("Mentions '{}'", hit)).collect();

                Some(
                    PainPoint::new(title_case(&pattern.key), pattern.category, pattern.severity)
                        .with_symptoms(symptoms)
                        .with_evidence(vec![file_name.to_string()])
                        .with_confidence(confidence),
                )
            })
            .collect()
    }

    fn fallback_extraction(&self, file_name: &str, industry: &str) -> BusinessAdvisoryExtraction {
        let fallback = &self.templates.fallback_extraction;

        let pain_points = fallback
            .pain_points
            .iter()
            .cloned()
            .map(|mut point| {
                if !point.evidence.iter().any(|e| e == file_name) {
                    point.evidence.push(file_name.to_string());
                }
                point
            })
            .collect();

        BusinessAdvisoryExtraction {
            pain_points,
            solutions: fallback.solutions.clone(),
            tools: fallback.tools.clone(),
            industry: industry.to_string(),
            confidence_scores: fallback.confidence_scores.clone(),
            implementation_roadmap: self.templates.roadmap.clone(),
            roi_analysis: self.templates.roi_analysis.clone(),
            urgency_assessment: fallback.urgency_assessment.clone(),
            complexity_rating: fallback.complexity_rating.clone(),
        }
    }
}

fn resolve_industry(document: &str, industry: Option<&str>) -> String {
    industry
        .map(str::trim)
        .filter(|industry| !industry.is_empty())
        .map(str::to_string)
        .or_else(|| detect_industry(document).map(str::to_string))
        .unwrap_or_else(|| "general".to_string())
}

/// Urgency of the document as a whole
pub fn assess_document_urgency(document: &str) -> UrgencyAssessment {
    let lower = document.to_lowercase();
    if URGENT_TERMS.iter().any(|term| lower.contains(term)) {
        UrgencyAssessment {
            level: Urgency::High,
            timeline: "2-4 weeks".to_string(),
            recommendation: "Prioritize high-impact solutions immediately".to_string(),
        }
    } else {
        UrgencyAssessment {
            level: Urgency::Medium,
            timeline: "1-3 months".to_string(),
            recommendation: "Plan systematic implementation with proper testing".to_string(),
        }
    }
}

/// Complexity from the number of proposed solutions
pub fn rate_complexity(solutions: usize) -> ComplexityRating {
    if solutions == 0 {
        return ComplexityRating {
            level: ComplexityLevel::Low,
            score: 1.0,
            reasoning: "No solutions identified".to_string(),
        };
    }

    let (level, score) = if solutions > 3 {
        (ComplexityLevel::Medium, 2.5)
    } else {
        (ComplexityLevel::Low, 1.5)
    };

    ComplexityRating {
        level,
        score,
        reasoning: format!("{} solutions requiring {} complexity management", solutions, level),
    }
}

/// Keep the first occurrence of each normalized name, raised to the highest
/// confidence seen for that name
fn dedupe_by_name(pain_points: Vec<PainPoint>) -> Vec<PainPoint> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut unique: Vec<PainPoint> = Vec::with_capacity(pain_points.len());

    for point in pain_points {
        let key = normalize(&point.name);
        match positions.get(&key) {
            Some(&idx) => {
                let kept = &mut unique[idx];
                kept.confidence = kept.confidence.max(point.confidence);
                for evidence in point.evidence {
                    if !kept.evidence.contains(&evidence) {
                        kept.evidence.push(evidence);
                    }
                }
            }
            None => {
                positions.insert(key, unique.len());
                unique.push(point);
            }
        }
    }

    unique
}

#[derive(Debug, Deserialize)]
struct AnalysisResponse {
    #[serde(default)]
    pain_points: Vec<PainPoint>,
    #[serde(default)]
    solutions: Vec<Solution>,
    #[serde(default)]
    tools: Vec<Tool>,
    #[serde(default)]
    overall_confidence: Option<f64>,
}

impl Validate for AnalysisResponse {
    fn validate(&self) -> Result<()> {
        for point in &self.pain_points {
            point.validate()?;
        }
        for solution in &self.solutions {
            solution.validate()?;
        }
        for tool in &self.tools {
            tool.validate()?;
        }
        if let Some(value) = self.overall_confidence {
            confidence(value, "overall_confidence")?;
        }
        Ok(())
    }
}

impl From<AnalysisResponse> for DocumentAnalysis {
    fn from(response: AnalysisResponse) -> Self {
        Self {
            pain_points: response.pain_points,
            solutions: response.solutions,
            tools: response.tools,
            overall_confidence: response.overall_confidence.map(|value| value as f32),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::advisory::extraction::{PainPointCategory, Severity};
    use crate::domain::advisory::prompts::DOCUMENT_HEADLINE;
    use crate::testing::ScriptedGateway;

    const ANALYSIS: &str = r#"```json
    {
        "pain_points": [
            {"name": "Manual Processes", "category": "operational", "severity": "high", "confidence": 85},
            {"name": "Stockouts", "category": "operational", "severity": "medium"}
        ],
        "solutions": [
            {"name": "Inventory automation", "type": "technology", "addresses_pain_points": ["Stockouts"], "confidence": 82}
        ],
        "tools": [
            {"name": "Square for Retail", "vendor": "Block", "complexity": "beginner", "smb_suitability": 9, "implements_solutions": ["Inventory automation"]}
        ],
        "overall_confidence": 81
    }
    ```"#;

    fn analyzer(response: &str) -> EnhancedBusinessAnalyzer {
        EnhancedBusinessAnalyzer::new(Arc::new(
            ScriptedGateway::new().with_response(DOCUMENT_HEADLINE, response),
        ))
    }

    #[tokio::test]
    async fn test_ai_and_pattern_pain_points_are_concatenated() {
        let extraction = analyzer(ANALYSIS)
            .extract_business_advisory_knowledge(
                "We track stock in a spreadsheet and by email.",
                "ops.txt",
                Some("retail"),
            )
            .await;

        let names: Vec<&str> = extraction.pain_points.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Manual Processes", "Stockouts", "Manual Processes"]);

        let pattern = &extraction.pain_points[2];
        assert_eq!(pattern.confidence, 90.0);
        assert_eq!(pattern.severity, Severity::High);
        assert_eq!(pattern.evidence, vec!["ops.txt"]);

        assert_eq!(extraction.industry, "retail");
        assert_eq!(extraction.confidence_scores.overall, 81.0);
        assert_eq!(extraction.solutions.len(), 1);
        assert_eq!(extraction.tools[0].smb_suitability, 9);
    }

    #[tokio::test]
    async fn test_dedupe_keeps_max_confidence() {
        let extraction = analyzer(ANALYSIS)
            .with_dedupe(true)
            .extract_business_advisory_knowledge(
                "manual spreadsheet paper email",
                "ops.txt",
                None,
            )
            .await;

        let manual: Vec<&PainPoint> = extraction
            .pain_points
            .iter()
            .filter(|p| p.name == "Manual Processes")
            .collect();
        assert_eq!(manual.len(), 1);
        // four keyword hits: min(60 + 60, 95)
        assert_eq!(manual[0].confidence, 95.0);
        assert_eq!(extraction.pain_points.len(), 2);
    }

    #[tokio::test]
    async fn test_fractional_tool_score_keeps_ai_analysis() {
        let response = ANALYSIS.replace("\"smb_suitability\": 9", "\"smb_suitability\": 8.5");
        let extraction = analyzer(&response)
            .extract_business_advisory_knowledge("Stock lives in our heads.", "ops.txt", None)
            .await;

        assert_eq!(extraction.tools[0].name, "Square for Retail");
        assert_eq!(extraction.tools[0].smb_suitability, 9);
        assert_eq!(extraction.confidence_scores.overall, 81.0);
    }

    #[tokio::test]
    async fn test_unparseable_response_uses_basic_analysis() {
        let extraction = analyzer("Here are my thoughts, no JSON today.")
            .extract_business_advisory_knowledge("Nothing notable.", "memo.txt", None)
            .await;

        assert_eq!(extraction.pain_points.len(), 1);
        assert_eq!(extraction.pain_points[0].name, "Process Optimization Opportunity");
        assert_eq!(extraction.solutions[0].name, "Business Process Review");
        assert_eq!(extraction.confidence_scores.overall, 70.0);
        assert_eq!(extraction.industry, "general");
    }

    #[tokio::test]
    async fn test_invalid_enum_value_uses_basic_analysis() {
        let response = r#"{"pain_points": [{"name": "x", "category": "cosmic", "severity": "high"}]}"#;
        let extraction = analyzer(response)
            .extract_business_advisory_knowledge("doc", "doc.txt", None)
            .await;
        assert_eq!(extraction.pain_points[0].name, "Process Optimization Opportunity");
    }

    #[tokio::test]
    async fn test_gateway_failure_uses_fallback_extraction() {
        let analyzer = EnhancedBusinessAnalyzer::new(Arc::new(ScriptedGateway::failing("connection refused")));
        let extraction = analyzer
            .extract_business_advisory_knowledge("Our kitchen is chaos", "kitchen.md", None)
            .await;

        assert_eq!(extraction.industry, "restaurant");
        assert_eq!(extraction.pain_points.len(), 1);
        assert_eq!(extraction.pain_points[0].evidence, vec!["kitchen.md"]);
        assert_eq!(extraction.confidence_scores.overall, 65.0);
        assert_eq!(extraction.complexity_rating.reasoning, "Simple assessment approach");
        assert_eq!(extraction.implementation_roadmap.phase_1_quick_wins.timeline, "Weeks 1-4");
    }

    #[test]
    fn test_urgency_assessment() {
        assert_eq!(assess_document_urgency("This is CRITICAL for payroll").level, Urgency::High);
        assert_eq!(assess_document_urgency("We need this ASAP").level, Urgency::High);
        let calm = assess_document_urgency("Routine quarterly review");
        assert_eq!(calm.level, Urgency::Medium);
        assert_eq!(calm.timeline, "1-3 months");
    }

    #[test]
    fn test_complexity_rating() {
        assert_eq!(rate_complexity(0).score, 1.0);
        assert_eq!(rate_complexity(3).level, ComplexityLevel::Low);
        let rating = rate_complexity(4);
        assert_eq!(rating.level, ComplexityLevel::Medium);
        assert_eq!(rating.score, 2.5);
        assert_eq!(rating.reasoning, "4 solutions requiring medium complexity management");
    }

    #[test]
    fn test_dedupe_by_name_merges_evidence() {
        let a = PainPoint::new("Late Invoices", PainPointCategory::Financial, Severity::High)
            .with_confidence(60.0)
            .with_evidence(vec!["a.txt".into()]);
        let b = PainPoint::new("late invoices!", PainPointCategory::Financial, Severity::Medium)
            .with_confidence(80.0)
            .with_evidence(vec!["b.txt".into()]);

        let merged = dedupe_by_name(vec![a, b]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].name, "Late Invoices");
        assert_eq!(merged[0].confidence, 80.0);
        assert_eq!(merged[0].evidence, vec!["a.txt", "b.txt"]);
    }

    #[test]
    fn test_explicit_industry_wins_over_detection() {
        assert_eq!(resolve_industry("our restaurant", Some("retail")), "retail");
        assert_eq!(resolve_industry("our restaurant", Some("  ")), "restaurant");
        assert_eq!(resolve_industry("widgets", None), "general");
    }
}
