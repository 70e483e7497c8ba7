//! Advisory domain
//!
//! Query classification, recommendation synthesis and document extraction.

mod analyzer;
mod business;
mod extraction;
mod heuristics;
mod model;
pub mod normalize;
pub mod parse;
pub mod prompts;
mod synthesizer;
mod templates;

pub use analyzer::QueryAnalyzer;
pub use business::{EnhancedBusinessAnalyzer, assess_document_urgency, rate_complexity};
pub use extraction::{
    BusinessAdvisoryExtraction, ComplexityLevel, ComplexityRating, ConfidenceScores,
    ImplementationCosts, ImplementationRoadmap, PainPoint, PainPointCategory, PaybackAnalysis,
    ProjectedBenefits, ResolutionWindow, RoadmapAction, RoadmapPhase, RoiAnalysis, Severity,
    SkillLevel, Solution, Tool, UrgencyAssessment,
};
pub use heuristics::{analyze_fallback, classify_intent, detect_industry};
pub use model::{
    AdvisoryRecommendation, AnalysisSource, ImplementationPhase, ImplementationPlan, Intent,
    PainPointSummary, QueryAnalysis, RoiProjection, SolutionSummary, ToolSummary, Urgency,
};
pub use normalize::{normalize, title_case};
pub use synthesizer::{AdvisoryEngine, StrategyTable, SynthesisStrategy};
pub use templates::{
    AdvisoryTemplates, AnalysisSeed, FALLBACK_CONFIDENCE, FallbackExtractionTemplate, PainPattern,
    PlanTemplate, RecommendationTemplate,
};
