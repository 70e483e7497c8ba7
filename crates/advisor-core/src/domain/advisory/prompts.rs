//! Prompt builders for the advisory pipeline
//!
//! Each prompt opens with a fixed headline so logs (and test doubles) can
//! tell the requests apart.

use super::model::{Intent, QueryAnalysis};

pub const CLASSIFY_HEADLINE: &str = "Analyze this business query and determine the primary intent";
pub const RECOMMEND_HEADLINE: &str = "Provide comprehensive business advisory recommendations";
pub const TOOLS_HEADLINE: &str = "Recommend specific software tools";
pub const PLAN_HEADLINE: &str = "Create a detailed implementation plan";
pub const DOCUMENT_HEADLINE: &str = "Analyze this business document as a senior business consultant";

/// Documents longer than this are truncated before submission
pub const MAX_DOCUMENT_CHARS: usize = 12_000;

pub fn classification_prompt(query: &str) -> String {
    let intents = Intent::all()
        .iter()
        .map(|intent| format!("   - {}: {}", intent.as_str(), intent.description()))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"{headline} and extract key information.

Query: "{query}"

Determine:
1. Primary intent, exactly one of:
{intents}
2. Extracted topics: key business concepts, problems, or areas mentioned
3. Industry hints: any industry-specific terms or context
4. Urgency level: low, medium, high, or critical
5. Budget hints: any budget constraints or cost considerations mentioned

Return JSON:
{{
  "intent": "string",
  "extracted_topics": ["string"],
  "industry_hints": ["string"],
  "urgency": "low|medium|high|critical",
  "budget_hints": ["string"]
}}"#,
        headline = CLASSIFY_HEADLINE,
        query = query,
        intents = intents,
    )
}

pub fn recommendation_prompt(
    query: &str,
    analysis: &QueryAnalysis,
    industry: Option<&str>,
) -> String {
    format!(
        r#"{headline} for this query.

Query: "{query}"
Industry: {industry}
Focus: {focus}
Topics: {topics}
Urgency: {urgency}
Budget considerations: {budget}

Return JSON:
{{
  "pain_points_identified": [{{"name": "string", "severity": "low|medium|high|critical", "cost_impact": "string"}}],
  "recommended_solutions": [{{"name": "string", "type": "string", "roi": "string", "timeline": "string"}}],
  "suggested_tools": [{{"name": "string", "vendor": "string", "cost": "string", "complexity": "string"}}],
  "implementation_plan": {{
    "phases": [{{"name": "string", "duration": "string", "activities": ["string"], "deliverables": ["string"]}}],
    "total_timeline": "string",
    "success_factors": ["string"],
    "risk_factors": ["string"]
  }},
  "roi_projection": {{"implementation_cost": "string", "annual_savings": "string", "payback_period": "string", "three_year_roi": "string"}},
  "next_steps": ["string"],
  "confidence_score": 0-100
}}"#,
        headline = RECOMMEND_HEADLINE,
        query = query,
        industry = industry.unwrap_or("General SMB"),
        focus = focus_for(analysis.intent),
        topics = list_or_none(&analysis.extracted_topics),
        urgency = analysis.urgency,
        budget = list_or_none(&analysis.budget_hints),
    )
}

pub fn tools_prompt(query: &str, analysis: &QueryAnalysis, industry: Option<&str>) -> String {
    format!(
        r#"{headline} for this business need.

Need: "{query}"
Industry: {industry}
Topics: {topics}
Budget considerations: {budget}

Prefer tools suited to small and medium businesses. Return JSON:
{{
  "suggested_tools": [{{"name": "string", "vendor": "string", "cost": "string", "complexity": "string"}}],
  "confidence_score": 0-100
}}"#,
        headline = TOOLS_HEADLINE,
        query = query,
        industry = industry.unwrap_or("General SMB"),
        topics = list_or_none(&analysis.extracted_topics),
        budget = list_or_none(&analysis.budget_hints),
    )
}

pub fn implementation_plan_prompt(
    query: &str,
    analysis: &QueryAnalysis,
    industry: Option<&str>,
) -> String {
    format!(
        r#"{headline} for this business initiative.

Initiative: "{query}"
Industry: {industry}
Urgency: {urgency}

Return JSON:
{{
  "challenges": [{{"name": "string", "severity": "string", "cost_impact": "string"}}],
  "solutions": [{{"name": "string", "type": "string", "roi": "string", "timeline": "string"}}],
  "tools": [{{"name": "string", "vendor": "string", "cost": "string", "complexity": "string"}}],
  "implementation_plan": {{
    "phases": [{{"name": "string", "duration": "string", "activities": ["string"], "deliverables": ["string"]}}],
    "total_timeline": "string",
    "success_factors": ["string"],
    "risk_factors": ["string"]
  }},
  "roi_projection": {{"implementation_cost": "string", "annual_savings": "string", "payback_period": "string", "three_year_roi": "string"}},
  "next_steps": ["string"],
  "confidence_score": 0-100
}}"#,
        headline = PLAN_HEADLINE,
        query = query,
        industry = industry.unwrap_or("General SMB"),
        urgency = analysis.urgency,
    )
}

pub fn document_analysis_prompt(document: &str, file_name: &str, industry: Option<&str>) -> String {
    format!(
        r#"{headline}.

File: {file_name}
Industry: {industry}

Document:
"""
{document}
"""

Identify pain points, the solutions that address them, and the tools that implement those
solutions. Use exact pain point names in "addresses_pain_points" and exact solution names in
"implements_solutions".

Return JSON:
{{
  "pain_points": [{{
    "name": "string",
    "category": "operational|financial|customer|compliance|strategic|industry_specific",
    "industry_specific": false,
    "severity": "low|medium|high|critical",
    "symptoms": ["string"],
    "cost_impact": "string",
    "evidence": ["string"],
    "confidence": 0-100,
    "urgency": "immediate|short_term|medium_term|long_term"
  }}],
  "solutions": [{{
    "name": "string",
    "type": "string",
    "description": "string",
    "addresses_pain_points": ["string"],
    "implementation_difficulty": "easy|medium|hard",
    "time_to_value": "string",
    "typical_roi": "string",
    "prerequisites": ["string"],
    "success_factors": ["string"],
    "risk_factors": ["string"],
    "confidence": 0-100
  }}],
  "tools": [{{
    "name": "string",
    "vendor": "string",
    "category": "string",
    "cost": "string",
    "free_tier": false,
    "complexity": "beginner|intermediate|advanced",
    "smb_suitability": 1-10,
    "implementation_time": "string",
    "learning_curve": "string",
    "key_features": ["string"],
    "use_cases": ["string"],
    "implements_solutions": ["string"],
    "confidence": 0-100
  }}],
  "overall_confidence": 0-100
}}"#,
        headline = DOCUMENT_HEADLINE,
        file_name = file_name,
        industry = industry.unwrap_or("General SMB"),
        document = truncate_chars(document, MAX_DOCUMENT_CHARS),
    )
}

fn focus_for(intent: Intent) -> &'static str {
    match intent {
        Intent::IdentifyPainPoints => "diagnose the underlying business problems",
        Intent::RequestSolutions => "practical solutions to the stated problem",
        Intent::FindTools => "concrete tools and vendors",
        Intent::CostAnalysis => "costs, budget and return on investment",
        Intent::ImplementationPlan => "a phased rollout",
        Intent::GeneralAdvisory => "overall business improvement",
    }
}

fn list_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "none mentioned".to_string()
    } else {
        items.join(", ")
    }
}

/// Truncate on a char boundary
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
