//! Test doubles for the inference gateway and document store

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::advisory::{
    AdvisoryTemplates, BusinessAdvisoryExtraction, ComplexityLevel, ComplexityRating,
    ConfidenceScores, PainPoint, PainPointCategory, Severity, SkillLevel, Solution, Tool, Urgency,
    UrgencyAssessment,
};
use crate::domain::knowledge::{
    DocumentStore, KnowledgeGraphNode, KnowledgeGraphRelationship, NewRelationship, NodeUpdate,
};
use crate::error::{Error, Result};
use crate::gateway::InferenceGateway;

#[derive(Debug, Clone)]
enum Reply {
    Text(String),
    Fail(String),
}

/// Gateway that answers prompts from a script.
///
/// Each rule pairs a substring with a reply; the first rule whose substring
/// occurs in the prompt wins. Prompts matching no rule fail.
#[derive(Debug, Default)]
pub struct ScriptedGateway {
    rules: Vec<(String, Reply)>,
    default_failure: Option<String>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// A gateway on which every submission fails
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            default_failure: Some(message.into()),
            ..Self::default()
        }
    }

    /// Answer prompts containing `pattern` with `response`
    pub fn with_response(mut self, pattern: impl Into<String>, response: impl Into<String>) -> Self {
        self.rules.push((pattern.into(), Reply::Text(response.into())));
        self
    }

    /// Fail prompts containing `pattern`
    pub fn with_failure(mut self, pattern: impl Into<String>, message: impl Into<String>) -> Self {
        self.rules.push((pattern.into(), Reply::Fail(message.into())));
        self
    }

    /// Every prompt submitted so far
    pub async fn calls(&self) -> Vec<String> {
        self.calls.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }

    /// Whether any submitted prompt contained `text`
    pub async fn was_called_with(&self, text: &str) -> bool {
        self.calls.lock().await.iter().any(|prompt| prompt.contains(text))
    }
}

#[async_trait]
impl InferenceGateway for ScriptedGateway {
    async fn submit(&self, prompt: &str) -> Result<String> {
        self.calls.lock().await.push(prompt.to_string());

        let reply = self
            .rules
            .iter()
            .find(|(pattern, _)| prompt.contains(pattern.as_str()))
            .map(|(_, reply)| reply.clone());

        match reply {
            Some(Reply::Text(text)) => Ok(text),
            Some(Reply::Fail(message)) => Err(Error::Gateway(message)),
            None => Err(Error::Gateway(
                self.default_failure
                    .clone()
                    .unwrap_or_else(|| "no scripted response for prompt".to_string()),
            )),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Document store wrapper that can be told to reject node or relationship writes
#[derive(Debug)]
pub struct FailingStore<S> {
    inner: S,
    fail_nodes: AtomicBool,
    fail_relationships: AtomicBool,
}

impl<S: DocumentStore> FailingStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            fail_nodes: AtomicBool::new(false),
            fail_relationships: AtomicBool::new(false),
        }
    }

    pub fn fail_nodes(self) -> Self {
        self.fail_nodes.store(true, Ordering::SeqCst);
        self
    }

    pub fn fail_relationships(self) -> Self {
        self.fail_relationships.store(true, Ordering::SeqCst);
        self
    }

    /// Toggle node failures on a shared store
    pub fn set_fail_nodes(&self, fail: bool) {
        self.fail_nodes.store(fail, Ordering::SeqCst);
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn check_nodes(&self) -> Result<()> {
        if self.fail_nodes.load(Ordering::SeqCst) {
            return Err(Error::Persistence("node writes disabled".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl<S: DocumentStore> DocumentStore for FailingStore<S> {
    async fn get_node(&self, id: &str) -> Result<Option<KnowledgeGraphNode>> {
        self.check_nodes()?;
        self.inner.get_node(id).await
    }

    async fn put_node(&self, node: &KnowledgeGraphNode) -> Result<()> {
        self.check_nodes()?;
        self.inner.put_node(node).await
    }

    async fn update_node(&self, id: &str, update: &NodeUpdate) -> Result<()> {
        self.check_nodes()?;
        self.inner.update_node(id, update).await
    }

    async fn insert_relationship(&self, relationship: NewRelationship) -> Result<String> {
        if self.fail_relationships.load(Ordering::SeqCst) {
            return Err(Error::Persistence("relationship writes disabled".to_string()));
        }
        self.inner.insert_relationship(relationship).await
    }

    async fn list_nodes(&self) -> Result<Vec<KnowledgeGraphNode>> {
        self.inner.list_nodes().await
    }

    async fn list_relationships(&self) -> Result<Vec<KnowledgeGraphRelationship>> {
        self.inner.list_relationships().await
    }
}

/// Retail extraction: two pain points, one solution addressing both, one
/// tool implementing the solution
pub fn sample_extraction() -> BusinessAdvisoryExtraction {
    let templates = AdvisoryTemplates::default();

    let stockouts = PainPoint::new("Frequent Stockouts", PainPointCategory::Operational, Severity::High)
        .with_confidence(80.0);
    let manual = PainPoint::new("Manual Inventory Counts", PainPointCategory::Operational, Severity::Medium)
        .with_confidence(65.0);

    let solution = Solution::new("Automated Inventory Tracking", "technology")
        .addressing(vec![stockouts.name.clone(), manual.name.clone()])
        .with_confidence(78.0);

    let mut tool = Tool::new("Square for Retail", "Block")
        .implementing(vec![solution.name.clone()])
        .with_confidence(72.0);
    tool.category = "point_of_sale".to_string();
    tool.cost = "$60/month".to_string();
    tool.complexity = SkillLevel::Beginner;
    tool.smb_suitability = 9;

    BusinessAdvisoryExtraction {
        pain_points: vec![stockouts, manual],
        solutions: vec![solution],
        tools: vec![tool],
        industry: "retail".to_string(),
        confidence_scores: ConfidenceScores {
            overall: 78.0,
            pain_points: 80.0,
            solutions: 75.0,
            tools: 70.0,
        },
        implementation_roadmap: templates.roadmap,
        roi_analysis: templates.roi_analysis,
        urgency_assessment: UrgencyAssessment {
            level: Urgency::Medium,
            timeline: "1-3 months".to_string(),
            recommendation: "Plan systematic implementation with proper testing".to_string(),
        },
        complexity_rating: ComplexityRating {
            level: ComplexityLevel::Low,
            score: 1.5,
            reasoning: "1 solutions requiring low complexity management".to_string(),
        },
    }
}
