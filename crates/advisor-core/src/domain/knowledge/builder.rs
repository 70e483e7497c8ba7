//! Persisting document extractions into the knowledge graph

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{info, warn};

use super::graph::{KnowledgeGraphStore, UpsertOutcome};
use super::node::{KnowledgeGraphNode, NodeType};
use super::relationship::{NewRelationship, RelationshipType};
use super::store::DocumentStore;
use crate::domain::advisory::{BusinessAdvisoryExtraction, PainPoint, Solution, Tool};

/// Outcome of persisting one extraction
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphBuildResult {
    /// False if any node or relationship write failed
    pub success: bool,
    /// Nodes written, whether inserted or merged
    pub nodes_created: usize,
    pub relationships_created: usize,
    /// Nodes that did not exist before this build
    pub nodes_inserted: usize,
    pub failed_writes: usize,
    /// Ids of the nodes written
    pub nodes: Vec<String>,
    /// Ids of the relationships written
    pub relationships: Vec<String>,
}

/// Writes pain points, solutions, tools and their links to the graph
pub struct AdvisoryGraphBuilder<S: DocumentStore + ?Sized> {
    graph: KnowledgeGraphStore<S>,
}

impl<S: DocumentStore + ?Sized> AdvisoryGraphBuilder<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            graph: KnowledgeGraphStore::new(store),
        }
    }

    pub fn from_graph(graph: KnowledgeGraphStore<S>) -> Self {
        Self { graph }
    }

    pub fn graph(&self) -> &KnowledgeGraphStore<S> {
        &self.graph
    }

    /// Persist an extraction. Never fails; individual write failures are
    /// logged, skipped and excluded from the counts.
    ///
    /// Writes are sequential and not atomic. Nodes are upserted, so a rebuild
    /// from another document only adds sources; relationships are always
    /// appended.
    pub async fn build_advisory_graph(
        &self,
        extraction: &BusinessAdvisoryExtraction,
        document_id: &str,
    ) -> GraphBuildResult {
        info!(
            document_id,
            pain_points = extraction.pain_points.len(),
            solutions = extraction.solutions.len(),
            tools = extraction.tools.len(),
            "Building advisory knowledge graph"
        );

        let mut result = GraphBuildResult::default();

        for pain_point in &extraction.pain_points {
            self.write_node(pain_point_node(pain_point, document_id), &mut result)
                .await;
        }

        for solution in &extraction.solutions {
            let node = solution_node(solution, document_id);
            let source_id = node.id.clone();
            self.write_node(node, &mut result).await;

            for pain_point in &solution.addresses_pain_points {
                let draft = NewRelationship::new(
                    source_id.clone(),
                    NodeType::PainPoint.node_id(pain_point),
                    RelationshipType::Solves,
                    document_id,
                )
                .with_property("effectiveness", 80)
                .with_property("evidence", Value::Array(Vec::new()))
                .with_weight(1.0)
                .with_confidence(solution.confidence);
                self.write_relationship(draft, &mut result).await;
            }
        }

        for tool in &extraction.tools {
            let node = tool_node(tool, document_id);
            let source_id = node.id.clone();
            self.write_node(node, &mut result).await;

            for solution in &tool.implements_solutions {
                let draft = NewRelationship::new(
                    source_id.clone(),
                    NodeType::Solution.node_id(solution),
                    RelationshipType::Implements,
                    document_id,
                )
                .with_property("automation_level", 70)
                .with_property("setup_complexity", tool.complexity.as_str())
                .with_weight(1.0)
                .with_confidence(tool.confidence);
                self.write_relationship(draft, &mut result).await;
            }
        }

        result.success = result.failed_writes == 0;
        info!(
            document_id,
            nodes_created = result.nodes_created,
            nodes_inserted = result.nodes_inserted,
            relationships_created = result.relationships_created,
            failed_writes = result.failed_writes,
            "Knowledge graph built"
        );
        result
    }

    async fn write_node(&self, node: KnowledgeGraphNode, result: &mut GraphBuildResult) {
        let id = node.id.clone();
        match self.graph.upsert_node(node).await {
            Ok(outcome) => {
                if outcome == UpsertOutcome::Inserted {
                    result.nodes_inserted += 1;
                }
                result.nodes_created += 1;
                result.nodes.push(id);
            }
            Err(e) => {
                warn!(node_id = %id, error = %e, "Skipping node that could not be written");
                result.failed_writes += 1;
            }
        }
    }

    async fn write_relationship(&self, draft: NewRelationship, result: &mut GraphBuildResult) {
        let id = self.graph.create_relationship(draft).await;
        if id.is_empty() {
            result.failed_writes += 1;
        } else {
            result.relationships_created += 1;
            result.relationships.push(id);
        }
    }
}

fn pain_point_node(pain_point: &PainPoint, document_id: &str) -> KnowledgeGraphNode {
    KnowledgeGraphNode::new(NodeType::PainPoint, &pain_point.name)
        .with_property("category", pain_point.category.as_str())
        .with_property("severity", pain_point.severity.as_str())
        .with_property("symptoms", json!(pain_point.symptoms))
        .with_property("cost_impact", pain_point.cost_impact.as_str())
        .with_property("industry_specific", pain_point.industry_specific)
        .with_source_document(document_id)
        .with_confidence(pain_point.confidence)
}

fn solution_node(solution: &Solution, document_id: &str) -> KnowledgeGraphNode {
    KnowledgeGraphNode::new(NodeType::Solution, &solution.name)
        .with_property("type", solution.solution_type.as_str())
        .with_property("implementation_difficulty", solution.implementation_difficulty.as_str())
        .with_property("time_to_value", solution.time_to_value.as_str())
        .with_property("typical_roi", solution.typical_roi.as_str())
        .with_property("prerequisites", json!(solution.prerequisites))
        .with_source_document(document_id)
        .with_confidence(solution.confidence)
}

fn tool_node(tool: &Tool, document_id: &str) -> KnowledgeGraphNode {
    KnowledgeGraphNode::new(NodeType::Tool, &tool.name)
        .with_property("category", tool.category.as_str())
        .with_property("cost_range", tool.price())
        .with_property("vendor", tool.vendor.as_str())
        .with_property("complexity", tool.complexity.as_str())
        .with_property("smb_suitability", tool.smb_suitability)
        .with_source_document(document_id)
        .with_confidence(tool.confidence)
}
