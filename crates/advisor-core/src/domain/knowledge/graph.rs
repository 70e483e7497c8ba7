//! Knowledge graph operations over a document store

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::node::KnowledgeGraphNode;
use super::relationship::{KnowledgeGraphRelationship, NewRelationship};
use super::store::{DocumentStore, NodeUpdate};
use crate::error::Result;

/// What an upsert did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Merged,
}

/// Node and relationship counts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphStats {
    pub node_count: usize,
    pub relationship_count: usize,
    pub nodes_by_type: BTreeMap<String, usize>,
    pub relationships_by_type: BTreeMap<String, usize>,
    /// Mean node confidence, 0 for an empty graph
    pub average_confidence: f32,
}

/// Full dump of the graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub exported_at: DateTime<Utc>,
    pub nodes: Vec<KnowledgeGraphNode>,
    pub relationships: Vec<KnowledgeGraphRelationship>,
}

/// Idempotent node upsert and append-only relationship creation
pub struct KnowledgeGraphStore<S: DocumentStore + ?Sized> {
    store: Arc<S>,
}

impl<S: DocumentStore + ?Sized> Clone for KnowledgeGraphStore<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<S: DocumentStore + ?Sized> KnowledgeGraphStore<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Insert the node, or merge it into the stored node with the same id.
    ///
    /// The read and the write are separate store calls; concurrent upserts
    /// of the same id may overwrite each other's properties.
    pub async fn upsert_node(&self, node: KnowledgeGraphNode) -> Result<UpsertOutcome> {
        match self.store.get_node(&node.id).await? {
            None => {
                self.store.put_node(&node).await?;
                debug!(node_id = %node.id, node_type = %node.node_type, "Node inserted");
                Ok(UpsertOutcome::Inserted)
            }
            Some(mut existing) => {
                existing.merge(&node);
                self.store
                    .update_node(&existing.id, &NodeUpdate::from_node(&existing))
                    .await?;
                debug!(
                    node_id = %existing.id,
                    sources = existing.source_documents.len(),
                    confidence = existing.confidence,
                    "Node merged"
                );
                Ok(UpsertOutcome::Merged)
            }
        }
    }

    /// Store a new relationship. Returns its id, or an empty string if the
    /// store rejected the write.
    pub async fn create_relationship(&self, relationship: NewRelationship) -> String {
        let source = relationship.source_id.clone();
        let target = relationship.target_id.clone();
        let kind = relationship.relationship_type;

        match self.store.insert_relationship(relationship).await {
            Ok(id) => {
                debug!(relationship_id = %id, %source, %target, relationship_type = %kind, "Relationship created");
                id
            }
            Err(e) => {
                warn!(error = %e, %source, %target, relationship_type = %kind, "Failed to create relationship");
                String::new()
            }
        }
    }

    pub async fn get_node(&self, id: &str) -> Result<Option<KnowledgeGraphNode>> {
        self.store.get_node(id).await
    }

    /// Solutions known to address the given pain points. Not supported yet;
    /// always empty.
    pub async fn query_graph_for_solutions(
        &self,
        pain_points: &[String],
        industry: Option<&str>,
    ) -> Vec<KnowledgeGraphNode> {
        debug!(
            pain_points = pain_points.len(),
            industry = industry.unwrap_or("-"),
            "Graph solution queries are not supported yet"
        );
        Vec::new()
    }

    /// Nodes within `depth` hops of a node. Not supported yet; always empty.
    pub async fn get_node_neighborhood(&self, node_id: &str, depth: u32) -> Vec<KnowledgeGraphNode> {
        debug!(node_id, depth, "Graph traversal is not supported yet");
        Vec::new()
    }

    pub async fn stats(&self) -> Result<GraphStats> {
        let nodes = self.store.list_nodes().await?;
        let relationships = self.store.list_relationships().await?;

        let mut nodes_by_type = BTreeMap::new();
        for node in &nodes {
            *nodes_by_type.entry(node.node_type.as_str().to_string()).or_insert(0) += 1;
        }

        let mut relationships_by_type = BTreeMap::new();
        for relationship in &relationships {
            *relationships_by_type
                .entry(relationship.relationship_type.as_str().to_string())
                .or_insert(0) += 1;
        }

        let average_confidence = if nodes.is_empty() {
            0.0
        } else {
            nodes.iter().map(|n| n.confidence).sum::<f32>() / nodes.len() as f32
        };

        Ok(GraphStats {
            node_count: nodes.len(),
            relationship_count: relationships.len(),
            nodes_by_type,
            relationships_by_type,
            average_confidence,
        })
    }

    pub async fn export(&self) -> Result<GraphSnapshot> {
        Ok(GraphSnapshot {
            exported_at: Utc::now(),
            nodes: self.store.list_nodes().await?,
            relationships: self.store.list_relationships().await?,
        })
    }
}
