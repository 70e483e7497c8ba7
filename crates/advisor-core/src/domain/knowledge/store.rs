//! Document store abstraction behind the knowledge graph
//!
//! The graph needs only keyed lookups and writes; there is no query
//! language and no cross-record transaction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use super::node::KnowledgeGraphNode;
use super::relationship::{KnowledgeGraphRelationship, NewRelationship};
use crate::error::Result;

/// Mutable fields of an existing node
#[derive(Debug, Clone, PartialEq)]
pub struct NodeUpdate {
    pub properties: Map<String, Value>,
    pub source_documents: Vec<String>,
    pub confidence: f32,
    pub updated_at: DateTime<Utc>,
}

impl NodeUpdate {
    pub fn from_node(node: &KnowledgeGraphNode) -> Self {
        Self {
            properties: node.properties.clone(),
            source_documents: node.source_documents.clone(),
            confidence: node.confidence,
            updated_at: node.updated_at,
        }
    }

    pub fn apply(&self, node: &mut KnowledgeGraphNode) {
        node.properties = self.properties.clone();
        node.source_documents = self.source_documents.clone();
        node.confidence = self.confidence;
        node.updated_at = self.updated_at;
    }
}

/// Keyed persistence for nodes and relationships
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get_node(&self, id: &str) -> Result<Option<KnowledgeGraphNode>>;

    /// Insert a node, replacing any node with the same id
    async fn put_node(&self, node: &KnowledgeGraphNode) -> Result<()>;

    /// Overwrite the mutable fields of an existing node.
    ///
    /// Fails with `Error::NodeNotFound` if the node does not exist.
    async fn update_node(&self, id: &str, update: &NodeUpdate) -> Result<()>;

    /// Store a new relationship and return its generated id
    async fn insert_relationship(&self, relationship: NewRelationship) -> Result<String>;

    async fn list_nodes(&self) -> Result<Vec<KnowledgeGraphNode>>;

    async fn list_relationships(&self) -> Result<Vec<KnowledgeGraphRelationship>>;
}
