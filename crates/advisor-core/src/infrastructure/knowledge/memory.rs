//! In-memory document store

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::knowledge::{
    DocumentStore, KnowledgeGraphNode, KnowledgeGraphRelationship, NewRelationship, NodeUpdate,
};
use crate::error::{Error, Result};

/// Document store held in process memory; used by tests and offline runs
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    nodes: RwLock<HashMap<String, KnowledgeGraphNode>>,
    relationships: RwLock<Vec<KnowledgeGraphRelationship>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get_node(&self, id: &str) -> Result<Option<KnowledgeGraphNode>> {
        Ok(self.nodes.read().await.get(id).cloned())
    }

    async fn put_node(&self, node: &KnowledgeGraphNode) -> Result<()> {
        self.nodes
            .write()
            .await
            .insert(node.id.clone(), node.clone());
        Ok(())
    }

    async fn update_node(&self, id: &str, update: &NodeUpdate) -> Result<()> {
        let mut nodes = self.nodes.write().await;
        let node = nodes
            .get_mut(id)
            .ok_or_else(|| Error::NodeNotFound(id.to_string()))?;
        update.apply(node);
        Ok(())
    }

    async fn insert_relationship(&self, relationship: NewRelationship) -> Result<String> {
        let relationship = relationship.into_relationship();
        let id = relationship.id.clone();
        self.relationships.write().await.push(relationship);
        Ok(id)
    }

    async fn list_nodes(&self) -> Result<Vec<KnowledgeGraphNode>> {
        let mut nodes: Vec<KnowledgeGraphNode> = self.nodes.read().await.values().cloned().collect();
        nodes.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(nodes)
    }

    async fn list_relationships(&self) -> Result<Vec<KnowledgeGraphRelationship>> {
        Ok(self.relationships.read().await.clone())
    }
}
