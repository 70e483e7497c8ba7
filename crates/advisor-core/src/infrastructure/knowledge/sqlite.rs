//! SQLite implementation of the document store

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use sqlx::{FromRow, SqlitePool};
use tracing::debug;

use crate::domain::knowledge::{
    DocumentStore, KnowledgeGraphNode, KnowledgeGraphRelationship, NewRelationship, NodeType,
    NodeUpdate, RelationshipType,
};
use crate::error::{Error, Result};

/// Knowledge graph tables in SQLite
///
/// `properties` and `source_documents` are stored as JSON text; timestamps as
/// RFC 3339.
#[derive(Debug, Clone)]
pub struct SqliteDocumentStore {
    pool: SqlitePool,
}

impl SqliteDocumentStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentStore for SqliteDocumentStore {
    async fn get_node(&self, id: &str) -> Result<Option<KnowledgeGraphNode>> {
        let row: Option<NodeRow> = sqlx::query_as("SELECT * FROM advisory_nodes WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| r.into_node()).transpose()
    }

    async fn put_node(&self, node: &KnowledgeGraphNode) -> Result<()> {
        let properties = to_json(&node.properties, "properties")?;
        let source_documents = to_json(&node.source_documents, "source_documents")?;

        sqlx::query(
            r#"
            INSERT INTO advisory_nodes (
                id, node_type, name, properties, source_documents,
                confidence, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                node_type = excluded.node_type,
                name = excluded.name,
                properties = excluded.properties,
                source_documents = excluded.source_documents,
                confidence = excluded.confidence,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&node.id)
        .bind(node.node_type.as_str())
        .bind(&node.name)
        .bind(&properties)
        .bind(&source_documents)
        .bind(node.confidence)
        .bind(node.created_at.to_rfc3339())
        .bind(node.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        debug!(node_id = %node.id, "Node stored");
        Ok(())
    }

    async fn update_node(&self, id: &str, update: &NodeUpdate) -> Result<()> {
        let properties = to_json(&update.properties, "properties")?;
        let source_documents = to_json(&update.source_documents, "source_documents")?;

        let result = sqlx::query(
            r#"
            UPDATE advisory_nodes
            SET properties = ?, source_documents = ?, confidence = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&properties)
        .bind(&source_documents)
        .bind(update.confidence)
        .bind(update.updated_at.to_rfc3339())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NodeNotFound(id.to_string()));
        }

        debug!(node_id = %id, "Node updated");
        Ok(())
    }

    async fn insert_relationship(&self, relationship: NewRelationship) -> Result<String> {
        let relationship = relationship.into_relationship();
        let properties = to_json(&relationship.properties, "properties")?;

        sqlx::query(
            r#"
            INSERT INTO advisory_relationships (
                id, source_id, target_id, relationship_type, properties,
                weight, confidence, source_document, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&relationship.id)
        .bind(&relationship.source_id)
        .bind(&relationship.target_id)
        .bind(relationship.relationship_type.as_str())
        .bind(&properties)
        .bind(relationship.weight)
        .bind(relationship.confidence)
        .bind(&relationship.source_document)
        .bind(relationship.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        debug!(
            relationship_id = %relationship.id,
            source = %relationship.source_id,
            target = %relationship.target_id,
            "Relationship stored"
        );
        Ok(relationship.id)
    }

    async fn list_nodes(&self) -> Result<Vec<KnowledgeGraphNode>> {
        let rows: Vec<NodeRow> = sqlx::query_as("SELECT * FROM advisory_nodes ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(|r| r.into_node()).collect()
    }

    async fn list_relationships(&self) -> Result<Vec<KnowledgeGraphRelationship>> {
        let rows: Vec<RelationshipRow> =
            sqlx::query_as("SELECT * FROM advisory_relationships ORDER BY created_at, id")
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter().map(|r| r.into_relationship()).collect()
    }
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T, field: &str) -> Result<String> {
    serde_json::to_string(value)
        .map_err(|e| Error::Persistence(format!("Failed to serialize {}: {}", field, e)))
}

fn from_json<T: serde::de::DeserializeOwned>(value: &str, field: &str) -> Result<T> {
    serde_json::from_str(value)
        .map_err(|e| Error::Persistence(format!("Corrupt {} column: {}", field, e)))
}

fn parse_timestamp(value: &str, field: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Persistence(format!("Corrupt {} column: {}", field, e)))
}

#[derive(Debug, FromRow)]
struct NodeRow {
    id: String,
    node_type: String,
    name: String,
    properties: String,
    source_documents: String,
    confidence: f32,
    created_at: String,
    updated_at: String,
}

impl NodeRow {
    fn into_node(self) -> Result<KnowledgeGraphNode> {
        let node_type = NodeType::parse(&self.node_type)
            .ok_or_else(|| Error::Persistence(format!("Invalid node type: {}", self.node_type)))?;

        Ok(KnowledgeGraphNode {
            id: self.id,
            node_type,
            name: self.name,
            properties: from_json::<Map<String, Value>>(&self.properties, "properties")?,
            source_documents: from_json(&self.source_documents, "source_documents")?,
            confidence: self.confidence,
            created_at: parse_timestamp(&self.created_at, "created_at")?,
            updated_at: parse_timestamp(&self.updated_at, "updated_at")?,
        })
    }
}

#[derive(Debug, FromRow)]
struct RelationshipRow {
    id: String,
    source_id: String,
    target_id: String,
    relationship_type: String,
    properties: String,
    weight: f32,
    confidence: f32,
    source_document: String,
    created_at: String,
}

impl RelationshipRow {
    fn into_relationship(self) -> Result<KnowledgeGraphRelationship> {
        let relationship_type = RelationshipType::parse(&self.relationship_type).ok_or_else(|| {
            Error::Persistence(format!(
                "Invalid relationship type: {}",
                self.relationship_type
            ))
        })?;

        Ok(KnowledgeGraphRelationship {
            id: self.id,
            source_id: self.source_id,
            target_id: self.target_id,
            relationship_type,
            properties: from_json::<Map<String, Value>>(&self.properties, "properties")?,
            weight: self.weight,
            confidence: self.confidence,
            source_document: self.source_document,
            created_at: parse_timestamp(&self.created_at, "created_at")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::knowledge::{KnowledgeGraphStore, UpsertOutcome};
    use crate::storage::Database;
    use serde_json::json;
    use std::sync::Arc;

    async fn setup_store() -> SqliteDocumentStore {
        let db = Database::in_memory().await.expect("Failed to create database");
        SqliteDocumentStore::new(db.pool().clone())
    }

    #[tokio::test]
    async fn test_put_and_get_node() {
        let store = setup_store().await;
        let node = KnowledgeGraphNode::new(NodeType::PainPoint, "Late invoices")
            .with_property("severity", "high")
            .with_property("symptoms", json!(["cash gaps"]))
            .with_source_document("doc-1")
            .with_confidence(72.5);

        store.put_node(&node).await.unwrap();
        let loaded = store.get_node("pain_point_late_invoices").await.unwrap().unwrap();

        assert_eq!(loaded.name, "Late invoices");
        assert_eq!(loaded.node_type, NodeType::PainPoint);
        assert_eq!(loaded.properties["symptoms"], json!(["cash gaps"]));
        assert_eq!(loaded.source_documents, vec!["doc-1"]);
        assert_eq!(loaded.confidence, 72.5);
        assert_eq!(loaded.created_at.timestamp(), node.created_at.timestamp());
    }

    #[tokio::test]
    async fn test_get_missing_node() {
        let store = setup_store().await;
        assert!(store.get_node("tool_nothing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_node() {
        let store = setup_store().await;
        let mut node = KnowledgeGraphNode::new(NodeType::Tool, "Gusto").with_confidence(50.0);
        store.put_node(&node).await.unwrap();

        node.confidence = 90.0;
        node.source_documents.push("doc-2".into());
        store.update_node(&node.id, &NodeUpdate::from_node(&node)).await.unwrap();

        let loaded = store.get_node(&node.id).await.unwrap().unwrap();
        assert_eq!(loaded.confidence, 90.0);
        assert_eq!(loaded.source_documents, vec!["doc-2"]);

        let err = store
            .update_node("tool_missing", &NodeUpdate::from_node(&node))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NodeNotFound(_)));
    }

    #[tokio::test]
    async fn test_relationships_roundtrip() {
        let store = setup_store().await;
        let draft = NewRelationship::new("tool_a", "solution_b", RelationshipType::Implements, "doc-1")
            .with_property("automation_level", 70)
            .with_confidence(70.0);

        let first = store.insert_relationship(draft.clone()).await.unwrap();
        let second = store.insert_relationship(draft).await.unwrap();
        assert_ne!(first, second);

        let stored = store.list_relationships().await.unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].relationship_type, RelationshipType::Implements);
        assert_eq!(stored[0].properties["automation_level"], json!(70));
    }

    #[tokio::test]
    async fn test_graph_upsert_over_sqlite() {
        let graph = KnowledgeGraphStore::new(Arc::new(setup_store().await));
        let node = |doc: &str, confidence: f32| {
            KnowledgeGraphNode::new(NodeType::Solution, "Self-service booking")
                .with_source_document(doc)
                .with_confidence(confidence)
                .with_property("typical_roi", doc.to_string())
        };

        assert_eq!(graph.upsert_node(node("A", 60.0)).await.unwrap(), UpsertOutcome::Inserted);
        assert_eq!(graph.upsert_node(node("B", 80.0)).await.unwrap(), UpsertOutcome::Merged);

        let stored = graph.get_node("solution_self_service_booking").await.unwrap().unwrap();
        assert_eq!(stored.source_documents, vec!["A", "B"]);
        assert_eq!(stored.confidence, 80.0);
        assert_eq!(stored.properties["typical_roi"], json!("B"));
    }

    #[tokio::test]
    async fn test_corrupt_row_is_not_overwritten() {
        let db = Database::in_memory().await.unwrap();
        let graph = KnowledgeGraphStore::new(Arc::new(SqliteDocumentStore::new(db.pool().clone())));

        let zapier = |doc: &str| KnowledgeGraphNode::new(NodeType::Tool, "Zapier").with_source_document(doc);
        graph.upsert_node(zapier("A")).await.unwrap();

        sqlx::query("UPDATE advisory_nodes SET source_documents = '[\"A\",' WHERE id = 'tool_zapier'")
            .execute(db.pool())
            .await
            .unwrap();

        let err = graph.upsert_node(zapier("B")).await.unwrap_err();
        assert!(matches!(&err, Error::Persistence(msg) if msg.contains("source_documents")));

        let raw: (String,) = sqlx::query_as("SELECT source_documents FROM advisory_nodes WHERE id = 'tool_zapier'")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(raw.0, "[\"A\",");
    }

    #[tokio::test]
    async fn test_corrupt_timestamp_is_reported() {
        let db = Database::in_memory().await.unwrap();
        let store = SqliteDocumentStore::new(db.pool().clone());
        store.put_node(&KnowledgeGraphNode::new(NodeType::Solution, "Payroll")).await.unwrap();

        sqlx::query("UPDATE advisory_nodes SET created_at = 'yesterday'")
            .execute(db.pool())
            .await
            .unwrap();

        let err = store.get_node("solution_payroll").await.unwrap_err();
        assert!(matches!(&err, Error::Persistence(msg) if msg.contains("created_at")));
        assert!(store.list_nodes().await.is_err());
    }
}
