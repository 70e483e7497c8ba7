//! Knowledge graph relationships
//!
//! Relationships are append-only evidence: each one records a single fact
//! observed in a single document and is never updated afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Typed, directed edge kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationshipType {
    /// solution → pain point
    Solves,
    /// tool → solution
    Implements,
    Requires,
    Causes,
    Prevents,
}

impl RelationshipType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Solves => "SOLVES",
            Self::Implements => "IMPLEMENTS",
            Self::Requires => "REQUIRES",
            Self::Causes => "CAUSES",
            Self::Prevents => "PREVENTS",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "SOLVES" => Some(Self::Solves),
            "IMPLEMENTS" => Some(Self::Implements),
            "REQUIRES" => Some(Self::Requires),
            "CAUSES" => Some(Self::Causes),
            "PREVENTS" => Some(Self::Prevents),
            _ => None,
        }
    }
}

impl std::fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A relationship before it has been stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRelationship {
    pub source_id: String,
    pub target_id: String,
    pub relationship_type: RelationshipType,
    pub properties: Map<String, Value>,
    pub weight: f32,
    /// 0-100
    pub confidence: f32,
    pub source_document: String,
}

impl NewRelationship {
    pub fn new(
        source_id: impl Into<String>,
        target_id: impl Into<String>,
        relationship_type: RelationshipType,
        source_document: impl Into<String>,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            target_id: target_id.into(),
            relationship_type,
            properties: Map::new(),
            weight: 1.0,
            confidence: 0.0,
            source_document: source_document.into(),
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn with_weight(mut self, weight: f32) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = if confidence.is_finite() {
            confidence.clamp(0.0, 100.0)
        } else {
            0.0
        };
        self
    }

    /// Assign an id and creation time
    pub fn into_relationship(self) -> KnowledgeGraphRelationship {
        KnowledgeGraphRelationship {
            id: Uuid::new_v4().to_string(),
            source_id: self.source_id,
            target_id: self.target_id,
            relationship_type: self.relationship_type,
            properties: self.properties,
            weight: self.weight,
            confidence: self.confidence,
            source_document: self.source_document,
            created_at: Utc::now(),
        }
    }
}

/// A stored relationship
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeGraphRelationship {
    pub id: String,
    pub source_id: String,
    pub target_id: String,
    pub relationship_type: RelationshipType,
    pub properties: Map<String, Value>,
    pub weight: f32,
    pub confidence: f32,
    pub source_document: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relationship_type_wire_names() {
        assert_eq!(
            serde_json::to_string(&RelationshipType::Solves).unwrap(),
            "\"SOLVES\""
        );
        assert_eq!(RelationshipType::parse("implements"), Some(RelationshipType::Implements));
        assert_eq!(RelationshipType::parse("LIKES"), None);
    }

    #[test]
    fn test_each_draft_gets_a_fresh_id() {
        let draft = NewRelationship::new("solution_a", "pain_point_b", RelationshipType::Solves, "doc-1")
            .with_confidence(75.0);

        let first = draft.clone().into_relationship();
        let second = draft.into_relationship();

        assert_ne!(first.id, second.id);
        assert_eq!(first.source_document, "doc-1");
        assert_eq!(first.weight, 1.0);
        assert_eq!(first.confidence, 75.0);
    }
}
