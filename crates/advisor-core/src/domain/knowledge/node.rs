//! Knowledge graph nodes
//!
//! Nodes are identified by `type prefix + normalize(name)`, so the same
//! entity mentioned in different documents always maps to the same id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::advisory::normalize;

/// Kinds of entity stored in the graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    PainPoint,
    Solution,
    Tool,
    Industry,
    BusinessProcess,
}

impl NodeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PainPoint => "pain_point",
            Self::Solution => "solution",
            Self::Tool => "tool",
            Self::Industry => "industry",
            Self::BusinessProcess => "business_process",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pain_point" => Some(Self::PainPoint),
            "solution" => Some(Self::Solution),
            "tool" => Some(Self::Tool),
            "industry" => Some(Self::Industry),
            "business_process" => Some(Self::BusinessProcess),
            _ => None,
        }
    }

    pub fn all() -> &'static [NodeType] {
        &[
            Self::PainPoint,
            Self::Solution,
            Self::Tool,
            Self::Industry,
            Self::BusinessProcess,
        ]
    }

    /// Id prefix, e.g. `pain_point_`
    pub fn prefix(&self) -> String {
        format!("{}_", self.as_str())
    }

    /// Stable node id for an entity name
    pub fn node_id(&self, name: &str) -> String {
        format!("{}{}", self.prefix(), normalize(name))
    }
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A typed entity in the knowledge graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeGraphNode {
    pub id: String,
    pub node_type: NodeType,
    pub name: String,
    /// Type-specific attributes (severity, vendor, typical ROI, ...)
    pub properties: Map<String, Value>,
    /// Documents that mentioned this entity
    pub source_documents: Vec<String>,
    /// 0-100
    pub confidence: f32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl KnowledgeGraphNode {
    pub fn new(node_type: NodeType, name: impl Into<String>) -> Self {
        let name = name.into();
        let now = Utc::now();

        Self {
            id: node_type.node_id(&name),
            node_type,
            name,
            properties: Map::new(),
            source_documents: Vec::new(),
            confidence: 0.0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn with_properties(mut self, properties: Map<String, Value>) -> Self {
        self.properties.extend(properties);
        self
    }

    pub fn with_source_document(mut self, document_id: impl Into<String>) -> Self {
        let document_id = document_id.into();
        if !self.source_documents.contains(&document_id) {
            self.source_documents.push(document_id);
        }
        self
    }

    /// Confidence is clamped to 0-100
    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = if confidence.is_finite() {
            confidence.clamp(0.0, 100.0)
        } else {
            0.0
        };
        self
    }

    /// Fold a later mention of the same entity into this node.
    ///
    /// Source documents are unioned (order of first appearance), confidence
    /// takes the maximum and incoming properties win per key. `id`, `name`,
    /// `node_type` and `created_at` are kept.
    pub fn merge(&mut self, incoming: &KnowledgeGraphNode) {
        for document in &incoming.source_documents {
            if !self.source_documents.contains(document) {
                self.source_documents.push(document.clone());
            }
        }
        self.confidence = self.confidence.max(incoming.confidence);
        for (key, value) in &incoming.properties {
            self.properties.insert(key.clone(), value.clone());
        }
        self.updated_at = Utc::now();
    }
}
