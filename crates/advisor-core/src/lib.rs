//! Advisor Core Library
//!
//! Business advisory engine for small and medium-sized businesses:
//! - Query analysis (intent, topics, industry, urgency, budget)
//! - Recommendation synthesis routed by intent
//! - Business document extraction (pain points, solutions, tools)
//! - Problem-solution-tool knowledge graph with merge-on-upsert
//! - Storage (SQLite) and LLM integration (OpenRouter API)

pub mod config;
pub mod domain;
pub mod error;
pub mod gateway;
pub mod infrastructure;
pub mod llm;
pub mod storage;
pub mod testing;

pub use error::{Error, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::domain::advisory::{
        AdvisoryEngine, AdvisoryRecommendation, BusinessAdvisoryExtraction,
        EnhancedBusinessAnalyzer, QueryAnalyzer,
    };
    pub use crate::domain::knowledge::{AdvisoryGraphBuilder, DocumentStore, KnowledgeGraphStore};
    pub use crate::error::{Error, Result};
    pub use crate::gateway::{InferenceGateway, LlmGateway, OfflineGateway};
}
