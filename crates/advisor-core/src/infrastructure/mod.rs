//! Infrastructure layer
//!
//! Concrete document stores behind the knowledge graph.

pub mod knowledge;
