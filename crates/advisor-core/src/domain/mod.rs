//! Domain layer
//!
//! Advisory pipelines and the knowledge graph they feed.

pub mod advisory;
pub mod knowledge;
