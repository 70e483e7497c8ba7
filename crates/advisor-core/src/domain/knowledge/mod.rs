//! Advisory knowledge graph
//!
//! Pain points, solutions and tools extracted from documents accumulate as
//! nodes keyed by normalized name. Solutions are linked to the pain points
//! they address (`SOLVES`) and tools to the solutions they implement
//! (`IMPLEMENTS`). Every document adds a fresh set of edges, so repeated
//! observations of the same fact become corroborating evidence.
//!
//! ```rust,ignore
//! use advisor_core::domain::knowledge::AdvisoryGraphBuilder;
//!
//! let builder = AdvisoryGraphBuilder::new(store);
//! let result = builder.build_advisory_graph(&extraction, "quarterly-review.md").await;
//! println!("{} nodes, {} relationships", result.nodes_created, result.relationships_created);
//! ```

mod builder;
mod graph;
mod node;
mod relationship;
mod store;

pub use builder::{AdvisoryGraphBuilder, GraphBuildResult};
pub use graph::{GraphSnapshot, GraphStats, KnowledgeGraphStore, UpsertOutcome};
pub use node::{KnowledgeGraphNode, NodeType};
pub use relationship::{KnowledgeGraphRelationship, NewRelationship, RelationshipType};
pub use store::{DocumentStore, NodeUpdate};
