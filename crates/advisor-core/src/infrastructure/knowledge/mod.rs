//! Knowledge graph document stores
//!
//! SQLite for persistent graphs, memory for tests and offline runs.

mod memory;
mod sqlite;

pub use memory::MemoryDocumentStore;
pub use sqlite::SqliteDocumentStore;
