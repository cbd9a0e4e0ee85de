//! Storage Module
//!
//! SQLite-based storage layer with:
//! - FTS5 full-text search with query sanitization and a LIKE fallback
//! - Embedded vector storage (behind the `vector-search` feature)
//! - FSRS-6 state persistence
//! - Bi-temporal validity and a knowledge graph of typed edges

mod migrations;
mod sqlite;

pub use migrations::MIGRATIONS;
pub use sqlite::{Result, Storage, StorageError};
