//! Sparkify ETL Library
//!
//! Loads song metadata and user activity logs into a SQLite star schema.
//! The binaries are thin wrappers; the modules are exposed for testing.

pub mod collector;
pub mod config;
pub mod models;
pub mod pipeline;
pub mod resolver;
pub mod sqlite_persistence;
pub mod store;
pub mod transform;

// Re-export commonly used types for convenience
pub use pipeline::{process_data, DataKind, LoadSummary};
pub use store::{SqliteStarSchemaStore, StarSchemaStore};
