mod fault_injecting_store;
mod schema;
mod sqlite_store;
mod trait_def;

pub use fault_injecting_store::FaultInjectingStore;
pub use sqlite_store::{SqliteStarSchemaStore, TableCounts};
pub use trait_def::{SongMatch, StarSchemaStore};
