//! Local store implementations

pub mod memory;
pub mod sqlite;

pub use memory::InMemoryLocalStore;
pub use sqlite::SqliteLocalStore;
