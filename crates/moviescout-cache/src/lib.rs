// Durable key-value storage for client-side state
// Keeps favorites around between runs, the way a browser's local storage would

pub mod memory;
pub mod sqlite;
pub mod store;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use store::{KeyValueStore, Result, StorageError};
