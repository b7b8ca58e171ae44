// Workshop persistence
// Named session snapshots stored as one JSON collection in host key-value storage

pub mod error;
pub mod storage;
pub mod store;
pub mod types;

pub use error::{StorageError, StoreError};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use store::{WorkshopStore, DEFAULT_STORAGE_KEY};
pub use types::{NewWorkshop, Workshop};
