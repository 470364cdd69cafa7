//! Key-value media backing the history store.

pub mod atomic_file;
pub mod file_store;
pub mod memory_store;

pub use atomic_file::AtomicFile;
pub use file_store::FileKeyValueStore;
pub use memory_store::InMemoryKeyValueStore;
