//! Saved project history.
//!
//! This module contains the saved project model, the key-value storage port
//! and the store that keeps the two consistent.

pub mod model;
pub mod storage;
pub mod store;

pub use model::SavedProject;
pub use storage::{HISTORY_STORAGE_KEY, KeyValueStore};
pub use store::{Durability, HistoryStore, WriteOutcome};
