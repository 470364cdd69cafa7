//! Key-value storage port used by the history store.

use crate::error::Result;

/// Storage key holding the serialized history ledger.
pub const HISTORY_STORAGE_KEY: &str = "lifestyle_lens_history";

/// A size-bounded string key-value medium.
///
/// This trait decouples the history store from the concrete medium
/// (files on disk, an in-memory map, ...). Every `set` replaces the whole
/// value for the key.
///
/// # Implementation Notes
///
/// - `set` must return `LensError::StorageFull` when the write would exceed
///   the medium's capacity, and leave the previous value in place.
/// - `remove` on a missing key is not an error.
pub trait KeyValueStore: Send + Sync {
    /// Reads the value stored under `key`.
    ///
    /// - `Ok(Some(value))`: value found
    /// - `Ok(None)`: key not present
    /// - `Err(_)`: the medium could not be read
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replaces the value stored under `key`.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes `key` and its value.
    fn remove(&self, key: &str) -> Result<()>;
}
