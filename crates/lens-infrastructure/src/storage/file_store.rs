//! File-backed key-value medium.

use std::fs;
use std::path::{Path, PathBuf};

use lens_core::error::{LensError, Result};
use lens_core::history::KeyValueStore;

use super::atomic_file::AtomicFile;

const VALUE_EXTENSION: &str = "json";

/// Stores each key as `<dir>/<key>.json`.
///
/// The total size of all values in the directory is bounded by
/// `capacity_bytes`; a `set` that would exceed it fails with
/// `LensError::StorageFull` and leaves the previous value in place.
pub struct FileKeyValueStore {
    dir: PathBuf,
    capacity_bytes: u64,
}

impl FileKeyValueStore {
    pub fn new(dir: impl Into<PathBuf>, capacity_bytes: u64) -> Self {
        Self {
            dir: dir.into(),
            capacity_bytes,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn capacity_bytes(&self) -> u64 {
        self.capacity_bytes
    }

    fn file_for(&self, key: &str) -> Result<AtomicFile> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(LensError::validation(format!("Invalid storage key '{key}'")));
        }
        Ok(AtomicFile::new(
            self.dir.join(format!("{key}.{VALUE_EXTENSION}")),
        ))
    }

    /// Bytes used by every stored value except `key`'s.
    fn used_bytes_excluding(&self, key: &str) -> Result<u64> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };

        let own_name = format!("{key}.{VALUE_EXTENSION}");
        let mut used = 0;
        for entry in entries {
            let entry = entry?;
            let path = entry.path();
            let is_value = path.extension().is_some_and(|ext| ext == VALUE_EXTENSION);
            if !is_value || entry.file_name().to_string_lossy() == own_name {
                continue;
            }
            used += entry.metadata()?.len();
        }
        Ok(used)
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.file_for(key)?.read()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let file = self.file_for(key)?;
        let _lock = file.lock()?;

        let required = self.used_bytes_excluding(key)? + value.len() as u64;
        if required > self.capacity_bytes {
            return Err(LensError::storage_full(format!(
                "{required} bytes needed, capacity is {} bytes",
                self.capacity_bytes
            )));
        }

        file.write(value)?;
        tracing::debug!("[Storage] Wrote {} bytes to '{}'", value.len(), key);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let file = self.file_for(key)?;
        let _lock = file.lock()?;
        file.remove()
    }
}
