//! Atomic whole-file replacement.
//!
//! Provides a thin layer for safe writes of small text files: every write
//! goes to a temporary sibling, is fsynced and then renamed over the target,
//! so readers only ever see the old or the new content.

use std::fs::{self, File, OpenOptions};
use std::io::Write as IoWrite;
use std::path::{Path, PathBuf};

use lens_core::error::{LensError, Result};

/// A handle to a text file replaced atomically on every write.
pub struct AtomicFile {
    path: PathBuf,
}

impl AtomicFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the file.
    ///
    /// - `Ok(Some(content))`: file exists
    /// - `Ok(None)`: file doesn't exist
    pub fn read(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Replaces the file content atomically.
    ///
    /// On failure the temporary file is removed and the previous content is
    /// left untouched.
    pub fn write(&self, content: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let tmp_path = self.temp_path()?;
        let written = Self::write_synced(&tmp_path, content);
        if let Err(e) = written {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }

        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    /// Deletes the file. A missing file is not an error.
    pub fn remove(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Acquires an exclusive lock guarding this file.
    ///
    /// The guard releases the lock when dropped.
    pub fn lock(&self) -> Result<FileLock> {
        FileLock::acquire(&self.path)
    }

    fn write_synced(path: &Path, content: &str) -> std::io::Result<()> {
        let mut tmp_file = File::create(path)?;
        tmp_file.write_all(content.as_bytes())?;
        tmp_file.sync_all()
    }

    fn temp_path(&self) -> Result<PathBuf> {
        let parent = self
            .path
            .parent()
            .ok_or_else(|| LensError::io("Path has no parent directory"))?;
        let file_name = self
            .path
            .file_name()
            .ok_or_else(|| LensError::io("Path has no file name"))?;

        let tmp_name = format!(".{}.tmp", file_name.to_string_lossy());
        Ok(parent.join(tmp_name))
    }
}

/// A file lock guard that releases the lock when dropped.
///
/// The `.lock` file itself is left on disk; removing it while held would let
/// two processes lock different inodes under the same name.
pub struct FileLock {
    #[allow(dead_code)]
    file: File,
}

impl FileLock {
    fn acquire(path: &Path) -> Result<Self> {
        let lock_path = path.with_extension("lock");

        if let Some(parent) = lock_path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;

        #[cfg(unix)]
        {
            use fs2::FileExt;
            file.lock_exclusive()
                .map_err(|e| LensError::io(format!("Failed to acquire lock: {}", e)))?;
        }

        Ok(FileLock { file })
    }
}
