//! File-backed key-value store
//!
//! Each key is kept in its own JSON file inside the application's data
//! directory. Writes go to a temporary file first and are then renamed over
//! the target, so a crash never leaves a half-written value behind.

use super::{KeyValueStore, StoreError, sanitize_key};
use std::fs;
use std::path::{Path, PathBuf};

/// A key-value store persisting each key as a file in one directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    /// The directory where values are stored
    dir: PathBuf,
}

impl FileStore {
    /// Opens the store in the system's standard data directory
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let store = FileStore::open()?;
    /// store.set("favorites", "[]")?;
    /// ```
    pub fn open() -> Result<Self, StoreError> {
        let proj_dirs = directories::ProjectDirs::from("org", "movieshelf", "movie-shelf")
            .ok_or(StoreError::DataDirectoryNotFound)?;

        Self::at(proj_dirs.data_dir())
    }

    /// Opens the store in an explicit directory, creating it if needed.
    pub fn at(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();

        fs::create_dir_all(&dir).map_err(|e| StoreError::DirectoryCreationFailed {
            path: dir.clone(),
            source: e,
        })?;

        tracing::debug!(path = ?dir, "opened file store");

        Ok(Self { dir })
    }

    /// Returns the directory values are stored in
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", sanitize_key(key)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let file_path = self.path_for(key);

        if !file_path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&file_path).map_err(|e| StoreError::ReadFailed {
            path: file_path,
            source: e,
        })?;

        Ok(Some(content))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let file_path = self.path_for(key);
        let tmp_path = file_path.with_extension("json.tmp");

        tracing::trace!(path = ?file_path, "writing store value");

        fs::write(&tmp_path, value).map_err(|e| StoreError::WriteFailed {
            path: tmp_path.clone(),
            source: e,
        })?;

        fs::rename(&tmp_path, &file_path).map_err(|e| StoreError::WriteFailed {
            path: file_path,
            source: e,
        })?;

        Ok(())
    }
}
