//! Persistent storage module
//!
//! This module provides the key-value substrate the favorites collection and
//! the display preference are persisted in, plus a typed adapter on top of
//! it. Values are stored as JSON strings.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::catalog::MovieSummary;
use crate::preference::DisplayPreference;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Key under which the favorites collection is stored.
pub const FAVORITES_KEY: &str = "favorites";

/// Key under which the display preference is stored.
pub const PREFERENCE_KEY: &str = "darkMode";

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to determine the data directory location
    #[error("Failed to determine data directory location")]
    DataDirectoryNotFound,

    /// Failed to create or access the data directory
    #[error("Failed to create data directory at {path}: {source}")]
    DirectoryCreationFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to read a stored value
    #[error("Failed to read store file {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to write a stored value
    #[error("Failed to write store file {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to serialize or deserialize a stored value
    #[error("Failed to (de)serialize stored value: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The backing store refused the operation
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// A string key to string value store that survives process restarts.
pub trait KeyValueStore {
    /// Returns the value stored under `key`, or `None` if there is none.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }
}

/// Typed access to the two persisted values.
///
/// Reads never fail: a missing, unreadable or corrupt value is reported as
/// absent. Writes return their error so callers can decide what to do.
#[derive(Debug, Clone)]
pub struct StoreAdapter<S> {
    store: S,
}

impl<S> StoreAdapter<S>
where
    S: KeyValueStore,
{
    /// Wraps a key-value store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns the underlying store.
    pub fn inner(&self) -> &S {
        &self.store
    }

    /// Reads the persisted favorites collection, empty if absent or corrupt.
    pub fn read_favorites(&self) -> Vec<MovieSummary> {
        self.read_json(FAVORITES_KEY).unwrap_or_default()
    }

    /// Persists the favorites collection.
    pub fn write_favorites(&self, favorites: &[MovieSummary]) -> Result<(), StoreError> {
        self.write_json(FAVORITES_KEY, favorites)
    }

    /// Reads the persisted display preference, if any.
    pub fn read_preference(&self) -> Option<DisplayPreference> {
        self.read_json(PREFERENCE_KEY)
    }

    /// Persists the display preference.
    pub fn write_preference(&self, preference: DisplayPreference) -> Result<(), StoreError> {
        self.write_json(PREFERENCE_KEY, &preference)
    }

    fn read_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.store.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to read stored value, treating as absent");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key, error = %e, "stored value is corrupt, treating as absent");
                None
            }
        }
    }

    fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let content = serde_json::to_string(value)?;
        self.store.set(key, &content)
    }
}

/// Sanitizes a key for use in file names
///
/// Converts to lowercase and replaces all characters that are not
/// a-z, 0-9, or hyphen with underscores.
pub(crate) fn sanitize_key(key: &str) -> String {
    key.to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
