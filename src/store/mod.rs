//! Durable storage for the address cache.
//!
//! The cache survives restarts by being written to a [`CacheStore`] after
//! every successful refresh and every explicit clear.

mod file;

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;

pub use file::FileCacheStore;

use std::io;

use thiserror::Error;

use crate::cache::CachedAddress;

/// Result of loading the cache from persistent storage.
///
/// Explicitly models all valid states:
/// - Previously saved state, which may itself be an empty cache
/// - No saved state (first run)
/// - Saved state exists but is unreadable
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadResult {
    /// Successfully loaded. `None` means the cache was saved empty (cleared).
    Loaded(Option<CachedAddress>),

    /// No cache file exists.
    NotFound,

    /// Cache file exists but could not be parsed.
    /// The caller starts empty and overwrites on next save.
    Corrupted {
        /// Reason for corruption (for logging).
        reason: String,
    },
}

impl LoadResult {
    /// Returns the loaded entry, or `None` for every other outcome.
    #[must_use]
    pub fn into_entry(self) -> Option<CachedAddress> {
        match self {
            Self::Loaded(entry) => entry,
            Self::NotFound | Self::Corrupted { .. } => None,
        }
    }
}

/// Errors that can occur while saving the cache.
///
/// Read-side problems are modeled as [`LoadResult`] variants instead.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to write the cache file.
    #[error("Failed to write cache file: {0}")]
    Write(#[source] io::Error),

    /// Failed to serialize the cache.
    #[error("Failed to serialize cache: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// Persistence for the single cached address.
///
/// Implementations should:
/// - Replace the saved value atomically
/// - Return `LoadResult::NotFound` when nothing was saved yet
/// - Return `LoadResult::Corrupted` instead of failing on bad content
pub trait CacheStore: Send + Sync {
    /// Loads the previously saved cache.
    fn load(&self) -> LoadResult;

    /// Saves the cache; `None` records an empty (cleared) cache.
    ///
    /// # Errors
    ///
    /// Returns an error if the cache cannot be written.
    fn save(
        &self,
        entry: Option<&CachedAddress>,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;
}

/// Store that keeps nothing between runs.
///
/// Used when no cache file is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct EphemeralStore;

impl CacheStore for EphemeralStore {
    fn load(&self) -> LoadResult {
        LoadResult::NotFound
    }

    async fn save(&self, _entry: Option<&CachedAddress>) -> Result<(), StoreError> {
        Ok(())
    }
}

/// An unconfigured store behaves like [`EphemeralStore`].
impl<S: CacheStore> CacheStore for Option<S> {
    fn load(&self) -> LoadResult {
        self.as_ref().map_or(LoadResult::NotFound, |store| store.load())
    }

    async fn save(&self, entry: Option<&CachedAddress>) -> Result<(), StoreError> {
        match self {
            Some(store) => store.save(entry).await,
            None => Ok(()),
        }
    }
}
