//! File-based cache persistence.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::cache::CachedAddress;

use super::{CacheStore, LoadResult, StoreError};

/// Current cache file format version.
///
/// Increment this when making breaking changes to the format.
const CACHE_FILE_VERSION: u32 = 1;

/// On-disk cache file format.
///
/// Incompatible versions are treated as corrupted (no migration).
#[derive(Debug, Serialize, Deserialize)]
struct CacheFile {
    version: u32,
    cache: Option<CachedAddress>,
}

/// File-based implementation of [`CacheStore`].
///
/// Stores the cache as JSON with write-to-temp-then-rename semantics, so the
/// file always holds either the previous or the new value, never a mix.
#[derive(Debug, Clone)]
pub struct FileCacheStore {
    path: PathBuf,
}

impl FileCacheStore {
    /// Creates a store backed by the file at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the path to the cache file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save_blocking(path: &Path, file: &CacheFile) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(file).map_err(StoreError::Serialize)?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(StoreError::Write)?;
            }
        }

        // cache.json -> cache.json.tmp
        let temp_path = PathBuf::from(format!("{}.tmp", path.display()));

        std::fs::write(&temp_path, content).map_err(StoreError::Write)?;
        std::fs::rename(&temp_path, path).map_err(StoreError::Write)?;

        Ok(())
    }
}

impl CacheStore for FileCacheStore {
    fn load(&self) -> LoadResult {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return LoadResult::NotFound,
            Err(e) => {
                return LoadResult::Corrupted {
                    reason: format!("Failed to read file: {e}"),
                };
            }
        };

        match serde_json::from_str::<CacheFile>(&content) {
            Ok(file) if file.version == CACHE_FILE_VERSION => LoadResult::Loaded(file.cache),
            Ok(file) => LoadResult::Corrupted {
                reason: format!(
                    "Incompatible version: expected {CACHE_FILE_VERSION}, got {}",
                    file.version
                ),
            },
            Err(e) => LoadResult::Corrupted {
                reason: format!("Invalid JSON: {e}"),
            },
        }
    }

    async fn save(&self, entry: Option<&CachedAddress>) -> Result<(), StoreError> {
        let path = self.path.clone();
        let file = CacheFile {
            version: CACHE_FILE_VERSION,
            cache: entry.cloned(),
        };

        tokio::task::spawn_blocking(move || Self::save_blocking(&path, &file))
            .await
            .map_err(|e| StoreError::Write(std::io::Error::other(e)))?
    }
}
