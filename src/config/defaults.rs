//! Default values for configuration options.

use std::path::PathBuf;
use std::time::Duration;

/// Address served while the testing override is active.
pub const TESTING_ADDRESS: &str = "http://localhost:8080";

/// Version string sent in the `X-EXT-VERSION` header.
pub const CLIENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Whether dynamic addressing is enabled when neither CLI nor file says otherwise.
pub const DYNAMIC_ENABLED: bool = true;

/// Default cache validity window in milliseconds (one hour).
pub const TTL_MS: u64 = 60 * 60 * 1000;

/// Default cache file name inside the application data directory.
pub const CACHE_FILE_NAME: &str = "cache.json";

/// Application directory name under the platform data directory.
pub const APP_DIR: &str = "dynaddr";

/// Default cache validity window as Duration.
#[must_use]
pub const fn ttl() -> Duration {
    Duration::from_millis(TTL_MS)
}

/// Default cache file location, if the platform has a local data directory.
#[must_use]
pub fn cache_file() -> Option<PathBuf> {
    dirs::data_local_dir().map(|dir| dir.join(APP_DIR).join(CACHE_FILE_NAME))
}
