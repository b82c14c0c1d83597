//! The single cached dynamic address.
//!
//! [`AddressCache`] holds at most one [`CachedAddress`]. The address and
//! its fetch timestamp live in one value, so a reader can never observe one
//! without the other.

use std::sync::{PoisonError, RwLock};
use std::time::{Duration, SystemTime};

use serde::{Deserialize, Serialize};

use crate::time::{from_unix_millis, to_unix_millis};

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;

/// An address obtained from the lookup endpoint, with the time it was fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedAddress {
    /// Server address, e.g. `https://a.example`.
    pub address: String,

    /// When the address was fetched.
    #[serde(rename = "fetched_at_ms", with = "unix_millis")]
    pub fetched_at: SystemTime,
}

impl CachedAddress {
    /// Creates a cache entry.
    #[must_use]
    pub fn new(address: impl Into<String>, fetched_at: SystemTime) -> Self {
        Self {
            address: address.into(),
            fetched_at,
        }
    }

    /// Age of the entry at `now`. Timestamps in the future count as age zero.
    #[must_use]
    pub fn age(&self, now: SystemTime) -> Duration {
        now.duration_since(self.fetched_at).unwrap_or_default()
    }

    /// Returns true if the entry is older than `ttl` at `now`.
    #[must_use]
    pub fn is_expired(&self, ttl: Duration, now: SystemTime) -> bool {
        self.age(now) > ttl
    }
}

/// Process-wide cell holding the last-known dynamic address.
///
/// All operations are total. Writes replace the whole value under a write
/// lock; reads clone it out under a read lock.
#[derive(Debug)]
pub struct AddressCache {
    entry: RwLock<Option<CachedAddress>>,
    ttl: Duration,
}

impl AddressCache {
    /// Creates an empty cache with the given validity window.
    #[must_use]
    pub const fn new(ttl: Duration) -> Self {
        Self {
            entry: RwLock::new(None),
            ttl,
        }
    }

    /// Creates a cache pre-populated with a previously persisted entry.
    #[must_use]
    pub const fn with_entry(ttl: Duration, entry: Option<CachedAddress>) -> Self {
        Self {
            entry: RwLock::new(entry),
            ttl,
        }
    }

    /// The validity window.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the current entry, if any.
    #[must_use]
    pub fn get(&self) -> Option<CachedAddress> {
        self.entry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// True if the cache was never populated, or the entry is older than the TTL.
    #[must_use]
    pub fn is_expired(&self, now: SystemTime) -> bool {
        self.entry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_none_or(|entry| entry.is_expired(self.ttl, now))
    }

    /// Replaces the entry with `address` fetched at `now`.
    pub fn set(&self, address: impl Into<String>, now: SystemTime) {
        let entry = CachedAddress::new(address, now);
        *self.entry.write().unwrap_or_else(PoisonError::into_inner) = Some(entry);
    }

    /// Removes the entry.
    pub fn clear(&self) {
        *self.entry.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

/// Serde adapter storing a `SystemTime` as Unix milliseconds.
mod unix_millis {
    use std::time::SystemTime;

    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::{from_unix_millis, to_unix_millis};

    pub fn serialize<S: Serializer>(time: &SystemTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(to_unix_millis(*time))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<SystemTime, D::Error> {
        let millis = u64::deserialize(deserializer)?;
        from_unix_millis(millis)
            .ok_or_else(|| D::Error::custom(format!("timestamp {millis} ms is out of range")))
    }
}
