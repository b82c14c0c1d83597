//! Time abstraction for testability.
//!
//! Cache freshness is judged against a [`Clock`], so tests can move time
//! forward instead of sleeping through a TTL.

use std::time::{Duration, SystemTime};

/// Abstraction over system time.
///
/// # Example
///
/// ```
/// use dynaddr::time::{Clock, SystemClock};
///
/// let clock = SystemClock;
/// let now = clock.now();
/// assert!(now >= std::time::SystemTime::UNIX_EPOCH);
/// ```
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> SystemTime;
}

/// Production clock using actual system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// Converts a timestamp to whole milliseconds since the Unix epoch.
///
/// Pre-epoch timestamps clamp to 0.
#[must_use]
pub fn to_unix_millis(time: SystemTime) -> u64 {
    let millis = time
        .duration_since(SystemTime::UNIX_EPOCH)
        .map_or(0, |d| d.as_millis());
    u64::try_from(millis).unwrap_or(u64::MAX)
}

/// Converts milliseconds since the Unix epoch back to a timestamp.
///
/// Returns `None` if the platform's `SystemTime` cannot represent it.
#[must_use]
pub fn from_unix_millis(millis: u64) -> Option<SystemTime> {
    SystemTime::UNIX_EPOCH.checked_add(Duration::from_millis(millis))
}
