//! Effective server address resolution.
//!
//! Sources are consulted in priority order, first match wins:
//!
//! 1. the testing override, when active;
//! 2. the static default, when dynamic addressing is disabled;
//! 3. the cached dynamic address, fresh or stale;
//! 4. the static default.
//!
//! A stale cache entry is still served. A background refresh is submitted to
//! the refresh queue and the caller never waits for it.

use std::fmt;
use std::sync::Arc;

use crate::context::AddressContext;
use crate::refresh::RefreshQueue;
use crate::time::{Clock, SystemClock};

#[cfg(test)]
#[path = "resolver_tests.rs"]
mod tests;

/// Where a resolved address came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressSource {
    /// The testing override.
    Testing,
    /// The static default address.
    Static,
    /// A cache entry within its TTL.
    Cached,
    /// A cache entry past its TTL; a refresh was submitted.
    Stale,
}

impl fmt::Display for AddressSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Testing => "testing",
            Self::Static => "static",
            Self::Cached => "cached",
            Self::Stale => "stale",
        };
        f.write_str(name)
    }
}

/// A resolved address together with its source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    /// The address to use.
    pub address: String,
    /// Which source supplied it.
    pub source: AddressSource,
}

impl Resolved {
    fn new(address: impl Into<String>, source: AddressSource) -> Self {
        Self {
            address: address.into(),
            source,
        }
    }
}

/// Answers "which server address should be used right now".
///
/// Resolution is synchronous and does no I/O.
#[derive(Debug, Clone)]
pub struct AddressResolver<C = SystemClock> {
    context: Arc<AddressContext<C>>,
    queue: RefreshQueue,
}

impl<C: Clock> AddressResolver<C> {
    /// Creates a resolver reading `context` and submitting refreshes to `queue`.
    #[must_use]
    pub const fn new(context: Arc<AddressContext<C>>, queue: RefreshQueue) -> Self {
        Self { context, queue }
    }

    /// Returns the effective server address.
    #[must_use]
    pub fn resolve(&self) -> String {
        self.resolve_with_source().address
    }

    /// Returns the effective server address and where it came from.
    #[must_use]
    pub fn resolve_with_source(&self) -> Resolved {
        let settings = self.context.settings();

        if settings.testing_override {
            return Resolved::new(settings.testing_address.as_str(), AddressSource::Testing);
        }

        if settings.use_dynamic_address {
            if let Some(entry) = self.context.cache().get() {
                let now = self.context.now();
                if !entry.is_expired(self.context.cache().ttl(), now) {
                    return Resolved::new(entry.address, AddressSource::Cached);
                }

                tracing::debug!("Using expired dynamic server address, updating in background");
                if !self.queue.submit_scheduled() {
                    tracing::warn!("Refresh worker is not running, background update dropped");
                }
                return Resolved::new(entry.address, AddressSource::Stale);
            }
        }

        Resolved::new(self.context.fallback_address(), AddressSource::Static)
    }

    /// Builds a full API URL by appending `endpoint` to the resolved address.
    ///
    /// ```ignore
    /// assert_eq!(resolver.endpoint_url("/api/v1/segments"), "https://a.example/api/v1/segments");
    /// ```
    #[must_use]
    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}{endpoint}", self.resolve())
    }

    /// The shared context.
    #[must_use]
    pub const fn context(&self) -> &Arc<AddressContext<C>> {
        &self.context
    }
}
