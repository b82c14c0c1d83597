//! Shared resolution context.
//!
//! [`AddressContext`] is the one object that holds everything resolution
//! depends on: read-only settings, the mutable fallback address, the cache
//! and the clock. The refresh controller owns it through an `Arc` and the
//! resolver reads it through a clone of that `Arc`.

use std::sync::{PoisonError, RwLock};
use std::time::{Duration, SystemTime};

use crate::cache::{AddressCache, CachedAddress};
use crate::time::{Clock, SystemClock};

/// Read-only resolution settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverSettings {
    /// Whether the remote lookup may override the static default.
    pub use_dynamic_address: bool,
    /// When true, resolution always yields `testing_address`.
    pub testing_override: bool,
    /// Address used while the testing override is active.
    pub testing_address: String,
    /// Cache validity window.
    pub ttl: Duration,
}

/// Settings, fallback address, cache and clock shared by resolver and controller.
#[derive(Debug)]
pub struct AddressContext<C = SystemClock> {
    settings: ResolverSettings,
    fallback: RwLock<String>,
    cache: AddressCache,
    clock: C,
}

impl AddressContext<SystemClock> {
    /// Creates a context backed by the system clock.
    ///
    /// `entry` seeds the cache, e.g. with a previously persisted value.
    #[must_use]
    pub fn new(
        settings: ResolverSettings,
        static_default: impl Into<String>,
        entry: Option<CachedAddress>,
    ) -> Self {
        Self::with_clock(settings, static_default, entry, SystemClock)
    }
}

impl<C: Clock> AddressContext<C> {
    /// Creates a context with an explicit clock.
    ///
    /// The cache validity window is always `settings.ttl`.
    #[must_use]
    pub fn with_clock(
        settings: ResolverSettings,
        static_default: impl Into<String>,
        entry: Option<CachedAddress>,
        clock: C,
    ) -> Self {
        Self {
            cache: AddressCache::with_entry(settings.ttl, entry),
            settings,
            fallback: RwLock::new(static_default.into()),
            clock,
        }
    }

    /// The resolution settings.
    #[must_use]
    pub const fn settings(&self) -> &ResolverSettings {
        &self.settings
    }

    /// The dynamic address cache.
    #[must_use]
    pub const fn cache(&self) -> &AddressCache {
        &self.cache
    }

    /// The clock freshness is judged against.
    #[must_use]
    pub const fn clock(&self) -> &C {
        &self.clock
    }

    /// Current time according to the context clock.
    #[must_use]
    pub fn now(&self) -> SystemTime {
        self.clock.now()
    }

    /// True if the cache is empty or older than the TTL right now.
    #[must_use]
    pub fn is_cache_expired(&self) -> bool {
        self.cache.is_expired(self.now())
    }

    /// The static default address (the last successful lookup, once one succeeded).
    #[must_use]
    pub fn fallback_address(&self) -> String {
        self.fallback
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replaces the static default address.
    pub fn set_fallback_address(&self, address: impl Into<String>) {
        *self.fallback.write().unwrap_or_else(PoisonError::into_inner) = address.into();
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn fallback_starts_at_static_default() {
        let ctx = context(settings());
        assert_eq!(ctx.fallback_address(), STATIC_DEFAULT);
    }

    #[test]
    fn set_fallback_replaces_address() {
        let ctx = context(settings());
        ctx.set_fallback_address("https://a.example");
        assert_eq!(ctx.fallback_address(), "https://a.example");
    }

    #[test]
    fn cache_expiry_follows_context_clock() {
        let ctx = context(settings());
        ctx.cache().set("https://a.example", ctx.now());
        assert!(!ctx.is_cache_expired());

        ctx.clock().advance(Duration::from_millis(2000));
        assert!(ctx.is_cache_expired());
    }

    #[test]
    fn cache_uses_settings_ttl() {
        let ctx = context(ResolverSettings {
            ttl: Duration::from_millis(60_000),
            ..settings()
        });

        assert_eq!(ctx.cache().ttl(), ctx.settings().ttl);
    }

    #[test]
    fn seeded_entry_is_served_from_cache() {
        let entry = CachedAddress::new("https://a.example", crate::time::from_unix_millis(T0).unwrap());
        let ctx = AddressContext::with_clock(
            settings(),
            STATIC_DEFAULT,
            Some(entry.clone()),
            crate::time::mock::MockClock::new(T0),
        );

        assert_eq!(ctx.cache().get(), Some(entry));
        assert!(!ctx.is_cache_expired());
    }

    #[test]
    fn empty_cache_is_expired() {
        let ctx = context(settings());
        assert!(ctx.is_cache_expired());
    }

    #[test]
    fn context_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<AddressContext>();
    }
}
