//! Scheduled and forced refresh of the address cache.

use std::sync::Arc;

use crate::context::AddressContext;
use crate::fetcher::AddressFetcher;
use crate::store::{CacheStore, EphemeralStore};
use crate::time::{Clock, SystemClock};

/// Performs lookups and commits their results.
///
/// Both entry points share one procedure: fetch once, and on success
/// replace the cache entry, overwrite the fallback address with the same
/// value, and persist the cache. A failed lookup writes nothing.
///
/// # Type Parameters
///
/// - `F`: the address fetcher
/// - `S`: the cache store (defaults to [`EphemeralStore`])
/// - `C`: the clock (defaults to [`SystemClock`])
#[derive(Debug)]
pub struct RefreshController<F, S = EphemeralStore, C = SystemClock> {
    context: Arc<AddressContext<C>>,
    fetcher: F,
    store: S,
}

impl<F, S, C> RefreshController<F, S, C> {
    /// Creates a controller over the shared context.
    #[must_use]
    pub const fn new(context: Arc<AddressContext<C>>, fetcher: F, store: S) -> Self {
        Self {
            context,
            fetcher,
            store,
        }
    }

    /// The shared context.
    #[must_use]
    pub const fn context(&self) -> &Arc<AddressContext<C>> {
        &self.context
    }

    /// The address fetcher.
    #[must_use]
    pub const fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// The cache store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }
}

impl<F: AddressFetcher, S: CacheStore, C: Clock> RefreshController<F, S, C> {
    /// Refreshes the cache if dynamic addressing is on and the cache is expired.
    ///
    /// Otherwise does nothing, so callers need not check expiry first.
    /// Failures are logged and never reach the caller.
    pub async fn scheduled_refresh(&self) {
        if !self.context.settings().use_dynamic_address {
            return;
        }

        if !self.context.is_cache_expired() {
            tracing::debug!("Dynamic server address cache is still valid");
            return;
        }

        tracing::debug!("Updating dynamic server address cache");
        if !self.fetch_and_commit().await {
            tracing::warn!("Dynamic server address not updated, keeping last known address");
        }
    }

    /// Refreshes the cache regardless of freshness.
    ///
    /// Returns `false` without a lookup when dynamic addressing is disabled,
    /// otherwise whether the lookup succeeded.
    pub async fn force_refresh(&self) -> bool {
        if !self.context.settings().use_dynamic_address {
            tracing::warn!("Dynamic server address is disabled, refresh skipped");
            return false;
        }

        tracing::info!("Force refreshing server address");
        self.fetch_and_commit().await
    }

    /// Empties the cache and persists the empty state. No lookup is made.
    pub async fn clear_cache(&self) {
        self.context.cache().clear();
        self.persist().await;
        tracing::info!("Server address cache cleared");
    }

    async fn fetch_and_commit(&self) -> bool {
        match self.fetcher.fetch().await {
            Ok(address) => {
                self.commit(address).await;
                true
            }
            Err(e) => {
                tracing::warn!("Failed to fetch dynamic server address: {e}");
                false
            }
        }
    }

    async fn commit(&self, address: String) {
        let now = self.context.now();
        self.context.cache().set(address.clone(), now);
        self.context.set_fallback_address(address.clone());
        tracing::info!(%address, "Server address refreshed");

        self.persist().await;
    }

    /// Persisting is best effort; the in-memory value stays authoritative.
    async fn persist(&self) {
        let entry = self.context.cache().get();
        if let Err(e) = self.store.save(entry.as_ref()).await {
            tracing::error!("Failed to save address cache: {e}");
        }
    }
}
