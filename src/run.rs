//! Application execution logic.
//!
//! This module wires the configured components together and runs one
//! subcommand: resolve the address, force a refresh, or clear the cache.

use std::sync::Arc;

use thiserror::Error;

use dynaddr::cache::CachedAddress;
use dynaddr::config::{Command, ValidatedConfig, defaults};
use dynaddr::context::AddressContext;
use dynaddr::fetcher::{AddressFetcher, HttpAddressFetcher};
use dynaddr::notice::{DefaultCatalog, RefreshNotice};
use dynaddr::refresh::{RefreshController, RefreshQueue, RefreshWorker, refresh_queue};
use dynaddr::resolver::AddressResolver;
use dynaddr::store::{CacheStore, FileCacheStore, LoadResult};
use dynaddr::time::{Clock, SystemClock};
use dynaddr::transport::ReqwestClient;

/// Fetcher used by the application; absent when dynamic addressing is off.
type AppFetcher = Option<HttpAddressFetcher<ReqwestClient>>;

/// Store used by the application; absent when persistence is disabled.
type AppStore = Option<FileCacheStore>;

type AppWorker = RefreshWorker<AppFetcher, AppStore, SystemClock>;

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;

/// Error type for runtime execution failures.
#[derive(Debug, Error)]
pub enum RunError {
    /// A forced refresh did not update the address.
    #[error("Server address refresh failed")]
    RefreshFailed,

    /// The refresh worker task panicked or was cancelled.
    #[error("Refresh worker stopped abnormally: {0}")]
    Worker(#[source] tokio::task::JoinError),
}

/// Resolver, queue and worker built from one configuration.
struct Components {
    resolver: AddressResolver,
    queue: RefreshQueue,
    worker: AppWorker,
}

/// Executes one subcommand.
///
/// `init` is handled before configuration is loaded and does nothing here.
///
/// # Errors
///
/// Returns an error if:
/// - A forced refresh fails (`refresh`)
/// - The refresh worker task dies
pub async fn execute(config: ValidatedConfig, command: Command) -> Result<(), RunError> {
    let components = build(&config);

    match command {
        Command::Resolve { endpoint } => {
            let Components {
                resolver,
                queue,
                mut worker,
            } = components;
            let output = resolve(&resolver, &queue, &mut worker, endpoint.as_deref()).await;
            println!("{output}");
            Ok(())
        }
        Command::Refresh => refresh(components).await,
        Command::Clear => {
            clear(components).await;
            Ok(())
        }
        Command::Init { .. } => Ok(()),
    }
}

/// Builds the shared context, the refresh pipeline and the resolver.
fn build(config: &ValidatedConfig) -> Components {
    let store = config.cache_file.as_ref().map(FileCacheStore::new);
    if let Some(ref store) = store {
        tracing::debug!("Cache persistence enabled: {}", store.path().display());
    }

    let context = Arc::new(AddressContext::new(
        config.resolver_settings(),
        config.server_address.clone(),
        load_cache(&store),
    ));

    let controller = RefreshController::new(Arc::clone(&context), create_fetcher(config), store);
    let (queue, worker) = refresh_queue(controller);
    let resolver = AddressResolver::new(context, queue.clone());

    Components {
        resolver,
        queue,
        worker,
    }
}

/// Loads the persisted cache entry, logging why nothing was loaded.
fn load_cache(store: &impl CacheStore) -> Option<CachedAddress> {
    let result = store.load();
    match &result {
        LoadResult::Loaded(Some(entry)) => {
            tracing::debug!(address = %entry.address, "Loaded cached server address");
        }
        LoadResult::Loaded(None) => tracing::debug!("Cached server address was cleared"),
        LoadResult::NotFound => {
            tracing::debug!("No cached server address found, starting empty");
        }
        LoadResult::Corrupted { reason } => {
            tracing::warn!("Cache file corrupted ({reason}), will overwrite on next save");
        }
    }
    result.into_entry()
}

/// Creates the lookup fetcher, if dynamic addressing is configured.
fn create_fetcher(config: &ValidatedConfig) -> AppFetcher {
    if !config.use_dynamic_address {
        return None;
    }

    config.lookup_url.clone().map(|url| {
        HttpAddressFetcher::new(ReqwestClient::new(), url, defaults::CLIENT_VERSION)
    })
}

/// Resolves the effective address, then finishes any refresh it needs.
///
/// A stale entry has already queued a refresh. An empty cache gets one here,
/// so the next run can serve the looked-up address.
async fn resolve<F, S, C>(
    resolver: &AddressResolver<C>,
    queue: &RefreshQueue,
    worker: &mut RefreshWorker<F, S, C>,
    endpoint: Option<&str>,
) -> String
where
    F: AddressFetcher,
    S: CacheStore,
    C: Clock,
{
    let output = match endpoint {
        Some(endpoint) => resolver.endpoint_url(endpoint),
        None => {
            let resolved = resolver.resolve_with_source();
            tracing::debug!(source = %resolved.source, "Resolved server address");
            resolved.address
        }
    };

    if resolver.context().cache().get().is_none() {
        queue.submit_scheduled();
    }

    let handled = worker.drain().await;
    if handled > 0 {
        tracing::debug!("Processed {handled} background refresh job(s)");
    }

    output
}

/// Forces a refresh through the queue and reports the outcome.
async fn refresh(components: Components) -> Result<(), RunError> {
    let Components {
        resolver,
        queue,
        worker,
    } = components;
    // The worker stops once every queue handle is gone.
    drop(resolver);

    let handle = tokio::spawn(worker.run());
    let refreshed = queue.force_refresh().await;
    drop(queue);
    handle.await.map_err(RunError::Worker)?;

    let notice = RefreshNotice::from_outcome(refreshed);
    println!("{}", notice.text(&DefaultCatalog));

    if notice.is_success() {
        Ok(())
    } else {
        Err(RunError::RefreshFailed)
    }
}

/// Clears the cached address and its persisted copy.
async fn clear(components: Components) {
    components.worker.controller().clear_cache().await;
    println!("Server address cache cleared");
}
