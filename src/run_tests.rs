//! Tests for the run module.

use super::*;

use std::path::Path;
use std::time::SystemTime;

use dynaddr::config::Cli;
use dynaddr::resolver::AddressSource;
use tempfile::TempDir;

fn config(args: &[&str]) -> ValidatedConfig {
    let mut full_args = vec!["dynaddr"];
    full_args.extend(args);
    ValidatedConfig::from_raw(&Cli::parse_from_iter(full_args), None).unwrap()
}

/// Dynamic addressing on, persisting to `cache_file`.
fn dynamic_config(cache_file: &Path) -> ValidatedConfig {
    config(&[
        "--server-address",
        "https://static.example",
        "--lookup-url",
        "https://lookup.example/address",
        "--cache-file",
        cache_file.to_str().unwrap(),
    ])
}

/// Dynamic addressing off, nothing persisted.
fn static_config() -> ValidatedConfig {
    config(&[
        "--server-address",
        "https://static.example",
        "--static-only",
        "--no-persist",
    ])
}

async fn persist(path: &Path, entry: Option<&CachedAddress>) {
    FileCacheStore::new(path).save(entry).await.unwrap();
}

mod run_error {
    use super::*;

    #[test]
    fn refresh_failed_displays_message() {
        let error = RunError::RefreshFailed;
        assert_eq!(error.to_string(), "Server address refresh failed");
    }

    #[test]
    fn debug_format_works() {
        let error = RunError::RefreshFailed;
        let debug_str = format!("{error:?}");
        assert!(debug_str.contains("RefreshFailed"));
    }
}

mod load_cache {
    use super::*;

    #[test]
    fn missing_store_loads_nothing() {
        let store: AppStore = None;
        assert!(load_cache(&store).is_none());
    }

    #[test]
    fn missing_file_loads_nothing() {
        let dir = TempDir::new().unwrap();
        let store = FileCacheStore::new(dir.path().join("cache.json"));

        assert!(load_cache(&store).is_none());
    }

    #[test]
    fn corrupted_file_loads_nothing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(load_cache(&FileCacheStore::new(path)).is_none());
    }

    #[tokio::test]
    async fn saved_entry_is_loaded() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");
        let entry = CachedAddress::new("https://dynamic.example", SystemTime::UNIX_EPOCH);
        persist(&path, Some(&entry)).await;

        assert_eq!(load_cache(&FileCacheStore::new(path)), Some(entry));
    }
}

mod create_fetcher {
    use super::*;

    #[test]
    fn creates_fetcher_for_lookup_url() {
        let dir = TempDir::new().unwrap();
        let config = dynamic_config(&dir.path().join("cache.json"));

        let fetcher = create_fetcher(&config).unwrap();

        assert_eq!(fetcher.url().as_str(), "https://lookup.example/address");
        assert_eq!(fetcher.timeout(), HttpAddressFetcher::<ReqwestClient>::TIMEOUT);
    }

    #[test]
    fn no_fetcher_when_static_only() {
        assert!(create_fetcher(&static_config()).is_none());
    }
}

mod build {
    use super::*;

    #[test]
    fn static_only_resolves_to_server_address() {
        let components = build(&static_config());

        let resolved = components.resolver.resolve_with_source();

        assert_eq!(resolved.address, "https://static.example");
        assert_eq!(resolved.source, AddressSource::Static);
    }

    #[tokio::test]
    async fn fresh_persisted_entry_is_served() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");
        let entry = CachedAddress::new("https://dynamic.example", SystemTime::now());
        persist(&path, Some(&entry)).await;

        let mut components = build(&dynamic_config(&path));
        let resolved = components.resolver.resolve_with_source();

        assert_eq!(resolved.address, "https://dynamic.example");
        assert_eq!(resolved.source, AddressSource::Cached);
        assert_eq!(components.worker.drain().await, 0);
    }

    #[test]
    fn testing_flag_overrides_everything() {
        let components = build(&config(&[
            "--server-address",
            "https://static.example",
            "--static-only",
            "--no-persist",
            "--testing",
        ]));

        assert_eq!(
            components.resolver.resolve(),
            defaults::TESTING_ADDRESS.to_string()
        );
    }
}

mod execute {
    use super::*;

    #[tokio::test]
    async fn resolve_succeeds_with_static_address() {
        let result = execute(static_config(), Command::Resolve { endpoint: None }).await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn refresh_fails_when_dynamic_disabled() {
        let result = execute(static_config(), Command::Refresh).await;

        assert!(matches!(result, Err(RunError::RefreshFailed)));
    }

    #[tokio::test]
    async fn clear_persists_empty_cache() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");
        let entry = CachedAddress::new("https://dynamic.example", SystemTime::now());
        persist(&path, Some(&entry)).await;

        execute(dynamic_config(&path), Command::Clear).await.unwrap();

        assert_eq!(FileCacheStore::new(&path).load(), LoadResult::Loaded(None));
    }
}

mod resolve {
    use super::*;
    use dynaddr::context::ResolverSettings;
    use dynaddr::fetcher::FetchError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Fetcher that always returns the same address and counts lookups.
    struct StubFetcher {
        address: &'static str,
        calls: AtomicUsize,
    }

    impl StubFetcher {
        fn new(address: &'static str) -> Self {
            Self {
                address,
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl AddressFetcher for StubFetcher {
        async fn fetch(&self) -> Result<String, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.address.to_string())
        }
    }

    type StubWorker = RefreshWorker<StubFetcher, FileCacheStore, SystemClock>;

    fn pipeline(path: &Path) -> (AddressResolver, RefreshQueue, StubWorker) {
        let store = FileCacheStore::new(path);
        let settings = ResolverSettings {
            use_dynamic_address: true,
            testing_override: false,
            testing_address: defaults::TESTING_ADDRESS.to_string(),
            ttl: Duration::from_secs(3600),
        };
        let context = Arc::new(AddressContext::new(
            settings,
            "https://static.example",
            load_cache(&store),
        ));
        let controller = RefreshController::new(
            Arc::clone(&context),
            StubFetcher::new("https://dynamic.example"),
            store,
        );
        let (queue, worker) = refresh_queue(controller);
        (AddressResolver::new(context, queue.clone()), queue, worker)
    }

    #[tokio::test]
    async fn empty_cache_is_filled_and_persisted() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");
        let (resolver, queue, mut worker) = pipeline(&path);

        let output = resolve(&resolver, &queue, &mut worker, None).await;

        assert_eq!(output, "https://static.example");
        assert_eq!(worker.controller().fetcher().calls(), 1);
        let saved = FileCacheStore::new(&path).load().into_entry().unwrap();
        assert_eq!(saved.address, "https://dynamic.example");
    }

    #[tokio::test]
    async fn next_run_serves_persisted_address() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");
        let (resolver, queue, mut worker) = pipeline(&path);
        resolve(&resolver, &queue, &mut worker, None).await;

        let (resolver, queue, mut worker) = pipeline(&path);
        let output = resolve(&resolver, &queue, &mut worker, Some("/api/status")).await;

        assert_eq!(output, "https://dynamic.example/api/status");
        assert_eq!(worker.controller().fetcher().calls(), 0);
    }

    #[tokio::test]
    async fn fresh_cache_makes_no_lookup() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");
        let entry = CachedAddress::new("https://cached.example", SystemTime::now());
        persist(&path, Some(&entry)).await;
        let (resolver, queue, mut worker) = pipeline(&path);

        let output = resolve(&resolver, &queue, &mut worker, None).await;

        assert_eq!(output, "https://cached.example");
        assert_eq!(worker.controller().fetcher().calls(), 0);
    }
}
