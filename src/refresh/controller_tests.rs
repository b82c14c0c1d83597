//! Tests for `RefreshController`.

use std::sync::Arc;
use std::time::Duration;

use super::RefreshController;
use crate::cache::CachedAddress;
use crate::context::ResolverSettings;
use crate::context::fixtures::{STATIC_DEFAULT, context, settings};
use crate::fetcher::FetchError;
use crate::fetcher::mock::MockFetcher;
use crate::store::mock::MockCacheStore;
use crate::time::mock::MockClock;

type Controller = RefreshController<MockFetcher, MockCacheStore, MockClock>;

fn controller(settings: ResolverSettings, fetcher: MockFetcher) -> Controller {
    RefreshController::new(
        Arc::new(context(settings)),
        fetcher,
        MockCacheStore::empty(),
    )
}

fn server_error() -> FetchError {
    FetchError::BadStatus(http::StatusCode::INTERNAL_SERVER_ERROR)
}

fn disabled() -> ResolverSettings {
    ResolverSettings {
        use_dynamic_address: false,
        ..settings()
    }
}

mod scheduled_refresh {
    use super::*;

    #[tokio::test]
    async fn populates_empty_cache() {
        let controller = controller(settings(), MockFetcher::returning("https://a.example"));

        controller.scheduled_refresh().await;

        let ctx = controller.context();
        assert_eq!(
            ctx.cache().get(),
            Some(CachedAddress::new("https://a.example", ctx.now()))
        );
        assert!(!ctx.is_cache_expired());
    }

    #[tokio::test]
    async fn success_updates_fallback_address() {
        let controller = controller(settings(), MockFetcher::returning("https://a.example"));

        controller.scheduled_refresh().await;

        assert_eq!(controller.context().fallback_address(), "https://a.example");
    }

    #[tokio::test]
    async fn success_persists_new_entry() {
        let controller = controller(settings(), MockFetcher::returning("https://a.example"));

        controller.scheduled_refresh().await;

        let saves = controller.store().saves();
        assert_eq!(saves.len(), 1);
        assert_eq!(saves[0].as_ref().unwrap().address, "https://a.example");
    }

    #[tokio::test]
    async fn skipped_when_dynamic_disabled() {
        let controller = controller(disabled(), MockFetcher::default());

        controller.scheduled_refresh().await;

        assert_eq!(controller.fetcher().calls(), 0);
        assert!(controller.context().cache().get().is_none());
    }

    #[tokio::test]
    async fn twice_on_fresh_cache_makes_no_lookup() {
        let controller = controller(settings(), MockFetcher::default());
        let ctx = controller.context();
        ctx.cache().set("https://a.example", ctx.now());

        controller.scheduled_refresh().await;
        controller.scheduled_refresh().await;

        assert_eq!(controller.fetcher().calls(), 0);
        assert!(controller.store().saves().is_empty());
    }

    #[tokio::test]
    async fn refreshes_expired_entry() {
        let controller = controller(settings(), MockFetcher::returning("https://new.example"));
        let ctx = controller.context();
        ctx.cache().set("https://old.example", ctx.now());
        ctx.clock().advance(Duration::from_millis(2000));

        controller.scheduled_refresh().await;

        assert_eq!(ctx.cache().get().unwrap().address, "https://new.example");
        assert_eq!(ctx.cache().get().unwrap().fetched_at, ctx.now());
    }

    #[tokio::test]
    async fn failure_leaves_cache_and_fallback_unchanged() {
        let controller = controller(settings(), MockFetcher::failing(server_error()));
        let ctx = controller.context();
        ctx.cache().set("https://old.example", ctx.now());
        let before = ctx.cache().get();
        ctx.clock().advance(Duration::from_millis(2000));

        controller.scheduled_refresh().await;

        assert_eq!(controller.fetcher().calls(), 1);
        assert_eq!(ctx.cache().get(), before);
        assert_eq!(ctx.fallback_address(), STATIC_DEFAULT);
        assert!(controller.store().saves().is_empty());
    }
}

mod force_refresh {
    use super::*;

    #[tokio::test]
    async fn returns_false_without_lookup_when_dynamic_disabled() {
        let controller = controller(disabled(), MockFetcher::default());

        assert!(!controller.force_refresh().await);
        assert_eq!(controller.fetcher().calls(), 0);
    }

    #[tokio::test]
    async fn refreshes_even_when_cache_is_fresh() {
        let controller = controller(settings(), MockFetcher::returning("https://new.example"));
        let ctx = controller.context();
        ctx.cache().set("https://old.example", ctx.now());

        assert!(controller.force_refresh().await);
        assert_eq!(ctx.cache().get().unwrap().address, "https://new.example");
        assert_eq!(ctx.fallback_address(), "https://new.example");
    }

    #[tokio::test]
    async fn returns_false_and_keeps_cache_on_bad_status() {
        let controller = controller(settings(), MockFetcher::failing(server_error()));
        let ctx = controller.context();
        ctx.cache().set("https://old.example", ctx.now());

        assert!(!controller.force_refresh().await);
        assert_eq!(ctx.cache().get().unwrap().address, "https://old.example");
    }

    #[tokio::test]
    async fn returns_false_on_every_error_kind() {
        let errors = [
            server_error(),
            FetchError::InvalidPayload,
            FetchError::Timeout,
            FetchError::Transport(crate::transport::HttpError::Connection("refused".into())),
        ];

        for error in errors {
            let controller = controller(settings(), MockFetcher::failing(error));
            assert!(!controller.force_refresh().await);
            assert!(controller.context().cache().get().is_none());
        }
    }

    #[tokio::test]
    async fn last_successful_refresh_wins() {
        let controller = controller(
            settings(),
            MockFetcher::new(vec![
                Ok("https://first.example".to_string()),
                Err(FetchError::Timeout),
                Ok("https://second.example".to_string()),
            ]),
        );

        assert!(controller.force_refresh().await);
        assert!(!controller.force_refresh().await);
        assert!(controller.force_refresh().await);

        let ctx = controller.context();
        assert_eq!(ctx.cache().get().unwrap().address, "https://second.example");
        assert_eq!(controller.store().saves().len(), 2);
    }
}

mod clear_cache {
    use super::*;

    #[tokio::test]
    async fn empties_cache_and_marks_expired() {
        let controller = controller(settings(), MockFetcher::default());
        let ctx = controller.context();
        ctx.cache().set("https://a.example", ctx.now());

        controller.clear_cache().await;

        assert!(ctx.cache().get().is_none());
        assert!(ctx.is_cache_expired());
        assert_eq!(controller.fetcher().calls(), 0);
    }

    #[tokio::test]
    async fn persists_empty_state() {
        let controller = controller(settings(), MockFetcher::default());

        controller.clear_cache().await;

        assert_eq!(controller.store().saves(), vec![None]);
    }

    #[tokio::test]
    async fn keeps_fallback_address() {
        let controller = controller(settings(), MockFetcher::returning("https://a.example"));
        controller.force_refresh().await;

        controller.clear_cache().await;

        assert_eq!(controller.context().fallback_address(), "https://a.example");
    }
}
