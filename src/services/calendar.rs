// src/services/calendar.rs

//! Top-level resolution policy.
//!
//! Combines connectivity, the URL cache, feed validation and retried
//! regeneration. Callers always get a [`ResolutionResult`]; failures degrade
//! to a stale cache entry or to `url: None`.

use std::sync::Arc;

use reqwest::Client;

use crate::error::Result;
use crate::logging::ActivityLog;
use crate::models::{Config, ResolutionResult};
use crate::services::network::{ConnectivityProbe, NetworkProbe};
use crate::services::retry::{PortalUrlGenerator, RetryCoordinator, UrlGenerator};
use crate::services::validator::{FeedValidator, HttpFeedValidator};
use crate::storage::{KeyValueStore, UrlCache};
use crate::utils::http::create_async_client;

/// Calendar feed URL service.
pub struct CalendarUrlService {
    probe: Arc<dyn ConnectivityProbe>,
    validator: Arc<dyn FeedValidator>,
    retry: RetryCoordinator,
    cache: UrlCache,
    log: ActivityLog,
}

impl CalendarUrlService {
    /// Assemble a service from its collaborators.
    pub fn new(
        probe: Arc<dyn ConnectivityProbe>,
        validator: Arc<dyn FeedValidator>,
        retry: RetryCoordinator,
        cache: UrlCache,
        log: ActivityLog,
    ) -> Self {
        Self {
            probe,
            validator,
            retry,
            cache,
            log,
        }
    }

    /// Wire the production collaborators from configuration.
    pub fn from_config(config: Arc<Config>, store: Arc<dyn KeyValueStore>) -> Result<Self> {
        let log = ActivityLog::new(Arc::clone(&store));
        let client: Client = create_async_client(&config.http)?;

        let probe = Arc::new(NetworkProbe::new(
            client.clone(),
            &config.network,
            log.clone(),
        ));
        let validator = Arc::new(HttpFeedValidator::new(
            client,
            config.validation.timeout(),
            log.clone(),
        ));
        let generator: Arc<dyn UrlGenerator> =
            Arc::new(PortalUrlGenerator::new(Arc::clone(&config), log.clone()));
        let retry = RetryCoordinator::new(generator, &config.retry, log.clone());
        let cache = UrlCache::new(store, log.clone());

        Ok(Self::new(probe, validator, retry, cache, log))
    }

    /// Resolve the feed URL of `class_id`.
    pub async fn resolve(&self, class_id: &str) -> ResolutionResult {
        self.log.separator().await;
        self.log
            .info(&format!("Resolving calendar for class {class_id}"))
            .await;

        if !self.probe.is_online().await {
            return self.resolve_offline(class_id).await;
        }

        let cached = self.cache.get(class_id).await;
        match &cached {
            Some(entry) => {
                self.log.info("Cache found, validating...").await;
                if self.validator.validate(&entry.feed_url).await {
                    self.log.info("Cache valid, using it").await;
                    return ResolutionResult::cached(entry.feed_url.clone(), false);
                }
                self.log
                    .info("Cached URL is stale, regenerating")
                    .await;
            }
            None => {
                self.log
                    .info("No cache, generating a new URL")
                    .await;
            }
        }

        match self.retry.retry(class_id).await {
            Ok(url) => {
                if let Err(e) = self.cache.put(class_id, &url).await {
                    self.log
                        .error(&format!("Cache save failed [{class_id}]: {e}"))
                        .await;
                }
                self.log.info("Resolution completed").await;
                ResolutionResult::fresh(url)
            }
            Err(e) => {
                self.log.error(&format!("Generation failed: {e}")).await;
                match cached {
                    Some(entry) => {
                        self.log
                            .info("Falling back to the stale cached URL")
                            .await;
                        ResolutionResult::cached(entry.feed_url, false)
                    }
                    None => {
                        self.log.error("No URL available").await;
                        ResolutionResult::unavailable(false)
                    }
                }
            }
        }
    }

    async fn resolve_offline(&self, class_id: &str) -> ResolutionResult {
        self.log.info("Offline mode").await;
        match self.cache.get(class_id).await {
            Some(entry) => {
                self.log.info("Using cache (offline)").await;
                ResolutionResult::cached(entry.feed_url, true)
            }
            None => {
                self.log.error("No cache available offline").await;
                ResolutionResult::unavailable(true)
            }
        }
    }

    /// Drop the cached URL, then resolve. Always attempts a regeneration
    /// when online.
    pub async fn force_refresh(&self, class_id: &str) -> ResolutionResult {
        if let Err(e) = self.cache.invalidate(class_id).await {
            self.log
                .error(&format!("Cache invalidation failed [{class_id}]: {e}"))
                .await;
        }
        self.resolve(class_id).await
    }

    /// Persisted diagnostic log text.
    pub async fn get_logs(&self) -> String {
        self.log.read_all().await
    }

    /// Clear the diagnostic log, leaving a single record of the clearing.
    pub async fn clear_logs(&self) {
        self.log.clear().await;
        self.log.info("Logs cleared by user").await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::RetryConfig;
    use crate::storage::LocalStorage;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    struct FixedProbe(bool, AtomicUsize);

    #[async_trait]
    impl ConnectivityProbe for FixedProbe {
        async fn is_online(&self) -> bool {
            self.1.fetch_add(1, Ordering::SeqCst);
            self.0
        }
    }

    struct FixedValidator(bool, AtomicUsize);

    #[async_trait]
    impl FeedValidator for FixedValidator {
        async fn validate(&self, _feed_url: &str) -> bool {
            self.1.fetch_add(1, Ordering::SeqCst);
            self.0
        }
    }

    struct FixedGenerator(Option<&'static str>, AtomicUsize);

    #[async_trait]
    impl UrlGenerator for FixedGenerator {
        async fn generate(&self, _class_id: &str) -> Result<String> {
            self.1.fetch_add(1, Ordering::SeqCst);
            self.0.map(String::from).ok_or(AppError::UrlNotFound)
        }
    }

    struct Harness {
        _tmp: TempDir,
        probe: Arc<FixedProbe>,
        validator: Arc<FixedValidator>,
        generator: Arc<FixedGenerator>,
        cache: UrlCache,
        service: CalendarUrlService,
    }

    fn harness(online: bool, valid: bool, generated: Option<&'static str>) -> Harness {
        let tmp = TempDir::new().unwrap();
        let store: Arc<dyn KeyValueStore> = Arc::new(LocalStorage::new(tmp.path()));
        let log = ActivityLog::new(Arc::clone(&store));

        let probe = Arc::new(FixedProbe(online, AtomicUsize::new(0)));
        let validator = Arc::new(FixedValidator(valid, AtomicUsize::new(0)));
        let generator = Arc::new(FixedGenerator(generated, AtomicUsize::new(0)));
        let retry = RetryCoordinator::new(
            generator.clone(),
            &RetryConfig {
                max_attempts: 2,
                backoff_step_ms: 0,
            },
            log.clone(),
        );
        let cache = UrlCache::new(store, log.clone());
        let service = CalendarUrlService::new(
            probe.clone(),
            validator.clone(),
            retry,
            cache.clone(),
            log,
        );

        Harness {
            _tmp: tmp,
            probe,
            validator,
            generator,
            cache,
            service,
        }
    }

    fn calls(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    #[tokio::test]
    async fn valid_cache_online_skips_generation() {
        let h = harness(true, true, Some("https://fresh"));
        h.cache.put("1234", "https://cached").await.unwrap();

        let result = h.service.resolve("1234").await;
        assert_eq!(result, ResolutionResult::cached("https://cached", false));
        assert_eq!(calls(&h.validator.1), 1);
        assert_eq!(calls(&h.generator.1), 0);
    }

    #[tokio::test]
    async fn offline_with_cache_uses_it_without_validation() {
        let h = harness(false, true, Some("https://fresh"));
        h.cache.put("1234", "https://cached").await.unwrap();

        let result = h.service.resolve("1234").await;
        assert_eq!(result, ResolutionResult::cached("https://cached", true));
        assert_eq!(calls(&h.probe.1), 1);
        assert_eq!(calls(&h.validator.1), 0);
        assert_eq!(calls(&h.generator.1), 0);
    }

    #[tokio::test]
    async fn offline_without_cache_is_unavailable() {
        let h = harness(false, true, Some("https://fresh"));

        let result = h.service.resolve("1234").await;
        assert_eq!(result, ResolutionResult::unavailable(true));
        assert_eq!(calls(&h.generator.1), 0);
    }

    #[tokio::test]
    async fn no_cache_generates_and_stores() {
        let h = harness(true, true, Some("https://ade.example/feed.ics"));

        let result = h.service.resolve("1234").await;
        assert_eq!(result, ResolutionResult::fresh("https://ade.example/feed.ics"));
        assert_eq!(calls(&h.validator.1), 0);
        assert_eq!(
            h.cache.get("1234").await.unwrap().feed_url,
            "https://ade.example/feed.ics"
        );
    }

    #[tokio::test]
    async fn stale_cache_is_replaced() {
        let h = harness(true, false, Some("https://fresh"));
        h.cache.put("1234", "https://stale").await.unwrap();

        let result = h.service.resolve("1234").await;
        assert_eq!(result, ResolutionResult::fresh("https://fresh"));
        assert_eq!(h.cache.get("1234").await.unwrap().feed_url, "https://fresh");
    }

    #[tokio::test]
    async fn failed_generation_falls_back_to_stale_cache() {
        let h = harness(true, false, None);
        h.cache.put("1234", "https://stale").await.unwrap();

        let result = h.service.resolve("1234").await;
        assert_eq!(result, ResolutionResult::cached("https://stale", false));
        assert_eq!(calls(&h.generator.1), 2);
        assert_eq!(h.cache.get("1234").await.unwrap().feed_url, "https://stale");
    }

    #[tokio::test]
    async fn failed_generation_without_cache_is_unavailable() {
        let h = harness(true, true, None);

        let result = h.service.resolve("1234").await;
        assert_eq!(result, ResolutionResult::unavailable(false));
        assert!(h.cache.get("1234").await.is_none());
    }

    #[tokio::test]
    async fn force_refresh_regenerates_valid_cache() {
        let h = harness(true, true, Some("https://fresh"));
        h.cache.put("1234", "https://cached").await.unwrap();

        let result = h.service.force_refresh("1234").await;
        assert_eq!(result, ResolutionResult::fresh("https://fresh"));
        assert_eq!(calls(&h.validator.1), 0);
        assert_eq!(calls(&h.generator.1), 1);
    }

    #[tokio::test]
    async fn clear_logs_leaves_marker() {
        let h = harness(false, true, None);
        h.service.resolve("1234").await;
        assert!(h.service.get_logs().await.contains("Offline mode"));

        h.service.clear_logs().await;
        let logs = h.service.get_logs().await;
        assert_eq!(logs.lines().count(), 1);
        assert!(logs.contains("Logs cleared by user"));
    }
}
