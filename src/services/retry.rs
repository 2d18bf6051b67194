// src/services/retry.rs

//! Retry orchestration for feed URL generation.
//!
//! Every attempt logs in from scratch: new client, new cookie jar, new
//! execution token. Sessions are never reused between attempts.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::logging::ActivityLog;
use crate::models::{Config, RetryConfig};
use crate::services::auth::AuthSession;
use crate::services::feed::FeedUrlResolver;

/// One complete, self-contained attempt at obtaining a feed URL.
#[async_trait]
pub trait UrlGenerator: Send + Sync {
    async fn generate(&self, class_id: &str) -> Result<String>;
}

/// Generator performing the CAS login followed by the two RPC calls.
pub struct PortalUrlGenerator {
    config: Arc<Config>,
    log: ActivityLog,
}

impl PortalUrlGenerator {
    pub fn new(config: Arc<Config>, log: ActivityLog) -> Self {
        Self { config, log }
    }
}

#[async_trait]
impl UrlGenerator for PortalUrlGenerator {
    async fn generate(&self, class_id: &str) -> Result<String> {
        let session = AuthSession::new(&self.config, self.log.clone())?
            .login()
            .await?;

        let resolver = FeedUrlResolver::new(
            self.config.portal.clone(),
            self.config.pacing.rpc_delay(),
            self.log.clone(),
        );
        resolver.resolve(&session, class_id).await
    }
}

/// Retries a [`UrlGenerator`] with linear backoff.
pub struct RetryCoordinator {
    generator: Arc<dyn UrlGenerator>,
    max_attempts: u32,
    backoff_step: Duration,
    log: ActivityLog,
}

impl RetryCoordinator {
    pub fn new(generator: Arc<dyn UrlGenerator>, config: &RetryConfig, log: ActivityLog) -> Self {
        Self {
            generator,
            max_attempts: config.max_attempts,
            backoff_step: config.backoff_step(),
            log,
        }
    }

    /// Wait after failed attempt number `attempt` (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.backoff_step * attempt
    }

    /// Run attempts until one succeeds or `max_attempts` have failed.
    pub async fn retry(&self, class_id: &str) -> Result<String> {
        for attempt in 1..=self.max_attempts {
            self.log
                .info(&format!(
                    "Attempt {}/{} for class {}",
                    attempt, self.max_attempts, class_id
                ))
                .await;

            match self.generator.generate(class_id).await {
                Ok(url) => {
                    self.log
                        .info(&format!("Succeeded after {attempt} attempt(s)"))
                        .await;
                    return Ok(url);
                }
                Err(e) => {
                    self.log
                        .error(&format!("Attempt {attempt} failed: {e}"))
                        .await;

                    if attempt < self.max_attempts {
                        let delay = self.backoff(attempt);
                        self.log
                            .info(&format!("Waiting {}ms before retrying...", delay.as_millis()))
                            .await;
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }

        self.log
            .error(&format!(
                "Giving up after {} attempts",
                self.max_attempts
            ))
            .await;
        Err(AppError::ResolutionExhausted {
            attempts: self.max_attempts,
        })
    }
}
