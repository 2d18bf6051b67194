//! Liveness check of a previously obtained feed URL.
//!
//! The feed URL embeds a session-bound token that the portal can revoke
//! without changing the URL text, so a URL is only trusted if it still
//! serves a calendar with at least one event.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use crate::error::{AppError, Result};
use crate::logging::ActivityLog;

const CALENDAR_MARKER: &str = "BEGIN:VCALENDAR";
const EVENT_MARKER: &str = "BEGIN:VEVENT";

/// Checks whether a feed URL still serves a usable calendar.
#[async_trait]
pub trait FeedValidator: Send + Sync {
    async fn validate(&self, feed_url: &str) -> bool;
}

/// Why a fetched feed was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedCheck {
    Live,
    BadStatus(u16),
    NotCalendar,
    NoEvents,
}

/// Classify a fetched response.
pub fn check_feed(status: u16, body: &str) -> FeedCheck {
    if status != StatusCode::OK.as_u16() {
        FeedCheck::BadStatus(status)
    } else if !body.starts_with(CALENDAR_MARKER) {
        FeedCheck::NotCalendar
    } else if !body.contains(EVENT_MARKER) {
        FeedCheck::NoEvents
    } else {
        FeedCheck::Live
    }
}

/// Validator issuing a bounded GET on the feed URL.
pub struct HttpFeedValidator {
    client: Client,
    timeout: Duration,
    log: ActivityLog,
}

impl HttpFeedValidator {
    pub fn new(client: Client, timeout: Duration, log: ActivityLog) -> Self {
        Self {
            client,
            timeout,
            log,
        }
    }

    async fn fetch(&self, feed_url: &str) -> Result<FeedCheck> {
        let response = self
            .client
            .get(feed_url)
            .timeout(self.timeout)
            .send()
            .await?;
        let status = response.status().as_u16();
        if status != StatusCode::OK.as_u16() {
            return Ok(FeedCheck::BadStatus(status));
        }

        let body = response.text().await?;
        let check = check_feed(status, &body);
        if check == FeedCheck::NotCalendar {
            let head: String = body.chars().take(50).collect();
            self.log
                .debug(&format!("Feed is not an iCalendar (starts with: {head})"))
                .await;
        }
        Ok(check)
    }
}

#[async_trait]
impl FeedValidator for HttpFeedValidator {
    async fn validate(&self, feed_url: &str) -> bool {
        self.log.debug("Validating cached feed URL...").await;

        match self.fetch(feed_url).await {
            Ok(FeedCheck::Live) => {
                self.log
                    .info("Feed URL is valid (HTTP 200, calendar content OK)")
                    .await;
                true
            }
            Ok(FeedCheck::BadStatus(status)) => {
                self.log
                    .debug(&format!("Feed URL answered HTTP {status}"))
                    .await;
                false
            }
            Ok(FeedCheck::NotCalendar) => false,
            Ok(FeedCheck::NoEvents) => {
                self.log.debug("Feed calendar has no events").await;
                false
            }
            Err(AppError::Http(e)) if e.is_timeout() => {
                self.log
                    .debug(&format!(
                        "Feed validation timed out (>{}ms)",
                        self.timeout.as_millis()
                    ))
                    .await;
                false
            }
            Err(e) => {
                self.log
                    .debug(&format!("Feed validation failed: {e}"))
                    .await;
                false
            }
        }
    }
}
