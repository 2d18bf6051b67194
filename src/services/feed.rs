// src/services/feed.rs

//! Feed URL generation over an authenticated session.

use std::ops::Range;

use chrono::{DateTime, Duration, Utc};
use reqwest::header::CONTENT_TYPE;

use crate::error::{AppError, Result};
use crate::logging::ActivityLog;
use crate::models::{PortalConfig, SchoolYearWindow};
use crate::rpc::encoding::encode_millis;
use crate::rpc::{RpcPayload, generated_url_payload, login_payload};
use crate::services::auth::AuthenticatedSession;
use crate::utils::extract_first_url;
use crate::utils::http::pause;

const GWT_CONTENT_TYPE: &str = "text/x-gwt-rpc; charset=UTF-8";

/// The identity seed is the encoded time two hours in the past.
const SEED_OFFSET_HOURS: i64 = 2;

/// Drives the RPC login and `getGeneratedUrl` calls.
pub struct FeedUrlResolver {
    portal: PortalConfig,
    rpc_delay: Range<u64>,
    log: ActivityLog,
}

impl FeedUrlResolver {
    pub fn new(portal: PortalConfig, rpc_delay: Range<u64>, log: ActivityLog) -> Self {
        Self {
            portal,
            rpc_delay,
            log,
        }
    }

    /// Identity seed for the instant `now`.
    pub fn identity_seed_at(now: DateTime<Utc>) -> String {
        let at = now - Duration::hours(SEED_OFFSET_HOURS);
        encode_millis(at.timestamp_millis())
    }

    /// Obtain a fresh feed URL for `class_id`.
    pub async fn resolve(&self, session: &AuthenticatedSession, class_id: &str) -> Result<String> {
        match self.run(session, class_id).await {
            Ok(url) => {
                self.log.info(&format!("Feed URL generated: {url}")).await;
                Ok(url)
            }
            Err(e) => {
                self.log
                    .error(&format!("Feed URL generation failed: {e}"))
                    .await;
                Err(e)
            }
        }
    }

    async fn run(&self, session: &AuthenticatedSession, class_id: &str) -> Result<String> {
        let seed = Self::identity_seed_at(Utc::now());
        let window = SchoolYearWindow::current();
        self.log
            .debug(&format!(
                "Requested window: {} -> {}",
                window.start, window.end
            ))
            .await;

        self.log.debug("Step 3/4: RPC login").await;
        let status = self
            .post(session, &self.portal.login_endpoint(), &login_payload(&self.portal, &seed))
            .await?
            .status()
            .as_u16();
        if status != 200 {
            return Err(AppError::RpcLoginFailed { status });
        }

        pause(self.rpc_delay.clone()).await;

        self.log.debug("Step 4/4: RPC feed URL generation").await;
        let payload = generated_url_payload(
            &self.portal,
            &seed,
            class_id,
            &encode_millis(window.start_millis()),
            &encode_millis(window.end_millis()),
        );
        let response = self
            .post(session, &self.portal.core_endpoint(), &payload)
            .await?;
        let status = response.status().as_u16();
        if status != 200 {
            return Err(AppError::RpcGenerationFailed { status });
        }

        let body = response.text().await?;
        extract_first_url(&body).ok_or(AppError::UrlNotFound)
    }

    async fn post(
        &self,
        session: &AuthenticatedSession,
        endpoint: &str,
        payload: &RpcPayload,
    ) -> Result<reqwest::Response> {
        let response = session
            .client()
            .post(endpoint)
            .header(CONTENT_TYPE, GWT_CONTENT_TYPE)
            .header("X-GWT-Module-Base", self.portal.module_base.as_str())
            .header("X-GWT-Permutation", self.portal.permutation.as_str())
            .body(payload.to_wire())
            .send()
            .await?;
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn identity_seed_is_two_hours_back() {
        let now = Utc.timestamp_millis_opt(1_700_007_200_000).unwrap();
        assert_eq!(FeedUrlResolver::identity_seed_at(now), "YvP5WgA");
    }
}
