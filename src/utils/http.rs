// src/utils/http.rs

//! HTTP client utilities.

use std::ops::Range;
use std::time::Duration;

use rand::Rng;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue};

use crate::error::{AppError, Result};
use crate::models::HttpConfig;

/// Maximum redirects followed while logging in.
const LOGIN_MAX_REDIRECTS: usize = 5;

const HTML_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Create a configured asynchronous HTTP client without a cookie jar.
pub fn create_async_client(config: &HttpConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(config.timeout())
        .build()?;
    Ok(client)
}

/// Create a browser-like client with its own, empty cookie jar.
///
/// Every login attempt gets a new one so that no cookie survives from a
/// previous attempt.
pub fn create_session_client(config: &HttpConfig) -> Result<reqwest::Client> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(HTML_ACCEPT));
    headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_str(&config.accept_language)
            .map_err(|e| AppError::config(format!("invalid http.accept_language: {e}")))?,
    );

    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(config.timeout())
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::limited(LOGIN_MAX_REDIRECTS))
        .default_headers(headers)
        .build()?;
    Ok(client)
}

/// Pick a delay in `range` (milliseconds). An empty range yields its start.
pub fn jitter(range: Range<u64>) -> Duration {
    if range.is_empty() {
        return Duration::from_millis(range.start);
    }
    Duration::from_millis(rand::rng().random_range(range))
}

/// Sleep for a random duration in `range` (milliseconds).
pub async fn pause(range: Range<u64>) {
    let delay = jitter(range);
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}
