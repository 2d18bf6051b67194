// src/services/auth.rs

//! CAS login handshake.
//!
//! A session walks `Init → ExecutionTokenFetched → Authenticated`, or ends
//! in `Failed`. It owns a fresh cookie jar and serves exactly one
//! resolution attempt.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;
use reqwest::Client;
use reqwest::header::{ORIGIN, REFERER};
use url::Url;

use crate::error::{AppError, Result};
use crate::logging::ActivityLog;
use crate::models::{Config, Credentials};
use crate::utils::http::{create_session_client, pause};

/// Characters of the login page kept in the log when no token is found.
const HTML_SNIPPET_LEN: usize = 500;

/// Handshake progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Init,
    ExecutionTokenFetched { execution: String },
    Authenticated,
    Failed,
}

/// `execution` field patterns, strict to permissive.
static EXECUTION_PATTERNS: LazyLock<[Regex; 4]> = LazyLock::new(|| {
    [
        // <input ... name="execution" ... value="..." ...>
        r#"(?i)<input[^>]*name="execution"[^>]*value="([^"]*)"[^>]*>"#,
        // value before name
        r#"(?i)<input[^>]*value="([^"]*)"[^>]*name="execution"[^>]*>"#,
        r#"(?i)name="execution"\s+value="([^"]+)""#,
        r#"(?i)execution.*?value=["']([^"']+)["']"#,
    ]
    .map(|pattern| Regex::new(pattern).expect("Invalid execution token regex"))
});

/// Extract the hidden `execution` field of the CAS login form.
///
/// The first non-empty capture wins.
pub fn extract_execution_token(html: &str) -> Option<String> {
    EXECUTION_PATTERNS.iter().find_map(|re| {
        re.captures(html)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    })
}

/// An in-progress CAS login.
pub struct AuthSession {
    client: Client,
    login_url: Url,
    credentials: Credentials,
    login_delay: Range<u64>,
    state: SessionState,
    log: ActivityLog,
}

impl AuthSession {
    /// Start a session with a brand-new HTTP client and cookie jar.
    pub fn new(config: &Config, log: ActivityLog) -> Result<Self> {
        let login_url = Url::parse_with_params(
            &config.portal.cas_login_url,
            &[
                ("service", config.portal.service_url.as_str()),
                ("renew", "true"),
            ],
        )?;

        Ok(Self {
            client: create_session_client(&config.http)?,
            login_url,
            credentials: config.credentials.clone(),
            login_delay: config.pacing.login_delay(),
            state: SessionState::Init,
            log,
        })
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Login URL with the `service` and `renew` parameters.
    pub fn login_url(&self) -> &Url {
        &self.login_url
    }

    /// `Init → ExecutionTokenFetched`: load a fresh login form.
    ///
    /// Any failure moves the session to `Failed`.
    pub async fn fetch_execution_token(&mut self) -> Result<()> {
        if self.state != SessionState::Init {
            return Err(AppError::login_rejected("login form already requested"));
        }
        self.log.debug("Step 1/2: GET execution token").await;

        match self.load_login_form().await {
            Ok(execution) => {
                let preview: String = execution.chars().take(20).collect();
                self.log
                    .debug(&format!("Execution token obtained: {preview}..."))
                    .await;
                self.state = SessionState::ExecutionTokenFetched { execution };
                Ok(())
            }
            Err(e) => {
                self.state = SessionState::Failed;
                Err(e)
            }
        }
    }

    async fn load_login_form(&self) -> Result<String> {
        let response = self
            .client
            .get(self.login_url.clone())
            .send()
            .await
            .map_err(AppError::login_rejected)?;
        let status = response.status();
        if status.as_u16() != 200 {
            return Err(AppError::login_rejected(format!(
                "HTTP {} while loading the login form",
                status.as_u16()
            )));
        }

        let html = response.text().await.map_err(AppError::login_rejected)?;
        match extract_execution_token(&html) {
            Some(execution) => Ok(execution),
            None => {
                let snippet: String = html.chars().take(HTML_SNIPPET_LEN).collect();
                self.log
                    .debug(&format!("Login page (first {HTML_SNIPPET_LEN} chars): {snippet}"))
                    .await;
                Err(AppError::TokenNotFound)
            }
        }
    }

    /// `ExecutionTokenFetched → Authenticated`: post the credentials.
    ///
    /// Any failure moves the session to `Failed`.
    pub async fn submit_credentials(&mut self) -> Result<()> {
        let SessionState::ExecutionTokenFetched { execution } = &self.state else {
            return Err(AppError::login_rejected("no execution token to submit"));
        };
        let execution = execution.clone();

        pause(self.login_delay.clone()).await;
        self.log.debug("Step 2/2: POST credentials").await;

        match self.post_credentials(&execution).await {
            Ok(()) => {
                self.state = SessionState::Authenticated;
                Ok(())
            }
            Err(e) => {
                self.state = SessionState::Failed;
                Err(e)
            }
        }
    }

    async fn post_credentials(&self, execution: &str) -> Result<()> {
        let form = [
            ("username", self.credentials.username.as_str()),
            ("password", self.credentials.password.as_str()),
            ("execution", execution),
            ("_eventId", "submit"),
            ("geolocation", ""),
        ];
        let origin = self.login_url.origin().ascii_serialization();

        let response = self
            .client
            .post(self.login_url.clone())
            .header(REFERER, self.login_url.as_str())
            .header(ORIGIN, origin)
            .form(&form)
            .send()
            .await
            .map_err(AppError::login_rejected)?;

        let status = response.status();
        if !(status.is_success() || status.is_redirection()) {
            return Err(AppError::login_rejected(format!(
                "HTTP {} after posting credentials",
                status.as_u16()
            )));
        }
        Ok(())
    }

    /// Run the whole handshake.
    pub async fn login(mut self) -> Result<AuthenticatedSession> {
        self.log.info("CAS login in progress...").await;

        let outcome = match self.fetch_execution_token().await {
            Ok(()) => self.submit_credentials().await,
            Err(e) => Err(e),
        };

        match outcome {
            Ok(()) => {
                self.log.info("CAS login succeeded").await;
                Ok(AuthenticatedSession {
                    client: self.client,
                })
            }
            Err(e) => {
                self.log.error(&format!("CAS login failed: {e}")).await;
                Err(e)
            }
        }
    }
}

/// A logged-in HTTP client. Dropped at the end of its attempt.
pub struct AuthenticatedSession {
    client: Client,
}

impl AuthenticatedSession {
    pub fn client(&self) -> &Client {
        &self.client
    }
}
