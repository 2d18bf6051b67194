//! Application configuration structures.

use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP client settings shared by every request
    #[serde(default)]
    pub http: HttpConfig,

    /// CAS and GWT-RPC endpoints of the portal deployment
    #[serde(default)]
    pub portal: PortalConfig,

    /// Portal account
    #[serde(default)]
    pub credentials: Credentials,

    /// Retry policy for URL generation
    #[serde(default)]
    pub retry: RetryConfig,

    /// Anti-automation delays between protocol steps
    #[serde(default)]
    pub pacing: PacingConfig,

    /// Feed liveness check settings
    #[serde(default)]
    pub validation: ValidationConfig,

    /// Connectivity probe settings
    #[serde(default)]
    pub network: NetworkConfig,

    /// Where the URL cache and the log live
    #[serde(default)]
    pub storage: StorageConfig,

    /// Year/group to class id directory
    #[serde(default = "defaults::groups")]
    pub groups: Vec<GroupEntry>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.http.user_agent.trim().is_empty() {
            return Err(AppError::validation("http.user_agent is empty"));
        }
        if self.http.timeout_secs == 0 {
            return Err(AppError::validation("http.timeout_secs must be > 0"));
        }
        if self.validation.timeout_secs == 0 {
            return Err(AppError::validation("validation.timeout_secs must be > 0"));
        }
        if self.retry.max_attempts == 0 {
            return Err(AppError::validation("retry.max_attempts must be > 0"));
        }
        if !self.portal.module_base.ends_with('/') {
            return Err(AppError::validation("portal.module_base must end with '/'"));
        }
        url::Url::parse(&self.portal.cas_login_url)?;
        url::Url::parse(&self.portal.service_url)?;
        url::Url::parse(&self.portal.module_base)?;
        url::Url::parse(&self.network.probe_url)?;
        if !self.credentials.is_complete() {
            return Err(AppError::validation(
                "credentials are missing (set ADE_USER and ADE_PASS)",
            ));
        }
        Ok(())
    }

    /// Find the class id configured for a `YEAR/GROUP` pair.
    pub fn class_for_group(&self, year: &str, group: &str) -> Option<&str> {
        self.groups
            .iter()
            .find(|g| g.year.eq_ignore_ascii_case(year) && g.group.eq_ignore_ascii_case(group))
            .map(|g| g.class_id.as_str())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http: HttpConfig::default(),
            portal: PortalConfig::default(),
            credentials: Credentials::default(),
            retry: RetryConfig::default(),
            pacing: PacingConfig::default(),
            validation: ValidationConfig::default(),
            network: NetworkConfig::default(),
            storage: StorageConfig::default(),
            groups: defaults::groups(),
        }
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Accept-Language header sent by the login session
    #[serde(default = "defaults::accept_language")]
    pub accept_language: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            accept_language: defaults::accept_language(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// Endpoints and identifiers of one portal deployment.
///
/// The strong names, permutation and type signatures are captured from the
/// portal's compiled client. When the deployment is rebuilt they change and
/// generation starts failing with `RpcGenerationFailed`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalConfig {
    /// CAS login endpoint
    #[serde(default = "defaults::cas_login_url")]
    pub cas_login_url: String,

    /// Service the CAS ticket is requested for
    #[serde(default = "defaults::service_url")]
    pub service_url: String,

    /// GWT module base, also the first entry of every payload string table
    #[serde(default = "defaults::module_base")]
    pub module_base: String,

    /// Value of the `X-GWT-Permutation` header
    #[serde(default = "defaults::permutation")]
    pub permutation: String,

    /// Serialization policy strong name of `MyPlanningClientServiceProxy`
    #[serde(default = "defaults::login_strong_name")]
    pub login_strong_name: String,

    /// Serialization policy strong name of `CorePlanningServiceProxy`
    #[serde(default = "defaults::core_strong_name")]
    pub core_strong_name: String,

    /// Trailing integer argument of `getGeneratedUrl`
    #[serde(default = "defaults::generated_url_option")]
    pub generated_url_option: i64,
}

impl PortalConfig {
    /// Endpoint of the RPC login call.
    pub fn login_endpoint(&self) -> String {
        format!("{}MyPlanningClientServiceProxy", self.module_base)
    }

    /// Endpoint of the URL generation call.
    pub fn core_endpoint(&self) -> String {
        format!("{}CorePlanningServiceProxy", self.module_base)
    }
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            cas_login_url: defaults::cas_login_url(),
            service_url: defaults::service_url(),
            module_base: defaults::module_base(),
            permutation: defaults::permutation(),
            login_strong_name: defaults::login_strong_name(),
            core_strong_name: defaults::core_strong_name(),
            generated_url_option: defaults::generated_url_option(),
        }
    }
}

/// Portal account. Usually supplied through `ADE_USER` / `ADE_PASS`.
#[derive(Clone, Serialize, Deserialize, Default)]
pub struct Credentials {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl Credentials {
    pub fn is_complete(&self) -> bool {
        !self.username.is_empty() && !self.password.is_empty()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Retry policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of login + generation attempts
    #[serde(default = "defaults::max_attempts")]
    pub max_attempts: u32,

    /// Linear backoff step: attempt `n` waits `n * step` before the next one
    #[serde(default = "defaults::backoff_step")]
    pub backoff_step_ms: u64,
}

impl RetryConfig {
    pub fn backoff_step(&self) -> Duration {
        Duration::from_millis(self.backoff_step_ms)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: defaults::max_attempts(),
            backoff_step_ms: defaults::backoff_step(),
        }
    }
}

/// Randomized pauses between protocol steps, as half-open millisecond ranges.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PacingConfig {
    /// Pause between fetching the login form and posting credentials
    #[serde(default = "defaults::login_delay")]
    pub login_delay_ms: [u64; 2],

    /// Pause between the two RPC calls
    #[serde(default = "defaults::rpc_delay")]
    pub rpc_delay_ms: [u64; 2],
}

impl PacingConfig {
    /// No pauses at all.
    pub fn none() -> Self {
        Self {
            login_delay_ms: [0, 0],
            rpc_delay_ms: [0, 0],
        }
    }

    pub fn login_delay(&self) -> Range<u64> {
        self.login_delay_ms[0]..self.login_delay_ms[1]
    }

    pub fn rpc_delay(&self) -> Range<u64> {
        self.rpc_delay_ms[0]..self.rpc_delay_ms[1]
    }
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            login_delay_ms: defaults::login_delay(),
            rpc_delay_ms: defaults::rpc_delay(),
        }
    }
}

/// Feed liveness check settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    #[serde(default = "defaults::validation_timeout")]
    pub timeout_secs: u64,
}

impl ValidationConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            timeout_secs: defaults::validation_timeout(),
        }
    }
}

/// Connectivity probe settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// URL whose host must resolve and which must answer for the device to be online
    #[serde(default = "defaults::probe_url")]
    pub probe_url: String,

    #[serde(default = "defaults::probe_timeout")]
    pub probe_timeout_secs: u64,
}

impl NetworkConfig {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            probe_url: defaults::probe_url(),
            probe_timeout_secs: defaults::probe_timeout(),
        }
    }
}

/// Storage location settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "defaults::storage_dir")]
    pub dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: defaults::storage_dir(),
        }
    }
}

/// One entry of the class directory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GroupEntry {
    /// Year of study (e.g., "BUT2")
    pub year: String,

    /// Group name within the year (e.g., "AII1")
    pub group: String,

    /// Portal resource id of the group's timetable
    pub class_id: String,
}

mod defaults {
    use std::path::PathBuf;

    use super::GroupEntry;

    // HTTP defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (Linux; Android 11; SM-G973F) AppleWebKit/537.36 (KHTML, like Gecko) \
         Chrome/91.0.4472.120 Mobile Safari/537.36"
            .into()
    }
    pub fn accept_language() -> String {
        "fr-FR,fr;q=0.9,en;q=0.8".into()
    }
    pub fn timeout() -> u64 {
        15
    }

    // Portal defaults
    pub fn cas_login_url() -> String {
        "https://cas.univ-tours.fr/cas/login".into()
    }
    pub fn service_url() -> String {
        "https://ade.univ-tours.fr/direct/myplanning.jsp".into()
    }
    pub fn module_base() -> String {
        "https://ade.univ-tours.fr/direct/gwtdirectplanning/".into()
    }
    pub fn permutation() -> String {
        "30B3E0B5D2C57008E936E550EA0E3F25".into()
    }
    pub fn login_strong_name() -> String {
        "217140C31DF67EF6BA02D106930F5725".into()
    }
    pub fn core_strong_name() -> String {
        "748880AB5D6D59CC4770FCCE7567EA63".into()
    }
    pub fn generated_url_option() -> i64 {
        226
    }

    // Retry defaults
    pub fn max_attempts() -> u32 {
        10
    }
    pub fn backoff_step() -> u64 {
        500
    }

    // Pacing defaults
    pub fn login_delay() -> [u64; 2] {
        [400, 700]
    }
    pub fn rpc_delay() -> [u64; 2] {
        [200, 350]
    }

    // Validation defaults
    pub fn validation_timeout() -> u64 {
        8
    }

    // Network defaults
    pub fn probe_url() -> String {
        "https://cas.univ-tours.fr/".into()
    }
    pub fn probe_timeout() -> u64 {
        5
    }

    // Storage defaults
    pub fn storage_dir() -> PathBuf {
        PathBuf::from("storage")
    }

    // Group directory defaults
    pub fn groups() -> Vec<GroupEntry> {
        const TABLE: &[(&str, &[(&str, u32)])] = &[
            (
                "BUT1",
                &[
                    ("A1", 10767),
                    ("A2", 10768),
                    ("B1", 10769),
                    ("B2", 10770),
                    ("C1", 10771),
                    ("C2", 10772),
                    ("D1", 10773),
                    ("D2", 10776),
                    ("M1", 10448),
                ],
            ),
            (
                "BUT2",
                &[
                    ("AII1", 10485),
                    ("AII2", 10515),
                    ("EME1", 10896),
                    ("EME2", 11032),
                    ("ESE1", 10464),
                    ("ESE2", 10932),
                ],
            ),
            (
                "BUT3",
                &[
                    ("AII1", 10538),
                    ("AII2", 10459),
                    ("EME1", 10982),
                    ("EME2", 11014),
                    ("ESE1", 10969),
                    ("ESE2", 10970),
                ],
            ),
        ];

        TABLE
            .iter()
            .flat_map(|(year, groups)| {
                groups.iter().map(move |(group, id)| GroupEntry {
                    year: year.to_string(),
                    group: group.to_string(),
                    class_id: id.to_string(),
                })
            })
            .collect()
    }
}
