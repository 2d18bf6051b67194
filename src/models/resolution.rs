//! Outcome returned to callers of the resolver.

use serde::{Deserialize, Serialize};

/// Best-effort resolution outcome. Never an error: `url` is `None` when
/// nothing usable could be produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionResult {
    pub url: Option<String>,
    pub from_cache: bool,
    pub is_offline: bool,
}

impl ResolutionResult {
    /// A freshly generated URL.
    pub fn fresh(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            from_cache: false,
            is_offline: false,
        }
    }

    /// A URL served from the cache.
    pub fn cached(url: impl Into<String>, is_offline: bool) -> Self {
        Self {
            url: Some(url.into()),
            from_cache: true,
            is_offline,
        }
    }

    /// Nothing available.
    pub fn unavailable(is_offline: bool) -> Self {
        Self {
            url: None,
            from_cache: false,
            is_offline,
        }
    }
}
