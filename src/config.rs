// src/config.rs

//! Configuration loading utilities.
//!
//! File values are loaded first, then the account is taken from the
//! environment when `ADE_USER` / `ADE_PASS` are set.

use std::path::Path;

use crate::error::{AppError, Result};
use crate::models::Config;

/// Environment variable holding the portal username.
pub const ENV_USER: &str = "ADE_USER";

/// Environment variable holding the portal password.
pub const ENV_PASS: &str = "ADE_PASS";

/// Load configuration from a TOML file and apply environment overrides.
///
/// Falls back to defaults if the file is missing or invalid.
pub fn load_config(path: &Path) -> Config {
    let mut config = if path.exists() {
        Config::load_or_default(path)
    } else {
        log::debug!("No config file at {}, using defaults", path.display());
        Config::default()
    };
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    config
}

/// Replace the credentials with non-empty values returned by `lookup`.
pub fn apply_env_overrides(config: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(user) = lookup(ENV_USER).filter(|v| !v.is_empty()) {
        config.credentials.username = user;
    }
    if let Some(pass) = lookup(ENV_PASS).filter(|v| !v.is_empty()) {
        config.credentials.password = pass;
    }
}

/// Turn a command-line class argument into a class id.
///
/// Accepts a numeric id as-is, or a `YEAR/GROUP` name from the configured
/// groups.
pub fn class_id_from_arg(config: &Config, arg: &str) -> Result<String> {
    let arg = arg.trim();
    if !arg.is_empty() && arg.chars().all(|c| c.is_ascii_digit()) {
        return Ok(arg.to_string());
    }

    let (year, group) = arg
        .split_once('/')
        .ok_or_else(|| AppError::config(format!("'{arg}' is neither a class id nor YEAR/GROUP")))?;

    config
        .class_for_group(year.trim(), group.trim())
        .map(str::to_string)
        .ok_or_else(|| AppError::config(format!("Unknown group: {arg}")))
}
