// src/error.rs

//! Unified error handling for the resolver.

use std::fmt;

use thiserror::Error;

/// Result type alias for resolver operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed (connection, timeout, redirect loop...)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// The CAS login form carried no `execution` field
    #[error("execution token not found in login page")]
    TokenNotFound,

    /// The CAS server refused the login or could not be reached
    #[error("CAS login rejected: {0}")]
    LoginRejected(String),

    /// The RPC login call answered with a non-200 status
    #[error("RPC login failed with HTTP {status}")]
    RpcLoginFailed { status: u16 },

    /// The RPC URL generation call answered with a non-200 status
    #[error("RPC URL generation failed with HTTP {status}")]
    RpcGenerationFailed { status: u16 },

    /// The generation response contained no URL
    #[error("no feed URL found in RPC response")]
    UrlNotFound,

    /// Every resolution attempt failed
    #[error("feed URL resolution failed after {attempts} attempts")]
    ResolutionExhausted { attempts: u32 },
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a login rejection from any displayable cause.
    pub fn login_rejected(message: impl fmt::Display) -> Self {
        Self::LoginRejected(message.to_string())
    }
}
