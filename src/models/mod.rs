// src/models/mod.rs

//! Domain models for the resolver.

mod cache;
mod config;
mod resolution;
mod window;

// Re-export all public types
pub use cache::CacheEntry;
pub use config::{
    Config, Credentials, GroupEntry, HttpConfig, NetworkConfig, PacingConfig, PortalConfig,
    RetryConfig, StorageConfig, ValidationConfig,
};
pub use resolution::ResolutionResult;
pub use window::SchoolYearWindow;
