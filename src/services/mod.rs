//! Service layer for the resolver.
//!
//! This module contains the business logic for:
//! - CAS login (`AuthSession`)
//! - GWT-RPC feed URL generation (`FeedUrlResolver`)
//! - Connectivity checks (`NetworkProbe`)
//! - Feed liveness checks (`HttpFeedValidator`)
//! - Retried generation (`RetryCoordinator`)
//! - The top-level policy (`CalendarUrlService`)

pub mod auth;
pub mod calendar;
pub mod feed;
pub mod network;
pub mod retry;
pub mod validator;

pub use auth::{AuthSession, AuthenticatedSession, SessionState};
pub use calendar::CalendarUrlService;
pub use feed::FeedUrlResolver;
pub use network::{ConnectivityProbe, NetworkProbe};
pub use retry::{PortalUrlGenerator, RetryCoordinator, UrlGenerator};
pub use validator::{FeedValidator, HttpFeedValidator};
