//! Device connectivity check.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::error::{AppError, Result};
use crate::logging::ActivityLog;
use crate::models::NetworkConfig;
use crate::utils::socket_target;

/// Reports whether the device can reach the internet.
#[async_trait]
pub trait ConnectivityProbe: Send + Sync {
    /// `true` only when the device is both connected and able to reach the
    /// internet. Errors count as offline.
    async fn is_online(&self) -> bool;
}

/// Probe backed by a DNS lookup ("connected") and an HTTP request
/// ("internet reachable") against a configured URL.
pub struct NetworkProbe {
    client: Client,
    probe_url: String,
    timeout: Duration,
    log: ActivityLog,
}

impl NetworkProbe {
    pub fn new(client: Client, config: &NetworkConfig, log: ActivityLog) -> Self {
        Self {
            client,
            probe_url: config.probe_url.clone(),
            timeout: config.probe_timeout(),
            log,
        }
    }

    /// The probe host resolves to at least one address.
    async fn is_connected(&self) -> Result<bool> {
        let target = socket_target(&self.probe_url)
            .ok_or_else(|| AppError::config(format!("invalid probe URL {}", self.probe_url)))?;

        let lookup = tokio::time::timeout(self.timeout, tokio::net::lookup_host(target)).await;
        match lookup {
            Ok(addrs) => Ok(addrs?.next().is_some()),
            Err(_) => Ok(false),
        }
    }

    /// The probe URL answers with anything but a server error.
    async fn is_reachable(&self) -> Result<bool> {
        let response = self
            .client
            .get(&self.probe_url)
            .timeout(self.timeout)
            .send()
            .await?;
        Ok(!response.status().is_server_error())
    }

    async fn check(&self) -> Result<bool> {
        Ok(self.is_connected().await? && self.is_reachable().await?)
    }
}

#[async_trait]
impl ConnectivityProbe for NetworkProbe {
    async fn is_online(&self) -> bool {
        match self.check().await {
            Ok(online) => {
                self.log
                    .debug(&format!(
                        "Network status: {}",
                        if online { "online" } else { "offline" }
                    ))
                    .await;
                online
            }
            Err(e) => {
                self.log
                    .error(&format!("Network check failed: {e}"))
                    .await;
                false
            }
        }
    }
}
