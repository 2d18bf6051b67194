// src/logging.rs

//! Persisted diagnostic log.
//!
//! Every component writes its progress here so that a failed resolution can
//! be inspected after the fact. The log is a bounded tail: only the most
//! recent [`MAX_LOG_LINES`] lines are kept under a single storage key. Each
//! record is also forwarded to the `log` facade.

use std::sync::Arc;

use chrono::{SecondsFormat, Utc};

use crate::storage::KeyValueStore;

/// Storage key of the log text.
pub const LOG_KEY: &str = "app_logs.log";

/// Number of lines kept on disk.
pub const MAX_LOG_LINES: usize = 300;

/// Returned by [`ActivityLog::read_all`] when nothing has been logged.
pub const NO_LOGS: &str = "No logs available.";

/// Log level enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Error,
}

impl LogLevel {
    fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Error => "ERROR",
        }
    }
}

/// Format a log record with timestamp and level
fn format_log(level: LogLevel, message: &str) -> String {
    let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    // one record per line
    let message = message.replace(['\r', '\n'], " ");
    format!("[{}] [{}] {}", timestamp, level.as_str(), message)
}

/// Keep the last `max` lines of `existing` followed by `record`.
fn bounded_tail(existing: &str, record: &str, max: usize) -> String {
    let mut lines: Vec<&str> = existing.lines().filter(|l| !l.is_empty()).collect();
    lines.push(record);
    let skip = lines.len().saturating_sub(max);

    let mut out = lines[skip..].join("\n");
    out.push('\n');
    out
}

/// Bounded, append-only diagnostic record store.
#[derive(Clone)]
pub struct ActivityLog {
    store: Arc<dyn KeyValueStore>,
}

impl ActivityLog {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Append one record. Storage failures are reported through `log` only.
    pub async fn append(&self, message: &str, level: LogLevel) {
        match level {
            LogLevel::Debug => log::debug!("{}", message),
            LogLevel::Info => log::info!("{}", message),
            LogLevel::Error => log::error!("{}", message),
        }

        let record = format_log(level, message);
        let existing = match self.store.read_text(LOG_KEY).await {
            Ok(text) => text.unwrap_or_default(),
            Err(e) => {
                log::error!("Failed to read activity log: {}", e);
                String::new()
            }
        };

        let updated = bounded_tail(&existing, &record, MAX_LOG_LINES);
        if let Err(e) = self.store.write_bytes(LOG_KEY, updated.as_bytes()).await {
            log::error!("Failed to write activity log: {}", e);
        }
    }

    /// Log a debug message
    pub async fn debug(&self, message: &str) {
        self.append(message, LogLevel::Debug).await
    }

    /// Log an info message
    pub async fn info(&self, message: &str) {
        self.append(message, LogLevel::Info).await
    }

    /// Log an error message
    pub async fn error(&self, message: &str) {
        self.append(message, LogLevel::Error).await
    }

    /// Log a separator line
    pub async fn separator(&self) {
        self.info(&"=".repeat(60)).await
    }

    /// Whole persisted log, or [`NO_LOGS`].
    pub async fn read_all(&self) -> String {
        match self.store.read_text(LOG_KEY).await {
            Ok(Some(text)) if !text.is_empty() => text,
            Ok(_) => NO_LOGS.to_string(),
            Err(e) => {
                log::error!("Failed to read activity log: {}", e);
                NO_LOGS.to_string()
            }
        }
    }

    /// Delete the persisted log.
    pub async fn clear(&self) {
        if let Err(e) = self.store.remove(LOG_KEY).await {
            log::error!("Failed to clear activity log: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::LocalStorage;
    use tempfile::TempDir;

    fn activity_log(tmp: &TempDir) -> ActivityLog {
        ActivityLog::new(Arc::new(LocalStorage::new(tmp.path())))
    }

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Error);
    }

    #[test]
    fn test_format_log_shape() {
        let line = format_log(LogLevel::Error, "boom\nsecond line");
        assert!(line.starts_with('['));
        assert!(line.contains("Z] [ERROR] boom second line"));
    }

    #[test]
    fn test_bounded_tail_drops_oldest() {
        let existing: String = (0..5).map(|i| format!("line {i}\n")).collect();
        let out = bounded_tail(&existing, "line 5", 3);
        assert_eq!(out, "line 3\nline 4\nline 5\n");
    }

    #[tokio::test]
    async fn test_empty_log_returns_sentinel() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(activity_log(&tmp).read_all().await, NO_LOGS);
    }

    #[tokio::test]
    async fn test_append_and_read() {
        let tmp = TempDir::new().unwrap();
        let log = activity_log(&tmp);

        log.info("first").await;
        log.debug("second").await;

        let text = log.read_all().await;
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("[INFO] first"));
        assert!(lines[1].ends_with("[DEBUG] second"));
    }

    #[tokio::test]
    async fn test_keeps_most_recent_lines() {
        let tmp = TempDir::new().unwrap();
        let log = activity_log(&tmp);

        for i in 0..(MAX_LOG_LINES + 20) {
            log.info(&format!("record {i}")).await;
        }

        let text = log.read_all().await;
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), MAX_LOG_LINES);
        assert!(lines[0].ends_with("record 20"));
        assert!(lines[MAX_LOG_LINES - 1].ends_with(&format!("record {}", MAX_LOG_LINES + 19)));
    }

    #[tokio::test]
    async fn test_clear_removes_log() {
        let tmp = TempDir::new().unwrap();
        let log = activity_log(&tmp);

        log.error("something failed").await;
        log.clear().await;
        assert_eq!(log.read_all().await, NO_LOGS);
    }
}
