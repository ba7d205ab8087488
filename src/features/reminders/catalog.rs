//! Collaborator contracts the scheduler reads from.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

use anyhow::Result;
use async_trait::async_trait;

use super::RecurringEvent;

/// Settings key consulted before each tick's dispatch
pub const NOTIFICATION_ENABLED_KEY: &str = "notification_enabled";

/// Read-only source of recurring events, queried once per tick.
#[async_trait]
pub trait EventCatalog: Send + Sync {
    /// Full snapshot, ideally ordered by day then time
    async fn list_events(&self) -> Result<Vec<RecurringEvent>>;
}

/// Key-value settings store.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn get_setting(&self, key: &str) -> Result<Option<String>>;
}

/// Interpret a stored `notification_enabled` value.
///
/// A missing value means enabled; only explicit negatives disable.
pub fn notifications_enabled_value(value: Option<&str>) -> bool {
    match value.map(|v| v.trim().to_lowercase()) {
        Some(v) => !matches!(v.as_str(), "false" | "0" | "off" | "no" | "disabled"),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notifications_enabled_value() {
        assert!(notifications_enabled_value(None));
        assert!(notifications_enabled_value(Some("True")));
        assert!(notifications_enabled_value(Some("1")));
        assert!(!notifications_enabled_value(Some("False")));
        assert!(!notifications_enabled_value(Some(" off ")));
        assert!(!notifications_enabled_value(Some("0")));
    }
}
