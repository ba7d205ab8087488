//! # Feature: Notifications
//!
//! Notification intents and the sinks that deliver them. Delivery is an
//! injected capability: the scheduler only knows the [`NotificationSink`] trait.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//! - **Toggleable**: true
//!
//! ## Changelog
//! - 1.1.0: Added CommandSink for desktop notifier programs
//! - 1.0.0: Initial release with log-only delivery

pub mod sink;

pub use sink::{CommandSink, LogSink, NotificationSink};

use crate::features::reminders::RecurringEvent;
use chrono::NaiveDateTime;

/// App name shown by desktop notifiers that support it
pub const APP_NAME: &str = "榆林学院校园助手";

/// A notification ready for delivery.
///
/// Intents carry no identity; duplicate suppression is the scheduler's job.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationIntent {
    pub title: String,
    pub body: String,
    pub event_ref: Option<RecurringEvent>,
    pub created_at: NaiveDateTime,
}

impl NotificationIntent {
    pub fn new(title: impl Into<String>, body: impl Into<String>, created_at: NaiveDateTime) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            event_ref: None,
            created_at,
        }
    }

    pub fn for_event(mut self, event: RecurringEvent) -> Self {
        self.event_ref = Some(event);
        self
    }
}
