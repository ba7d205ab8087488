//! # Reminders Feature
//!
//! Weekly class reminders. Once per tick the scheduler reconciles the wall
//! clock against every recurring event and notifies once per event per day.
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: true
//!
//! ## Changelog
//! - 2.0.0: Window matching with per-day fired-state and midnight pruning
//! - 1.0.0: Exact-minute matching

pub mod catalog;
pub mod event;
pub mod fired_state;
pub mod scheduler;

pub use catalog::{notifications_enabled_value, EventCatalog, SettingsStore, NOTIFICATION_ENABLED_KEY};
pub use event::{EventKey, RecurringEvent};
pub use fired_state::ReminderFiredState;
pub use scheduler::{ReminderHandle, ReminderScheduler};
