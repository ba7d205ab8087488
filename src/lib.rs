// Core layer - config, errors, clock
pub mod core;

// Features layer - all feature modules
pub mod features;

// Infrastructure
pub mod database;

pub use crate::core::{Clock, Config, SystemClock};
pub use crate::database::Database;

pub use features::{
    // Location
    LocationEstimate, LocationResolver, Provenance,
    // Navigation
    estimate_route, CampusMap, RouteInfo,
    // Notifications
    NotificationIntent, NotificationSink,
    // Reminders
    RecurringEvent, ReminderScheduler,
};
