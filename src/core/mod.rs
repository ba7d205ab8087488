//! # Core Module
//!
//! Configuration, error taxonomy, and the clock source shared by all features.
//!
//! - **Version**: 1.2.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.2.0: Add clock module for injectable wall-clock time
//! - 1.1.0: Add typed error taxonomy
//! - 1.0.0: Initial creation with config module

pub mod clock;
pub mod config;
pub mod error;

// Re-export commonly used items
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::Config;
pub use error::{DeliveryError, LocationError, RouteError, ScheduleError};
