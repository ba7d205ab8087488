//! # Feature: Location
//!
//! Current-location estimate with provenance. Providers are tried in a fixed
//! order (sensor, one-shot lookups such as IP geolocation, default) and the
//! resolver keeps a single last-write-wins slot that manual overrides also
//! write to.
//!
//! - **Version**: 1.2.0
//! - **Since**: 0.2.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.2.0: Default estimate records why the fallback chain was exhausted
//! - 1.1.0: Push sensor adapter for platform location callbacks
//! - 1.0.0: Initial release with IP geolocation and manual override

pub mod estimate;
pub mod providers;
pub mod resolver;

pub use estimate::{LocationEstimate, Precision, Provenance, CAMPUS_CENTER, DEFAULT_NOTE};
pub use providers::{
    parse_ip_api_response, IpGeolocationProvider, LocationProvider, LocationSensor, PushSensor,
    SensorFeed, SensorReading, UnavailableSensor,
};
pub use resolver::{LocationResolver, CAMPUS_MANUAL_LABEL};
