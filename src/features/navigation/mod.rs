//! # Feature: Navigation
//!
//! Campus location table and straight-line route estimates from the current
//! location. Invoked on demand; not time-driven.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.3.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.1.0: Campus table can be loaded from YAML
//! - 1.0.0: Initial release with built-in campus locations

pub mod map;
pub mod route;

pub use map::{CampusLocation, CampusMap};
pub use route::{estimate_route, RouteInfo, KM_PER_DEGREE, WALKING_METERS_PER_MINUTE};
