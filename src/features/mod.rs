//! # Features
//!
//! Feature modules and the registry of their versions.

pub mod contests;
pub mod location;
pub mod navigation;
pub mod news;
pub mod notifications;
pub mod reminders;

pub use contests::{default_contests, Contest};
pub use location::{
    IpGeolocationProvider, LocationEstimate, LocationProvider, LocationResolver, LocationSensor,
    Precision, Provenance, PushSensor, SensorFeed, SensorReading, UnavailableSensor,
};
pub use navigation::{estimate_route, CampusLocation, CampusMap, RouteInfo};
pub use news::{NewsItem, NewsScraper, Notice};
pub use notifications::{CommandSink, LogSink, NotificationIntent, NotificationSink};
pub use reminders::{
    EventCatalog, RecurringEvent, ReminderFiredState, ReminderHandle, ReminderScheduler,
    SettingsStore,
};

/// Registry entry for a feature module
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Feature {
    pub id: &'static str,
    pub name: &'static str,
    pub version: &'static str,
    pub since: &'static str,
    /// Whether a setting can switch it off (reminders via `notification_enabled`)
    pub toggleable: bool,
}

const FEATURES: [Feature; 6] = [
    Feature {
        id: "reminders",
        name: "Reminders",
        version: "2.0.0",
        since: "0.1.0",
        toggleable: true,
    },
    Feature {
        id: "notifications",
        name: "Notifications",
        version: "1.1.0",
        since: "0.1.0",
        toggleable: true,
    },
    Feature {
        id: "location",
        name: "Location",
        version: "1.2.0",
        since: "0.2.0",
        toggleable: false,
    },
    Feature {
        id: "navigation",
        name: "Navigation",
        version: "1.1.0",
        since: "0.3.0",
        toggleable: false,
    },
    Feature {
        id: "news",
        name: "Campus News",
        version: "1.0.1",
        since: "0.4.0",
        toggleable: false,
    },
    Feature {
        id: "contests",
        name: "Contests",
        version: "1.0.0",
        since: "0.4.0",
        toggleable: false,
    },
];

pub fn get_features() -> &'static [Feature] {
    &FEATURES
}

pub fn get_feature(id: &str) -> Option<Feature> {
    FEATURES.iter().find(|f| f.id == id).copied()
}

pub fn get_app_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_ids_unique() {
        let mut ids: Vec<_> = get_features().iter().map(|f| f.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), get_features().len());
    }

    #[test]
    fn test_get_feature() {
        assert!(get_feature("reminders").unwrap().toggleable);
        assert!(get_feature("unknown").is_none());
        assert!(!get_app_version().is_empty());
    }
}
