//! Straight-line route estimate.
//!
//! Planar distance in degrees scaled by [`KM_PER_DEGREE`]. Only valid at small
//! scale near a fixed latitude; not geodesic.

use std::fmt;

use super::{CampusLocation, CampusMap};
use crate::core::RouteError;
use crate::features::location::LocationEstimate;

pub const KM_PER_DEGREE: f64 = 111.0;

pub const WALKING_METERS_PER_MINUTE: f64 = 80.0;

/// Below this distance output uses meters
const METER_FORM_THRESHOLD_KM: f64 = 0.5;

#[derive(Debug, Clone, PartialEq)]
pub struct RouteInfo {
    pub destination: String,
    pub distance_km: f64,
    pub walking_minutes: u32,
}

impl RouteInfo {
    pub fn distance_text(&self) -> String {
        if self.distance_km < METER_FORM_THRESHOLD_KM {
            format!("步行约 {:.0} 米", self.distance_km * 1000.0)
        } else {
            format!("步行约 {:.1} 公里", self.distance_km)
        }
    }

    pub fn uses_meter_form(&self) -> bool {
        self.distance_km < METER_FORM_THRESHOLD_KM
    }
}

impl fmt::Display for RouteInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "目的地: {}\n{}\n预计时间: {} 分钟 (步行)",
            self.destination,
            self.distance_text(),
            self.walking_minutes
        )
    }
}

/// Exact name first, then substring containment in either direction.
/// First match in table order wins.
fn find_destination<'a>(destination: &str, map: &'a CampusMap) -> Option<&'a CampusLocation> {
    map.get(destination).or_else(|| {
        map.iter()
            .find(|l| destination.contains(l.name.as_str()) || l.name.contains(destination))
    })
}

pub fn estimate_route(
    current: &LocationEstimate,
    destination: &str,
    map: &CampusMap,
) -> Result<RouteInfo, RouteError> {
    let destination = destination.trim();
    if destination.is_empty() {
        return Err(RouteError::EmptyDestination);
    }

    let target = find_destination(destination, map).ok_or_else(|| RouteError::NotFound {
        destination: destination.to_string(),
        known: map.names(),
    })?;

    let dlat = target.lat - current.latitude;
    let dlon = target.lon - current.longitude;
    let distance_km = (dlat * dlat + dlon * dlon).sqrt() * KM_PER_DEGREE;
    let walking_minutes = (distance_km * 1000.0 / WALKING_METERS_PER_MINUTE) as u32;

    Ok(RouteInfo {
        destination: target.name.clone(),
        distance_km,
        walking_minutes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_route_uses_meters() {
        let route = estimate_route(
            &LocationEstimate::default_campus(),
            "教学楼A",
            &CampusMap::default(),
        )
        .unwrap();
        assert!(route.distance_km * 1000.0 < 100.0);
        assert!(route.uses_meter_form());
        assert_eq!(route.distance_text(), "步行约 78 米");
        assert_eq!(route.walking_minutes, 0);
    }

    #[test]
    fn test_long_route_uses_kilometers() {
        let current = LocationEstimate::manual(38.30, 109.76, "X");
        let route = estimate_route(&current, "南门", &CampusMap::default()).unwrap();
        assert_eq!(route.distance_text(), "步行约 3.4 公里");
        assert_eq!(route.walking_minutes, 42);
        assert_eq!(
            route.to_string(),
            "目的地: 南门\n步行约 3.4 公里\n预计时间: 42 分钟 (步行)"
        );
    }

    #[test]
    fn test_unknown_destination_lists_names() {
        let map = CampusMap::default();
        match estimate_route(&LocationEstimate::default_campus(), "火星", &map) {
            Err(RouteError::NotFound { destination, known }) => {
                assert_eq!(destination, "火星");
                assert_eq!(known, map.names());
            }
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_destination() {
        assert_eq!(
            estimate_route(&LocationEstimate::default_campus(), "   ", &CampusMap::default()),
            Err(RouteError::EmptyDestination)
        );
    }

    #[test]
    fn test_substring_match_both_directions() {
        let map = CampusMap::default();
        let current = LocationEstimate::default_campus();

        // Destination contains a known name
        let route = estimate_route(&current, "图书馆三楼", &map).unwrap();
        assert_eq!(route.destination, "图书馆");

        // Known name contains the destination; first in table order wins
        let route = estimate_route(&current, "教学楼", &map).unwrap();
        assert_eq!(route.destination, "教学楼A");
    }

    #[test]
    fn test_exact_match_preferred_over_substring() {
        let route =
            estimate_route(&LocationEstimate::default_campus(), "教学楼B", &CampusMap::default())
                .unwrap();
        assert_eq!(route.destination, "教学楼B");
    }
}
