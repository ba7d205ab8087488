//! Campus location table.

use anyhow::Result;
use log::{info, warn};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampusLocation {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub building: Option<String>,
}

impl CampusLocation {
    pub fn new(name: &str, lat: f64, lon: f64) -> Self {
        Self {
            name: name.to_string(),
            lat,
            lon,
            building: None,
        }
    }
}

/// Ordered table of known campus locations.
///
/// Lookups iterate in table order, so substring matches are deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampusMap {
    pub locations: Vec<CampusLocation>,
}

impl Default for CampusMap {
    fn default() -> Self {
        Self {
            locations: vec![
                CampusLocation::new("东门", 38.2860, 109.7350),
                CampusLocation::new("南门", 38.2840, 109.7340),
                CampusLocation::new("西门", 38.2855, 109.7320),
                CampusLocation::new("北门", 38.2870, 109.7335),
                CampusLocation::new("教学楼A", 38.2855, 109.7345),
                CampusLocation::new("教学楼B", 38.2858, 109.7348),
                CampusLocation::new("图书馆", 38.2862, 109.7342),
                CampusLocation::new("体育馆", 38.2845, 109.7335),
                CampusLocation::new("食堂", 38.2852, 109.7338),
                CampusLocation::new("宿舍楼1", 38.2848, 109.7352),
                CampusLocation::new("宿舍楼2", 38.2846, 109.7355),
                CampusLocation::new("行政楼", 38.2865, 109.7338),
                CampusLocation::new("实验楼", 38.2850, 109.7355),
            ],
        }
    }
}

impl CampusMap {
    /// Load a campus table from a YAML file
    pub fn load(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let map: CampusMap = serde_yaml::from_str(&contents)?;
        map.validate()?;
        Ok(map)
    }

    /// Load from `path` when configured, falling back to the built-in table
    pub fn load_or_default(path: Option<&str>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };
        match Self::load(path) {
            Ok(map) => {
                info!("Loaded {} campus locations from {}", map.len(), path);
                map
            }
            Err(e) => {
                warn!("Failed to load campus map from {}: {}. Using built-in table", path, e);
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.locations.is_empty() {
            return Err(anyhow::anyhow!("Campus map has no locations"));
        }

        for location in &self.locations {
            if location.name.trim().is_empty() {
                return Err(anyhow::anyhow!("Campus location with empty name"));
            }
            if !(-90.0..=90.0).contains(&location.lat) || !(-180.0..=180.0).contains(&location.lon)
            {
                return Err(anyhow::anyhow!(
                    "Coordinates out of range for '{}': {}, {}",
                    location.name,
                    location.lat,
                    location.lon
                ));
            }
        }

        let mut seen = std::collections::HashSet::new();
        for location in &self.locations {
            if !seen.insert(location.name.as_str()) {
                return Err(anyhow::anyhow!("Duplicate campus location: {}", location.name));
            }
        }

        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&CampusLocation> {
        self.locations.iter().find(|l| l.name == name)
    }

    pub fn names(&self) -> Vec<String> {
        self.locations.iter().map(|l| l.name.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CampusLocation> {
        self.locations.iter()
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table() {
        let map = CampusMap::default();
        assert_eq!(map.len(), 13);
        assert!(map.validate().is_ok());
        let building = map.get("教学楼A").unwrap();
        assert_eq!((building.lat, building.lon), (38.2855, 109.7345));
        assert_eq!(map.names()[0], "东门");
    }

    #[test]
    fn test_parse_yaml_table() {
        let yaml = r#"
locations:
  - name: 图书馆
    lat: 38.2862
    lon: 109.7342
    building: Library
  - name: 操场
    lat: 38.2843
    lon: 109.7330
"#;
        let map: CampusMap = serde_yaml::from_str(yaml).unwrap();
        assert!(map.validate().is_ok());
        assert_eq!(map.get("图书馆").unwrap().building.as_deref(), Some("Library"));
        assert_eq!(map.get("操场").unwrap().building, None);
    }

    #[test]
    fn test_validate_rejects_bad_tables() {
        assert!(CampusMap { locations: vec![] }.validate().is_err());

        let duplicate = CampusMap {
            locations: vec![
                CampusLocation::new("东门", 38.0, 109.0),
                CampusLocation::new("东门", 38.1, 109.1),
            ],
        };
        assert!(duplicate.validate().is_err());

        let out_of_range = CampusMap {
            locations: vec![CampusLocation::new("东门", 138.0, 109.0)],
        };
        assert!(out_of_range.validate().is_err());
    }

    #[test]
    fn test_load_missing_file() {
        assert!(CampusMap::load("/nonexistent/campus.yaml").is_err());
        assert_eq!(
            CampusMap::load_or_default(Some("/nonexistent/campus.yaml")),
            CampusMap::default()
        );
    }
}
