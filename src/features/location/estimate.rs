//! Location estimate value type.

use serde::{Deserialize, Serialize};

/// Campus centre (latitude, longitude), used when nothing better is known
pub const CAMPUS_CENTER: (f64, f64) = (38.2850, 109.7340);

pub const DEFAULT_NOTE: &str = "默认位置（榆林学院）";

/// Which provider produced an estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Provenance {
    Sensor,
    NetworkIP,
    Manual,
    Default,
}

impl std::fmt::Display for Provenance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provenance::Sensor => write!(f, "sensor"),
            Provenance::NetworkIP => write!(f, "network_ip"),
            Provenance::Manual => write!(f, "manual"),
            Provenance::Default => write!(f, "default"),
        }
    }
}

/// Coarse trust level derived from provenance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Precision {
    Precise,
    Coarse,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationEstimate {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
    pub accuracy_meters: f64,
    pub provenance: Provenance,
    pub note: String,
}

impl LocationEstimate {
    /// Hardcoded campus centre
    pub fn default_campus() -> Self {
        Self {
            latitude: CAMPUS_CENTER.0,
            longitude: CAMPUS_CENTER.1,
            altitude: 0.0,
            accuracy_meters: 0.0,
            provenance: Provenance::Default,
            note: DEFAULT_NOTE.to_string(),
        }
    }

    pub fn manual(latitude: f64, longitude: f64, label: impl Into<String>) -> Self {
        Self {
            latitude,
            longitude,
            altitude: 0.0,
            accuracy_meters: 10.0,
            provenance: Provenance::Manual,
            note: label.into(),
        }
    }

    pub fn precision(&self) -> Precision {
        match self.provenance {
            Provenance::Sensor | Provenance::Manual => Precision::Precise,
            Provenance::NetworkIP => Precision::Coarse,
            Provenance::Default => Precision::Fallback,
        }
    }

    pub fn is_default(&self) -> bool {
        self.provenance == Provenance::Default
    }

    /// One-line status for display next to a map
    pub fn status_label(&self) -> String {
        if self.is_default() {
            "使用默认位置（榆林学院）".to_string()
        } else {
            format!("纬度: {:.4}, 经度: {:.4}", self.latitude, self.longitude)
        }
    }

    /// Human-readable report of the estimate and how to improve it
    pub fn diagnostics(&self) -> Vec<String> {
        let mut lines = vec![
            format!("纬度: {}", self.latitude),
            format!("经度: {}", self.longitude),
            format!("位置来源: {} ({})", self.note, self.provenance),
            format!("精度: {}米", self.accuracy_meters),
        ];

        match self.provenance {
            Provenance::NetworkIP => {
                lines.push("当前使用IP定位，精度较低".to_string());
                lines.push("如需更高精度，请启用GPS设备或手动设置位置".to_string());
            }
            Provenance::Default => {
                lines.push("当前使用默认位置".to_string());
                lines.push("建议检查网络连接或手动设置位置".to_string());
            }
            Provenance::Sensor | Provenance::Manual => {}
        }

        lines
    }
}
