//! # Location Providers
//!
//! Push-based sensors and one-shot lookup providers.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.2.0
//!
//! ## Changelog
//! - 1.1.0: Add PushSensor/SensorFeed so platform callbacks can feed fixes in
//! - 1.0.0: IP geolocation provider with bounded timeout

use async_trait::async_trait;
use log::debug;
use reqwest::header::USER_AGENT;
use serde::Deserialize;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

use super::{LocationEstimate, Provenance};
use crate::core::LocationError;

/// Reported accuracy of IP-based estimates (meters)
const IP_ACCURACY_METERS: f64 = 1000.0;

// ============================================================================
// Push sensors
// ============================================================================

/// A single fix from a location sensor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorReading {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
    pub accuracy_meters: f64,
}

impl SensorReading {
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    pub fn into_estimate(self) -> LocationEstimate {
        LocationEstimate {
            latitude: self.latitude,
            longitude: self.longitude,
            altitude: self.altitude,
            accuracy_meters: self.accuracy_meters,
            provenance: Provenance::Sensor,
            note: "GPS定位".to_string(),
        }
    }
}

/// Push-based location sensor.
///
/// `start` either begins delivering readings on `updates` or fails; a failed
/// sensor is not retried for the life of the process.
pub trait LocationSensor: Send + Sync {
    fn name(&self) -> &'static str;

    fn start(&self, updates: mpsc::UnboundedSender<SensorReading>) -> Result<(), LocationError>;

    fn stop(&self);
}

/// Sensor for platforms without location hardware.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableSensor;

impl LocationSensor for UnavailableSensor {
    fn name(&self) -> &'static str {
        "none"
    }

    fn start(&self, _updates: mpsc::UnboundedSender<SensorReading>) -> Result<(), LocationError> {
        Err(LocationError::ProviderUnavailable(
            "no location sensor on this platform".to_string(),
        ))
    }

    fn stop(&self) {}
}

type SharedSender = Arc<Mutex<Option<mpsc::UnboundedSender<SensorReading>>>>;

/// Sensor whose readings are pushed by the host application through a
/// [`SensorFeed`], e.g. from a platform GPS callback.
#[derive(Debug)]
pub struct PushSensor {
    sender: SharedSender,
}

/// Producer side of a [`PushSensor`].
#[derive(Debug, Clone)]
pub struct SensorFeed {
    sender: SharedSender,
}

impl PushSensor {
    pub fn new() -> (Self, SensorFeed) {
        let sender: SharedSender = Arc::new(Mutex::new(None));
        (
            Self {
                sender: Arc::clone(&sender),
            },
            SensorFeed { sender },
        )
    }
}

impl LocationSensor for PushSensor {
    fn name(&self) -> &'static str {
        "push"
    }

    fn start(&self, updates: mpsc::UnboundedSender<SensorReading>) -> Result<(), LocationError> {
        *self.sender.lock().unwrap_or_else(|e| e.into_inner()) = Some(updates);
        Ok(())
    }

    fn stop(&self) {
        self.sender.lock().unwrap_or_else(|e| e.into_inner()).take();
    }
}

impl SensorFeed {
    /// Deliver a reading. Returns false when the sensor is not running.
    pub fn push(&self, reading: SensorReading) -> bool {
        let guard = self.sender.lock().unwrap_or_else(|e| e.into_inner());
        match guard.as_ref() {
            Some(tx) => tx.send(reading).is_ok(),
            None => false,
        }
    }
}

// ============================================================================
// One-shot providers
// ============================================================================

/// Provider that produces a single estimate on request.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn locate(&self) -> Result<LocationEstimate, LocationError>;
}

/// Coarse location from a public IP geolocation service (ip-api.com format).
#[derive(Debug, Clone)]
pub struct IpGeolocationProvider {
    client: reqwest::Client,
    url: String,
}

impl IpGeolocationProvider {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, LocationError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LocationError::ProviderUnavailable(format!("HTTP client: {e}")))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl LocationProvider for IpGeolocationProvider {
    fn name(&self) -> &'static str {
        "ip-geolocation"
    }

    async fn locate(&self) -> Result<LocationEstimate, LocationError> {
        debug!("Requesting IP geolocation from {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .header(USER_AGENT, "Mozilla/5.0")
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LocationError::NetworkFailure(format!("request timed out: {e}"))
                } else {
                    LocationError::NetworkFailure(format!("connection error: {e}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(LocationError::NetworkFailure(format!("HTTP error: {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| LocationError::NetworkFailure(format!("failed to read body: {e}")))?;

        parse_ip_api_response(&body)
    }
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: Option<String>,
    message: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
    city: Option<String>,
    #[serde(rename = "regionName")]
    region_name: Option<String>,
}

/// Validate an ip-api.com style JSON payload into a NetworkIP estimate.
///
/// The payload is untrusted: missing coordinates or `status != "success"`
/// are failures.
pub fn parse_ip_api_response(body: &str) -> Result<LocationEstimate, LocationError> {
    let data: IpApiResponse = serde_json::from_str(body)
        .map_err(|e| LocationError::NetworkFailure(format!("malformed response: {e}")))?;

    if data.status.as_deref() != Some("success") {
        return Err(LocationError::NetworkFailure(format!(
            "lookup failed: {}",
            data.message.as_deref().unwrap_or("unknown error")
        )));
    }

    let (Some(lat), Some(lon)) = (data.lat, data.lon) else {
        return Err(LocationError::NetworkFailure(
            "response missing coordinates".to_string(),
        ));
    };

    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return Err(LocationError::NetworkFailure(format!(
            "coordinates out of range: {lat}, {lon}"
        )));
    }

    let city = data.city.filter(|c| !c.is_empty());
    let region = data.region_name.filter(|r| !r.is_empty());

    Ok(LocationEstimate {
        latitude: lat,
        longitude: lon,
        altitude: 0.0,
        accuracy_meters: IP_ACCURACY_METERS,
        provenance: Provenance::NetworkIP,
        note: format!(
            "IP定位: {}, {}",
            city.as_deref().unwrap_or("未知城市"),
            region.as_deref().unwrap_or("未知省份")
        ),
    })
}
