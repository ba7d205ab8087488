//! Single-slot current-location resolver.
//!
//! The slot is a `watch` channel: every write is a whole-record replace, so
//! readers never see a partially written estimate and UI consumers can
//! subscribe to changes. Writers race freely (sensor task, one-shot lookup,
//! manual override); the last write wins.

use log::{debug, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use super::{LocationEstimate, LocationProvider, LocationSensor, CAMPUS_CENTER, DEFAULT_NOTE};

/// Label stored by [`LocationResolver::reset_to_campus`]
pub const CAMPUS_MANUAL_LABEL: &str = "榆林学院（手动设置）";

pub struct LocationResolver {
    current: watch::Sender<Option<LocationEstimate>>,
    sensor: Arc<dyn LocationSensor>,
    fallbacks: Vec<Arc<dyn LocationProvider>>,
    sensor_active: AtomicBool,
    started: AtomicBool,
}

impl LocationResolver {
    pub fn new(sensor: Arc<dyn LocationSensor>) -> Self {
        let (current, _) = watch::channel(None);
        Self {
            current,
            sensor,
            fallbacks: Vec::new(),
            sensor_active: AtomicBool::new(false),
            started: AtomicBool::new(false),
        }
    }

    /// Append a one-shot provider to the chain tried when the sensor is unavailable
    pub fn with_fallback(mut self, provider: Arc<dyn LocationProvider>) -> Self {
        self.fallbacks.push(provider);
        self
    }

    /// Start the provider chain. Runs at most once per resolver.
    ///
    /// The sensor is tried first. If it starts, a task forwards its readings
    /// into the slot until the sensor stops. Otherwise the sensor is not
    /// retried and the one-shot providers run in a background task.
    pub fn start(self: &Arc<Self>) -> Option<JoinHandle<()>> {
        if self.started.swap(true, Ordering::SeqCst) {
            debug!("Location resolver already started");
            return None;
        }

        let (tx, mut rx) = mpsc::unbounded_channel();
        match self.sensor.start(tx) {
            Ok(()) => {
                self.sensor_active.store(true, Ordering::SeqCst);
                info!("📍 Location sensor '{}' started", self.sensor.name());

                let resolver = Arc::clone(self);
                Some(tokio::spawn(async move {
                    while let Some(reading) = rx.recv().await {
                        if !reading.is_valid() {
                            warn!("Discarding invalid sensor reading: {:?}", reading);
                            continue;
                        }
                        resolver.current.send_replace(Some(reading.into_estimate()));
                    }
                    resolver.sensor_active.store(false, Ordering::SeqCst);
                    debug!("Location sensor stream closed");
                }))
            }
            Err(e) => {
                warn!("Location sensor '{}' unavailable: {}", self.sensor.name(), e);
                let reasons = vec![format!("{}: {}", self.sensor.name(), e)];

                let resolver = Arc::clone(self);
                Some(tokio::spawn(async move {
                    resolver.run_fallback_chain(reasons).await;
                }))
            }
        }
    }

    /// Try each one-shot provider in order and store the first success.
    ///
    /// When every provider fails, a Default estimate recording the reasons is
    /// stored, but only if nothing else has been written in the meantime.
    async fn run_fallback_chain(&self, mut reasons: Vec<String>) {
        for provider in &self.fallbacks {
            match provider.locate().await {
                Ok(estimate) => {
                    info!(
                        "📍 Location from '{}': {:.4}, {:.4} ({})",
                        provider.name(),
                        estimate.latitude,
                        estimate.longitude,
                        estimate.note
                    );
                    self.current.send_replace(Some(estimate));
                    return;
                }
                Err(e) => {
                    warn!("Location provider '{}' failed: {}", provider.name(), e);
                    reasons.push(format!("{}: {}", provider.name(), e));
                }
            }
        }

        let mut fallback = LocationEstimate::default_campus();
        if !reasons.is_empty() {
            fallback.note = format!("{} ({})", DEFAULT_NOTE, reasons.join("; "));
        }

        let mut pending = Some(fallback);
        let stored = self.current.send_if_modified(|slot| {
            if slot.is_none() {
                *slot = pending.take();
                true
            } else {
                false
            }
        });
        if stored {
            info!("📍 Using default campus location");
        }
    }

    /// Latest stored estimate, or the Default estimate if nothing was ever stored
    pub fn get_current_location(&self) -> LocationEstimate {
        self.current
            .borrow()
            .clone()
            .unwrap_or_else(LocationEstimate::default_campus)
    }

    /// Never fails; same as [`get_current_location`](Self::get_current_location)
    pub fn resolve(&self) -> LocationEstimate {
        self.get_current_location()
    }

    pub fn set_manual_location(&self, latitude: f64, longitude: f64, label: impl Into<String>) {
        let estimate = LocationEstimate::manual(latitude, longitude, label);
        info!(
            "📍 Manual location set: {:.4}, {:.4} ({})",
            latitude, longitude, estimate.note
        );
        self.current.send_replace(Some(estimate));
    }

    /// Manually place the user at the campus centre
    pub fn reset_to_campus(&self) {
        self.set_manual_location(CAMPUS_CENTER.0, CAMPUS_CENTER.1, CAMPUS_MANUAL_LABEL);
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<LocationEstimate>> {
        self.current.subscribe()
    }

    pub fn sensor_active(&self) -> bool {
        self.sensor_active.load(Ordering::SeqCst)
    }

    /// Stop the sensor. The last stored estimate is kept.
    pub fn stop(&self) {
        if self.sensor_active.swap(false, Ordering::SeqCst) {
            self.sensor.stop();
            info!("Location sensor '{}' stopped", self.sensor.name());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LocationError;
    use crate::features::location::{Provenance, PushSensor, SensorReading, UnavailableSensor};
    use async_trait::async_trait;

    struct StubProvider(Result<LocationEstimate, LocationError>);

    #[async_trait]
    impl LocationProvider for StubProvider {
        fn name(&self) -> &'static str {
            "stub"
        }

        async fn locate(&self) -> Result<LocationEstimate, LocationError> {
            self.0.clone()
        }
    }

    fn failing() -> Arc<dyn LocationProvider> {
        Arc::new(StubProvider(Err(LocationError::NetworkFailure(
            "request timed out".to_string(),
        ))))
    }

    fn ip_estimate() -> LocationEstimate {
        LocationEstimate {
            latitude: 38.29,
            longitude: 109.74,
            altitude: 0.0,
            accuracy_meters: 1000.0,
            provenance: Provenance::NetworkIP,
            note: "IP定位: Yulin, Shaanxi".to_string(),
        }
    }

    #[test]
    fn test_default_before_any_provider() {
        let resolver = LocationResolver::new(Arc::new(UnavailableSensor));
        let estimate = resolver.get_current_location();
        assert_eq!(estimate.provenance, Provenance::Default);
        assert_eq!(estimate.accuracy_meters, 0.0);
        assert_eq!(resolver.resolve(), estimate);
    }

    #[test]
    fn test_manual_location_returned_exactly() {
        let resolver = LocationResolver::new(Arc::new(UnavailableSensor));
        resolver.set_manual_location(38.0, 109.0, "X");
        assert_eq!(
            resolver.get_current_location(),
            LocationEstimate::manual(38.0, 109.0, "X")
        );
    }

    #[test]
    fn test_reset_to_campus() {
        let resolver = LocationResolver::new(Arc::new(UnavailableSensor));
        resolver.reset_to_campus();
        let estimate = resolver.get_current_location();
        assert_eq!(estimate.provenance, Provenance::Manual);
        assert_eq!(estimate.note, CAMPUS_MANUAL_LABEL);
        assert_eq!((estimate.latitude, estimate.longitude), CAMPUS_CENTER);
    }

    #[tokio::test]
    async fn test_exhausted_chain_stores_default_with_reason() {
        let resolver = Arc::new(LocationResolver::new(Arc::new(UnavailableSensor)).with_fallback(failing()));
        resolver.start().unwrap().await.unwrap();

        let estimate = resolver.get_current_location();
        assert_eq!(estimate.provenance, Provenance::Default);
        assert!(estimate.note.starts_with(DEFAULT_NOTE));
        assert!(estimate.note.contains("request timed out"));
        assert!(!resolver.sensor_active());
    }

    #[tokio::test]
    async fn test_first_successful_provider_wins() {
        let resolver = Arc::new(
            LocationResolver::new(Arc::new(UnavailableSensor))
                .with_fallback(failing())
                .with_fallback(Arc::new(StubProvider(Ok(ip_estimate())))),
        );
        resolver.start().unwrap().await.unwrap();
        assert_eq!(resolver.get_current_location(), ip_estimate());
    }

    #[tokio::test]
    async fn test_default_fallback_does_not_overwrite_manual() {
        let resolver = Arc::new(LocationResolver::new(Arc::new(UnavailableSensor)).with_fallback(failing()));
        resolver.set_manual_location(38.0, 109.0, "X");
        resolver.start().unwrap().await.unwrap();
        assert_eq!(resolver.get_current_location().provenance, Provenance::Manual);
    }

    #[tokio::test]
    async fn test_push_sensor_updates_slot() {
        let (sensor, feed) = PushSensor::new();
        let resolver = Arc::new(LocationResolver::new(Arc::new(sensor)));
        let mut updates = resolver.subscribe();
        let task = resolver.start().unwrap();
        assert!(resolver.sensor_active());

        let reading = SensorReading {
            latitude: 38.2862,
            longitude: 109.7342,
            altitude: 1100.0,
            accuracy_meters: 5.0,
        };
        assert!(feed.push(reading));
        updates.changed().await.unwrap();
        assert_eq!(resolver.get_current_location(), reading.into_estimate());

        // Manual write wins over the earlier sensor value
        resolver.set_manual_location(38.0, 109.0, "X");
        assert_eq!(resolver.get_current_location().provenance, Provenance::Manual);

        resolver.stop();
        task.await.unwrap();
        assert!(!resolver.sensor_active());
        assert_eq!(resolver.get_current_location().provenance, Provenance::Manual);
    }

    #[tokio::test]
    async fn test_start_runs_once() {
        let resolver = Arc::new(LocationResolver::new(Arc::new(UnavailableSensor)));
        let first = resolver.start();
        assert!(first.is_some());
        assert!(resolver.start().is_none());
        first.unwrap().await.unwrap();
    }
}
