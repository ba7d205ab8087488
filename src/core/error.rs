//! # Error Taxonomy
//!
//! Typed errors for the degradable parts of the assistant. None of these is
//! fatal: each is handled and logged by the component that owns the fallback.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.2.0

/// Failure of a single location provider.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LocationError {
    /// Provider could not initialize (no sensor hardware, permission denied, ...)
    #[error("provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Lookup timed out, could not connect, or returned an unusable payload
    #[error("network failure: {0}")]
    NetworkFailure(String),
}

/// A catalog record the scheduler cannot interpret.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScheduleError {
    #[error("malformed event record '{name}': {reason}")]
    MalformedEventRecord { name: String, reason: String },
}

/// Notification dispatch failed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("delivery failed via {sink}: {reason}")]
pub struct DeliveryError {
    pub sink: String,
    pub reason: String,
}

impl DeliveryError {
    pub fn new(sink: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            sink: sink.into(),
            reason: reason.into(),
        }
    }
}

/// Route lookup failure. The display text is shown to the user as-is.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RouteError {
    #[error("请输入目的地")]
    EmptyDestination,

    #[error("未找到地点: {destination}\n请从以下地点选择: {}", .known.join(", "))]
    NotFound {
        destination: String,
        known: Vec<String>,
    },
}
