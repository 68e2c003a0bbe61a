//! Structured health reporting for daemon lifecycle events.

use std::sync::Arc;

use rfsoc_config::Config;

use crate::bootstrap::BootstrapError;
use crate::bus::{BusError, BusSettings};

/// Observer trait used to surface lifecycle events to telemetry sinks.
pub trait HealthReporter: Send + Sync {
    /// Invoked before configuration loading begins.
    fn bootstrap_starting(&self);

    /// Invoked after bootstrap completes successfully.
    fn bootstrap_succeeded(&self, config: &Config);

    /// Invoked when bootstrap fails.
    fn bootstrap_failed(&self, error: &BootstrapError);

    /// Invoked before the bus session is opened.
    fn bus_connecting(&self, settings: &BusSettings);

    /// Invoked once the bus answers its first probe.
    fn bus_ready(&self, settings: &BusSettings);

    /// Invoked when the bus cannot be reached at startup.
    fn bus_unreachable(&self, error: &BusError);
}

impl<T> HealthReporter for Arc<T>
where
    T: HealthReporter,
{
    fn bootstrap_starting(&self) {
        (**self).bootstrap_starting();
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        (**self).bootstrap_succeeded(config);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        (**self).bootstrap_failed(error);
    }

    fn bus_connecting(&self, settings: &BusSettings) {
        (**self).bus_connecting(settings);
    }

    fn bus_ready(&self, settings: &BusSettings) {
        (**self).bus_ready(settings);
    }

    fn bus_unreachable(&self, error: &BusError) {
        (**self).bus_unreachable(error);
    }
}

/// Default reporter that records lifecycle events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredHealthReporter;

impl StructuredHealthReporter {
    /// Builds a new reporter.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl HealthReporter for StructuredHealthReporter {
    fn bootstrap_starting(&self) {
        tracing::info!(
            target: "rfsocd::health",
            event = "bootstrap_starting",
            "starting daemon bootstrap"
        );
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        tracing::info!(
            target: "rfsocd::health",
            event = "bootstrap_succeeded",
            device = %config.device_name(),
            log_filter = %config.log_filter(),
            log_format = %config.log_format(),
            "daemon bootstrap completed"
        );
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        tracing::error!(
            target: "rfsocd::health",
            event = "bootstrap_failed",
            error = %error,
            "daemon bootstrap failed"
        );
    }

    fn bus_connecting(&self, settings: &BusSettings) {
        tracing::info!(
            target: "rfsocd::health",
            event = "bus_connecting",
            host = %settings.host,
            port = settings.port,
            topic = %settings.topic,
            "connecting to message bus"
        );
    }

    fn bus_ready(&self, settings: &BusSettings) {
        tracing::info!(
            target: "rfsocd::health",
            event = "bus_ready",
            topic = %settings.topic,
            "message bus ready"
        );
    }

    fn bus_unreachable(&self, error: &BusError) {
        tracing::error!(
            target: "rfsocd::health",
            event = "bus_unreachable",
            error = %error,
            detail = ?error,
            "message bus unreachable"
        );
    }
}
