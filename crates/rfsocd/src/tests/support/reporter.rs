//! Test double for [`HealthReporter`] that records structured events for assertions.

use std::sync::Mutex;

use rfsoc_config::Config;

use crate::bootstrap::BootstrapError;
use crate::bus::{BusError, BusSettings};
use crate::health::HealthReporter;

/// Structured health events tracked during scenarios.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HealthEvent {
    /// Bootstrap started.
    BootstrapStarting,
    /// Bootstrap completed successfully.
    BootstrapSucceeded,
    /// Bootstrap failed with an error description.
    BootstrapFailed(String),
    /// Bus connection initiated for the given topic.
    BusConnecting(String),
    /// Bus answered its first probe.
    BusReady(String),
    /// Bus could not be reached.
    BusUnreachable(String),
}

/// Records health events for assertions.
#[derive(Debug, Default)]
pub struct RecordingHealthReporter {
    events: Mutex<Vec<HealthEvent>>,
}

impl RecordingHealthReporter {
    /// Captures a copy of the recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<HealthEvent> {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .clone()
    }

    pub fn record(&self, event: HealthEvent) {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .push(event);
    }
}

impl HealthReporter for RecordingHealthReporter {
    fn bootstrap_starting(&self) {
        self.record(HealthEvent::BootstrapStarting);
    }

    fn bootstrap_succeeded(&self, _config: &Config) {
        self.record(HealthEvent::BootstrapSucceeded);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        self.record(HealthEvent::BootstrapFailed(error.to_string()));
    }

    fn bus_connecting(&self, settings: &BusSettings) {
        self.record(HealthEvent::BusConnecting(settings.topic.clone()));
    }

    fn bus_ready(&self, settings: &BusSettings) {
        self.record(HealthEvent::BusReady(settings.topic.clone()));
    }

    fn bus_unreachable(&self, error: &BusError) {
        self.record(HealthEvent::BusUnreachable(error.to_string()));
    }
}
