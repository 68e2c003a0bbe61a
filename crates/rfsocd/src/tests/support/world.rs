//! BDD test world: encapsulates loader, reporter and launch state for step functions.

use std::cell::RefCell;
use std::sync::Arc;

use rfsoc_config::Config;

use crate::bootstrap::{BootstrapError, ConfigLoader, StaticConfigLoader, bootstrap_with};
use crate::bus::{BusError, BusSettings};
use crate::dispatch::Dispatcher;
use crate::driver::LoopbackDriver;
use crate::process::{LaunchError, launch};

use super::bus::ScriptedBus;
use super::config_loader::{FailingConfigLoader, TestConfigLoader};
use super::reporter::RecordingHealthReporter;

/// Scenario world shared across BDD steps.
pub struct TestWorld {
    loader: Box<dyn ConfigLoader>,
    pub reporter: Arc<RecordingHealthReporter>,
    bus_reachable: bool,
    bootstrapped: bool,
    bootstrap_error: Option<BootstrapError>,
    dispatcher: Option<Dispatcher<ScriptedBus, LoopbackDriver>>,
    launch_error: Option<LaunchError>,
}

impl TestWorld {
    /// Builds a world with a successful configuration loader and a reachable bus.
    #[must_use]
    pub fn new() -> Self {
        Self {
            loader: Box::new(TestConfigLoader::new()),
            reporter: Arc::new(RecordingHealthReporter::default()),
            bus_reachable: true,
            bootstrapped: false,
            bootstrap_error: None,
            dispatcher: None,
            launch_error: None,
        }
    }

    /// Installs a loader that always fails.
    pub fn use_failing_loader(&mut self) {
        self.loader = Box::new(FailingConfigLoader);
        self.reset_results();
    }

    /// Installs a loader that succeeds.
    pub fn use_successful_loader(&mut self) {
        self.loader = Box::new(TestConfigLoader::new());
        self.reset_results();
    }

    /// Installs a loader for the named device.
    pub fn use_device_name(&mut self, device_name: &str) {
        self.loader = Box::new(TestConfigLoader::with_device_name(device_name));
        self.reset_results();
    }

    /// Installs a loader whose configuration fails validation.
    pub fn use_blank_device_name(&mut self) {
        self.loader = Box::new(StaticConfigLoader::new(Config {
            device_name: "   ".to_owned(),
            ..Config::default()
        }));
        self.reset_results();
    }

    /// Makes the next launch fail to reach the bus.
    pub fn make_bus_unreachable(&mut self) {
        self.bus_reachable = false;
    }

    /// Runs the bootstrap sequence once.
    pub fn bootstrap(&mut self) {
        if self.bootstrapped {
            return;
        }
        self.bootstrapped = true;
        if let Err(error) = bootstrap_with(&*self.loader, self.reporter.clone()) {
            self.bootstrap_error = Some(error);
        }
    }

    /// Runs the full launch sequence once.
    pub fn launch(&mut self) {
        if self.dispatcher.is_some() || self.launch_error.is_some() {
            return;
        }
        let reachable = self.bus_reachable;
        let connect = move |settings: BusSettings| {
            if reachable {
                ScriptedBus::connect(settings)
            } else {
                Err(BusError::Unreachable {
                    host: settings.host,
                    port: settings.port,
                })
            }
        };
        match launch(
            &*self.loader,
            self.reporter.clone(),
            LoopbackDriver::new(),
            connect,
        ) {
            Ok(dispatcher) => self.dispatcher = Some(dispatcher),
            Err(error) => self.launch_error = Some(error),
        }
    }

    /// Returns whether bootstrap produced an error.
    #[must_use]
    pub fn bootstrap_error(&self) -> Option<&BootstrapError> {
        self.bootstrap_error.as_ref()
    }

    /// Returns true when bootstrap ran and succeeded.
    #[must_use]
    pub fn daemon_started(&self) -> bool {
        self.bootstrapped && self.bootstrap_error.is_none()
    }

    /// Returns the launch error, if any.
    #[must_use]
    pub fn launch_error(&self) -> Option<&LaunchError> {
        self.launch_error.as_ref()
    }

    /// Returns the launched dispatcher, if any.
    #[must_use]
    pub fn dispatcher(&self) -> Option<&Dispatcher<ScriptedBus, LoopbackDriver>> {
        self.dispatcher.as_ref()
    }

    fn reset_results(&mut self) {
        self.bootstrapped = false;
        self.bootstrap_error = None;
        self.dispatcher = None;
        self.launch_error = None;
    }
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Default test world fixture.
#[must_use]
pub fn world() -> RefCell<TestWorld> {
    RefCell::new(TestWorld::new())
}
