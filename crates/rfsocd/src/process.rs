//! Daemon entry point: bootstrap, connect, then dispatch forever.

use std::process::ExitCode;
use std::sync::Arc;
use std::thread;

use thiserror::Error;
use tracing::{error, info};

use crate::bootstrap::{BootstrapError, ConfigLoader, Daemon, SystemConfigLoader, bootstrap_with};
use crate::bus::{BusError, BusSettings, MessageBus, RedisBus};
use crate::dispatch::{CommandRouter, Dispatcher};
use crate::driver::{HardwareDriver, LoopbackDriver};
use crate::health::{HealthReporter, StructuredHealthReporter};

const PROCESS_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::process");

/// Errors that stop the daemon before its loop starts.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// Bootstrapping the daemon failed.
    #[error("daemon bootstrap failed: {source}")]
    Bootstrap {
        /// Underlying bootstrap error.
        #[source]
        source: BootstrapError,
    },
    /// The bus could not be reached at startup.
    #[error("failed to connect to the message bus: {source}")]
    Bus {
        /// Underlying bus error.
        #[source]
        source: BusError,
    },
}

impl From<BootstrapError> for LaunchError {
    fn from(source: BootstrapError) -> Self {
        Self::Bootstrap { source }
    }
}

impl From<BusError> for LaunchError {
    fn from(source: BusError) -> Self {
        Self::Bus { source }
    }
}

/// Runs the daemon with the loopback driver.
#[must_use]
pub fn run_daemon() -> ExitCode {
    run_daemon_with(LoopbackDriver::new())
}

/// Runs the daemon with the supplied hardware driver.
///
/// Only returns on a startup failure; the dispatch loop itself never ends.
#[must_use]
pub fn run_daemon_with<D: HardwareDriver>(driver: D) -> ExitCode {
    let reporter: Arc<dyn HealthReporter> = Arc::new(StructuredHealthReporter::new());
    match launch(&SystemConfigLoader, reporter, driver, RedisBus::connect) {
        Ok(mut dispatcher) => dispatcher.run(),
        Err(failure) => {
            error!(target: PROCESS_TARGET, error = %failure, "daemon failed to start");
            ExitCode::FAILURE
        }
    }
}

/// Bootstraps the daemon and builds its dispatcher without entering the loop.
///
/// When the bus is unreachable the configured startup delay is slept before
/// returning, so a supervisor restarting the process does not spin.
///
/// # Errors
///
/// Returns [`LaunchError`] if bootstrap or the first bus connection fails.
pub fn launch<B, D, F>(
    loader: &dyn ConfigLoader,
    reporter: Arc<dyn HealthReporter>,
    driver: D,
    connect: F,
) -> Result<Dispatcher<B, D>, LaunchError>
where
    B: MessageBus,
    D: HardwareDriver,
    F: FnOnce(BusSettings) -> Result<B, BusError>,
{
    let daemon = bootstrap_with(loader, reporter)?;
    let bus = match daemon.connect_bus(connect) {
        Ok(bus) => bus,
        Err(source) => {
            let delay = daemon.config().startup_exit_delay();
            info!(
                target: PROCESS_TARGET,
                delay_secs = delay.as_secs(),
                "exiting after startup delay"
            );
            thread::sleep(delay);
            return Err(LaunchError::from(source));
        }
    };
    Ok(assemble(&daemon, bus, driver))
}

fn assemble<B, D>(daemon: &Daemon, bus: B, driver: D) -> Dispatcher<B, D>
where
    B: MessageBus,
    D: HardwareDriver,
{
    Dispatcher::new(
        bus,
        CommandRouter::new(driver),
        daemon.config().reconnect_backoff(),
    )
}
