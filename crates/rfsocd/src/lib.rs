//! Command-and-control daemon for an RF system-on-chip board.
//!
//! The daemon subscribes to a Redis pub/sub topic named after the board,
//! decodes each JSON request, runs the matching hardware command and publishes
//! exactly one JSON response envelope on the shared `REPLY` topic. It is
//! strictly sequential: one request is received, handled and answered before
//! the next is read.
//!
//! Startup follows the usual daemon sequence: layered configuration is loaded
//! through [`rfsoc_config`], structured telemetry is installed, the privilege
//! check runs, and the bus is probed once. An unreachable bus at startup is
//! fatal; later outages are ridden out by backing off and reconnecting.
//!
//! Hardware access goes through the [`HardwareDriver`] trait. The shipped
//! binary links [`LoopbackDriver`], which records requests without touching
//! programmable logic; deployments with a real driver call
//! [`run_daemon_with`].

mod bootstrap;
pub mod bus;
pub mod channels;
pub mod dispatch;
pub mod driver;
pub mod handlers;
mod health;
mod process;
mod telemetry;

pub use bootstrap::{
    BootstrapError, ConfigLoader, Daemon, StaticConfigLoader, SystemConfigLoader, bootstrap_with,
};
pub use driver::{DriverError, HardwareDriver, LoopbackDriver};
pub use health::{HealthReporter, StructuredHealthReporter};
pub use process::{LaunchError, launch, run_daemon, run_daemon_with};
pub use telemetry::{RotatingFile, TelemetryError, TelemetryHandle};

#[cfg(test)]
mod tests;
