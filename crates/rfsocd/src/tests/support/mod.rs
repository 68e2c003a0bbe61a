//! Test harness utilities shared by the daemon behavioural suites.

mod bus;
mod config_loader;
mod reporter;
mod world;

pub use bus::ScriptedBus;
pub use config_loader::{FailingConfigLoader, TestConfigLoader};
pub use reporter::{HealthEvent, RecordingHealthReporter};
pub use world::{TestWorld, world};
