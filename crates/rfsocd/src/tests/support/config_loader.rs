//! Test configuration loaders for scenarios covering success and failure paths.

use std::ffi::OsString;
use std::sync::Arc;

use ortho_config::{OrthoConfig, OrthoError};
use rfsoc_config::Config;

use crate::bootstrap::ConfigLoader;

/// Loader that returns defaults with every startup delay disabled.
#[derive(Debug, Clone, Default)]
pub struct TestConfigLoader {
    device_name: Option<String>,
}

impl TestConfigLoader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the device name, which is also the subscribe topic.
    #[must_use]
    pub fn with_device_name(device_name: &str) -> Self {
        Self {
            device_name: Some(device_name.to_owned()),
        }
    }
}

impl ConfigLoader for TestConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        let mut config = Config {
            reconnect_backoff_secs: 0,
            startup_exit_delay_secs: 0,
            ..Config::default()
        };
        if let Some(device_name) = &self.device_name {
            config.device_name.clone_from(device_name);
        }
        Ok(config)
    }
}

/// Loader that intentionally fails by passing invalid CLI arguments.
pub struct FailingConfigLoader;

impl ConfigLoader for FailingConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        let args = vec![
            OsString::from("rfsocd"),
            OsString::from("--redis-port"),
            OsString::from("not-a-port"),
        ];
        Config::load_from_iter(args)
    }
}
