//! Layered configuration for the RFSoC control daemon.
//!
//! Values are resolved by [`ortho_config`] from, in increasing precedence,
//! built-in defaults, a TOML file (`--config-path` or `RFSOC_CONFIG_PATH`),
//! `RFSOC_*` environment variables and command-line flags. The daemon loads the
//! configuration once at startup and treats it as read-only afterwards.

mod defaults;
mod logging;

use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use defaults::{
    DEFAULT_DEVICE_NAME, DEFAULT_LOG_FILE_BACKUPS, DEFAULT_LOG_FILE_MAX_BYTES, DEFAULT_LOG_FILTER,
    DEFAULT_PROBE_TIMEOUT_MS, DEFAULT_RECONNECT_BACKOFF_SECS, DEFAULT_REDIS_HOST,
    DEFAULT_REDIS_PORT, DEFAULT_STARTUP_EXIT_DELAY_SECS, default_device_name,
    default_log_file_backups, default_log_file_max_bytes, default_log_filter,
    default_log_filter_string, default_log_format, default_probe_timeout_ms,
    default_reconnect_backoff_secs, default_redis_host, default_redis_port,
    default_startup_exit_delay_secs,
};
pub use logging::{LogFormat, LogFormatParseError, LogRotation};

/// Resolved daemon configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "RFSOC")]
pub struct Config {
    /// Name of this board on the bus; also the topic the daemon subscribes to.
    #[serde(default = "defaults::default_device_name")]
    pub device_name: String,
    /// Host name or address of the Redis server.
    #[serde(default = "defaults::default_redis_host")]
    pub redis_host: String,
    /// TCP port of the Redis server.
    #[serde(default = "defaults::default_redis_port")]
    pub redis_port: u16,
    /// Connect timeout for health probes, in milliseconds.
    #[serde(default = "defaults::default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,
    /// Sleep between receive attempts while the bus is down, in seconds.
    #[serde(default = "defaults::default_reconnect_backoff_secs")]
    pub reconnect_backoff_secs: u64,
    /// Sleep before exiting when the bus is unreachable at startup, in seconds.
    #[serde(default = "defaults::default_startup_exit_delay_secs")]
    pub startup_exit_delay_secs: u64,
    /// Refuse to start unless the effective user is root.
    #[serde(default)]
    pub require_root: bool,
    /// `tracing` filter expression.
    #[serde(default = "defaults::default_log_filter_string")]
    pub log_filter: String,
    /// Log output format.
    #[serde(default = "defaults::default_log_format")]
    pub log_format: LogFormat,
    /// Optional file that receives a copy of every log line.
    #[serde(default)]
    pub log_file: Option<Utf8PathBuf>,
    /// Size in bytes at which the log file is rotated.
    #[serde(default = "defaults::default_log_file_max_bytes")]
    pub log_file_max_bytes: u64,
    /// Number of rotated log files kept.
    #[serde(default = "defaults::default_log_file_backups")]
    pub log_file_backups: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            device_name: defaults::default_device_name(),
            redis_host: defaults::default_redis_host(),
            redis_port: defaults::default_redis_port(),
            probe_timeout_ms: defaults::default_probe_timeout_ms(),
            reconnect_backoff_secs: defaults::default_reconnect_backoff_secs(),
            startup_exit_delay_secs: defaults::default_startup_exit_delay_secs(),
            require_root: false,
            log_filter: defaults::default_log_filter_string(),
            log_format: defaults::default_log_format(),
            log_file: None,
            log_file_max_bytes: defaults::default_log_file_max_bytes(),
            log_file_backups: defaults::default_log_file_backups(),
        }
    }
}

impl Config {
    /// Topic the daemon subscribes to for incoming commands.
    #[must_use]
    pub fn device_name(&self) -> &str {
        self.device_name.as_str()
    }

    /// Redis server host.
    #[must_use]
    pub fn redis_host(&self) -> &str {
        self.redis_host.as_str()
    }

    /// Redis server port.
    #[must_use]
    pub const fn redis_port(&self) -> u16 {
        self.redis_port
    }

    /// Connect timeout for health probes.
    #[must_use]
    pub const fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    /// Sleep applied after a receive attempt finds the bus unhealthy.
    #[must_use]
    pub const fn reconnect_backoff(&self) -> Duration {
        Duration::from_secs(self.reconnect_backoff_secs)
    }

    /// Sleep applied before exiting on a startup connection failure.
    #[must_use]
    pub const fn startup_exit_delay(&self) -> Duration {
        Duration::from_secs(self.startup_exit_delay_secs)
    }

    /// Whether the daemon must run as root.
    #[must_use]
    pub const fn require_root(&self) -> bool {
        self.require_root
    }

    /// Returns the configured log filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_str()
    }

    /// Returns the configured log format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Returns the optional log file path.
    #[must_use]
    pub fn log_file(&self) -> Option<&Utf8Path> {
        self.log_file.as_deref()
    }

    /// Rotation policy for the log file.
    #[must_use]
    pub const fn log_rotation(&self) -> LogRotation {
        LogRotation {
            max_bytes: self.log_file_max_bytes,
            backups: self.log_file_backups,
        }
    }

    /// Checks invariants that the layered loader cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the device name or host is blank, or when
    /// log rotation is enabled with a zero size threshold.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.device_name.trim().is_empty() {
            return Err(ConfigError::EmptyDeviceName);
        }
        if self.redis_host.trim().is_empty() {
            return Err(ConfigError::EmptyRedisHost);
        }
        if self.log_file.is_some() && self.log_file_max_bytes == 0 {
            return Err(ConfigError::ZeroRotationThreshold);
        }
        Ok(())
    }
}

/// Configuration values rejected by [`Config::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The subscribe topic would be blank.
    #[error("device_name must not be empty")]
    EmptyDeviceName,
    /// The bus host would be blank.
    #[error("redis_host must not be empty")]
    EmptyRedisHost,
    /// A log file was configured with a zero rotation threshold.
    #[error("log_file_max_bytes must be greater than zero when log_file is set")]
    ZeroRotationThreshold,
}
