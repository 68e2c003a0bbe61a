use crate::logging::LogFormat;

/// Subscribe topic used when no device name is configured.
pub const DEFAULT_DEVICE_NAME: &str = "rfsoc";

/// Redis host used when none is configured.
pub const DEFAULT_REDIS_HOST: &str = "127.0.0.1";

/// Standard Redis port.
pub const DEFAULT_REDIS_PORT: u16 = 6379;

/// Connect timeout applied to bus health probes, in milliseconds.
pub const DEFAULT_PROBE_TIMEOUT_MS: u64 = 2_000;

/// Pause between receive attempts while the bus is unreachable, in seconds.
pub const DEFAULT_RECONNECT_BACKOFF_SECS: u64 = 3;

/// Pause before exiting when the bus is unreachable at startup, in seconds.
pub const DEFAULT_STARTUP_EXIT_DELAY_SECS: u64 = 5;

/// Default log filter expression used by the daemon.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Log file size that triggers rotation (20 MiB).
pub const DEFAULT_LOG_FILE_MAX_BYTES: u64 = 20 * 1024 * 1024;

/// Rotated log files kept next to the live file.
pub const DEFAULT_LOG_FILE_BACKUPS: u32 = 10;

/// Owned device name used where allocation is required (e.g. serde).
pub fn default_device_name() -> String {
    DEFAULT_DEVICE_NAME.to_owned()
}

/// Owned Redis host used where allocation is required (e.g. serde).
pub fn default_redis_host() -> String {
    DEFAULT_REDIS_HOST.to_owned()
}

/// Default Redis port.
pub const fn default_redis_port() -> u16 {
    DEFAULT_REDIS_PORT
}

/// Default probe timeout in milliseconds.
pub const fn default_probe_timeout_ms() -> u64 {
    DEFAULT_PROBE_TIMEOUT_MS
}

/// Default reconnect backoff in seconds.
pub const fn default_reconnect_backoff_secs() -> u64 {
    DEFAULT_RECONNECT_BACKOFF_SECS
}

/// Default startup exit delay in seconds.
pub const fn default_startup_exit_delay_secs() -> u64 {
    DEFAULT_STARTUP_EXIT_DELAY_SECS
}

/// Default log filter expression used by the daemon.
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for the daemon.
pub fn default_log_format() -> LogFormat {
    LogFormat::Json
}

/// Default rotation threshold for the log file.
pub const fn default_log_file_max_bytes() -> u64 {
    DEFAULT_LOG_FILE_MAX_BYTES
}

/// Default number of rotated log files.
pub const fn default_log_file_backups() -> u32 {
    DEFAULT_LOG_FILE_BACKUPS
}
