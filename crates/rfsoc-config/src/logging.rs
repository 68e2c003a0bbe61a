use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Output formats accepted for daemon logs.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogFormat {
    /// One JSON object per event, for journald and log shippers.
    #[default]
    Json,
    /// Single-line human-readable output for bench debugging.
    Compact,
}

/// Errors encountered while parsing a [`LogFormat`] from text.
pub type LogFormatParseError = strum::ParseError;

/// Size-based rotation policy for the optional log file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogRotation {
    /// File size in bytes that triggers a rotation.
    pub max_bytes: u64,
    /// Number of rotated files kept alongside the live one.
    pub backups: u32,
}
