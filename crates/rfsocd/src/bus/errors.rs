//! Bus errors and probe failure classification.

use thiserror::Error;

/// Errors from establishing the bus session.
#[derive(Debug, Error)]
pub enum BusError {
    /// The connection settings were rejected by the client library.
    #[error("invalid Redis connection settings: {0}")]
    Client(#[source] redis::RedisError),

    /// The first health probe failed.
    #[error("Redis server at {host}:{port} is unreachable")]
    Unreachable {
        /// Configured host.
        host: String,
        /// Configured port.
        port: u16,
    },
}

/// Why a health probe failed. Used for logging only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeFailure {
    /// The server refused the connection.
    Refused,
    /// Connecting or reading timed out.
    Timeout,
    /// An established connection was dropped.
    Dropped,
    /// Some other I/O failure.
    Io,
    /// The server answered with something unexpected.
    Protocol,
}

impl ProbeFailure {
    /// Classifies a client error.
    #[must_use]
    pub fn classify(error: &redis::RedisError) -> Self {
        if error.is_connection_refusal() {
            Self::Refused
        } else if error.is_timeout() {
            Self::Timeout
        } else if error.is_connection_dropped() {
            Self::Dropped
        } else if error.is_io_error() {
            Self::Io
        } else {
            Self::Protocol
        }
    }

    /// Label used in structured log fields.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Refused => "connection_refused",
            Self::Timeout => "timeout",
            Self::Dropped => "connection_dropped",
            Self::Io => "io",
            Self::Protocol => "protocol",
        }
    }
}
