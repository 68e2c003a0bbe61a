//! Error types for request decoding and command lookup.
//!
//! Every variant is answered with an ERROR envelope carrying the sentinel uuid;
//! the `Display` text of each variant is exactly what goes on the wire.

use thiserror::Error;

/// Placeholder used in messages when the request carried no usable command.
pub(crate) const MISSING_COMMAND_LABEL: &str = "<missing>";

/// Errors surfaced before a request reaches its handler.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Payload was not UTF-8 JSON.
    #[error("Could not decode JSON from command")]
    Decode {
        /// Parser diagnostic, logged but never sent.
        message: String,
        /// Underlying parser error when the payload was valid UTF-8.
        #[source]
        source: Option<serde_json::Error>,
    },

    /// Payload decoded to something other than a JSON object.
    #[error("Could not decode JSON from command")]
    NotAnObject,

    /// `data` was absent.
    #[error("data key was empty for the following command {command}")]
    MissingData {
        /// Command named by the request.
        command: String,
    },

    /// `uuid` was absent.
    #[error("uuid key was empty for the following command {command}")]
    MissingUuid {
        /// Command named by the request.
        command: String,
    },

    /// A key was present with the wrong JSON type.
    #[error("{field} key was not valid for the following command {command}")]
    InvalidField {
        /// Offending key.
        field: &'static str,
        /// Command named by the request.
        command: String,
    },

    /// `command` was absent or not a string.
    #[error("Error, unknown command received")]
    MissingCommand,

    /// `command` named no known handler.
    #[error("Error, unknown command received")]
    UnknownCommand {
        /// Name the requester sent.
        command: String,
    },
}

/// Coarse failure class used in log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The payload could not be parsed.
    Decode,
    /// A required key was missing or malformed.
    Validation,
    /// The command name was not recognised.
    Lookup,
}

impl ErrorCategory {
    /// Label used in structured log fields.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Decode => "decode",
            Self::Validation => "validation",
            Self::Lookup => "lookup",
        }
    }
}

impl DispatchError {
    /// Returns the failure class of this error.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::Decode { .. } | Self::NotAnObject => ErrorCategory::Decode,
            Self::MissingData { .. } | Self::MissingUuid { .. } | Self::InvalidField { .. } => {
                ErrorCategory::Validation
            }
            Self::MissingCommand | Self::UnknownCommand { .. } => ErrorCategory::Lookup,
        }
    }

    /// Creates a decode error from a JSON parser error.
    pub fn from_json_error(source: serde_json::Error) -> Self {
        Self::Decode {
            message: source.to_string(),
            source: Some(source),
        }
    }

    /// Creates a decode error with a custom diagnostic.
    pub fn undecodable(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a missing `data` error.
    pub fn missing_data(command: impl Into<String>) -> Self {
        Self::MissingData {
            command: command.into(),
        }
    }

    /// Creates a missing `uuid` error.
    pub fn missing_uuid(command: impl Into<String>) -> Self {
        Self::MissingUuid {
            command: command.into(),
        }
    }

    /// Creates an invalid field error.
    pub fn invalid_field(field: &'static str, command: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            command: command.into(),
        }
    }

    /// Creates an unknown command error.
    pub fn unknown_command(command: impl Into<String>) -> Self {
        Self::UnknownCommand {
            command: command.into(),
        }
    }
}
