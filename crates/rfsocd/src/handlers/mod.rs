//! Command handlers.
//!
//! A handler validates its `data`, drives the hardware and always produces a
//! complete [`Envelope`]. Failures never escape: each one is logged with full
//! detail and answered with a fixed, requester-facing message.

mod bitstream;
pub mod params;
mod registers;
mod tones;

use std::path::PathBuf;

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{error, info};

use crate::dispatch::Envelope;
use crate::driver::DriverError;

pub use self::bitstream::upload_bitstream;
pub use self::params::FieldError;
pub use self::registers::config_hardware;
pub use self::tones::{WaveformError, get_tone_list, set_tone_list};

const HANDLERS_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::handlers");

/// Handler failures; `Display` is the text published to the requester.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// A required field was absent.
    #[error("missing required parameters")]
    MissingParameters(#[source] FieldError),

    /// `set_tone_list` was sent without one of its fields.
    #[error(
        "missing required parameters, double check that tone list and amplitude list are present"
    )]
    MissingToneParameters(#[source] FieldError),

    /// A field held a value of the wrong type or shape.
    #[error("invalid parameter data type")]
    InvalidParameterType(#[source] FieldError),

    /// The requested bitstream file is not on disk.
    #[error("Bitstream does not exist.")]
    BitstreamNotFound {
        /// Path the requester asked for.
        path: PathBuf,
    },

    /// The driver refused the bitstream.
    #[error("Exception occurred while attempting to upload the bitstream")]
    BitstreamUpload(#[source] DriverError),

    /// The driver failed to program the stream registers.
    #[error("An error occured while attempting to set registers.")]
    RegisterWrite(#[source] DriverError),

    /// The waveform sequence failed part way.
    #[error("Exception has occured while attempting to upload the waveform")]
    WaveformUpload(#[source] WaveformError),

    /// `get_tone_list` was asked about a channel that does not exist.
    #[error("bad channel number")]
    BadChannel {
        /// Request data echoed back with the channel normalised.
        echoed: Map<String, Value>,
    },

    /// The command is recognised but has no implementation.
    #[error("Not implemented")]
    NotImplemented {
        /// Command name.
        command: &'static str,
    },
}

impl From<FieldError> for HandlerError {
    fn from(error: FieldError) -> Self {
        match error {
            FieldError::Missing(_) => Self::MissingParameters(error),
            FieldError::Invalid { .. } => Self::InvalidParameterType(error),
        }
    }
}

impl HandlerError {
    /// Converts the failure into the envelope sent to the requester.
    #[must_use]
    pub fn into_envelope(self, uuid: &str) -> Envelope {
        let message = self.to_string();
        match self {
            Self::BadChannel { echoed } => Envelope::error(uuid, message).with_data(echoed),
            _ => Envelope::error(uuid, message),
        }
    }
}

/// Logs the outcome of a handler and wraps it in an envelope.
pub(crate) fn respond(
    command: &'static str,
    uuid: &str,
    outcome: Result<Map<String, Value>, HandlerError>,
) -> Envelope {
    match outcome {
        Ok(data) => {
            info!(target: HANDLERS_TARGET, command, uuid, "command completed");
            Envelope::ok(uuid).with_data(data)
        }
        Err(failure) => {
            error!(
                target: HANDLERS_TARGET,
                command,
                uuid,
                error = %failure,
                detail = ?failure,
                "command failed"
            );
            failure.into_envelope(uuid)
        }
    }
}

/// Answers the recognised but unimplemented per-channel commands.
#[must_use]
pub fn not_implemented(command: &'static str, uuid: &str) -> Envelope {
    respond(command, uuid, Err(HandlerError::NotImplemented { command }))
}
