//! Command lookup and handler invocation.
//!
//! The dispatch table is the [`Command`] enum: names are matched exactly and
//! every variant is routed by an exhaustive `match`, so adding a command means
//! adding a variant and its arm.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use serde_json::{Map, Value};
use tracing::{debug, error};

use crate::channels::ChannelStore;
use crate::driver::HardwareDriver;
use crate::handlers;

use super::envelope::Envelope;
use super::errors::DispatchError;

/// Tracing target for dispatch operations.
pub(crate) const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");

/// Message published when a handler panics.
const HANDLER_PANIC_MESSAGE: &str = "Unhandled error while executing command";

/// Known commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Program the UDP streaming registers.
    ConfigHardware,
    /// Load a bitstream overlay.
    UploadBitstream,
    /// Record and upload a tone list.
    SetToneList,
    /// Read back the cached tone list.
    GetToneList,
    /// Per-channel register programming for channel 1; not implemented.
    ConfigHardwareChan1,
    /// Per-channel register programming for channel 2; not implemented.
    ConfigHardwareChan2,
}

impl Command {
    /// Every command, in the order they are documented.
    pub const ALL: [Self; 6] = [
        Self::ConfigHardware,
        Self::UploadBitstream,
        Self::SetToneList,
        Self::GetToneList,
        Self::ConfigHardwareChan1,
        Self::ConfigHardwareChan2,
    ];

    /// Looks up a command by its wire name (case-sensitive).
    ///
    /// # Errors
    ///
    /// Returns `DispatchError::UnknownCommand` if no command has that name.
    pub fn parse(value: &str) -> Result<Self, DispatchError> {
        Self::ALL
            .into_iter()
            .find(|command| command.as_str() == value)
            .ok_or_else(|| DispatchError::unknown_command(value))
    }

    /// Wire name of the command.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ConfigHardware => "config_hardware",
            Self::UploadBitstream => "upload_bitstream",
            Self::SetToneList => "set_tone_list",
            Self::GetToneList => "get_tone_list",
            Self::ConfigHardwareChan1 => "config_hardware_chan1",
            Self::ConfigHardwareChan2 => "config_hardware_chan2",
        }
    }
}

/// Owns the hardware driver and channel cache and routes commands to handlers.
#[derive(Debug)]
pub struct CommandRouter<D> {
    driver: D,
    channels: ChannelStore,
}

impl<D: HardwareDriver> CommandRouter<D> {
    /// Creates a router with an empty channel cache.
    pub fn new(driver: D) -> Self {
        Self {
            driver,
            channels: ChannelStore::new(),
        }
    }

    /// The linked hardware driver.
    pub const fn driver(&self) -> &D {
        &self.driver
    }

    /// The channel cache.
    pub const fn channels(&self) -> &ChannelStore {
        &self.channels
    }

    /// Runs the handler for `command`.
    ///
    /// A panicking handler is contained here and answered with an ERROR
    /// envelope that still echoes `uuid`.
    pub fn route(&mut self, command: Command, uuid: &str, data: Map<String, Value>) -> Envelope {
        debug!(
            target: DISPATCH_TARGET,
            command = command.as_str(),
            uuid,
            "routing command"
        );
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.invoke(command, uuid, data)));
        outcome.unwrap_or_else(|payload| {
            error!(
                target: DISPATCH_TARGET,
                command = command.as_str(),
                uuid,
                panic = panic_message(payload.as_ref()),
                "handler panicked"
            );
            Envelope::error(uuid, HANDLER_PANIC_MESSAGE)
        })
    }

    fn invoke(&mut self, command: Command, uuid: &str, data: Map<String, Value>) -> Envelope {
        match command {
            Command::ConfigHardware => handlers::config_hardware(&mut self.driver, uuid, &data),
            Command::UploadBitstream => handlers::upload_bitstream(&mut self.driver, uuid, &data),
            Command::SetToneList => {
                handlers::set_tone_list(&mut self.driver, &mut self.channels, uuid, data)
            }
            Command::GetToneList => handlers::get_tone_list(&self.channels, uuid, data),
            Command::ConfigHardwareChan1 | Command::ConfigHardwareChan2 => {
                handlers::not_implemented(command.as_str(), uuid)
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}
