//! Loopback driver for bench use without programmable logic.
//!
//! Every call is accepted and remembered so the daemon's protocol can be
//! exercised end to end. Calls that need an overlay fail until a bitstream has
//! been uploaded, as they would on the board.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::channels::Channel;

use super::{DriverError, HardwareDriver, IqSample, NormalizedWaveform, RegisterConfig, Waveform};

const DRIVER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::driver::loopback");

/// What the loopback driver believes is loaded on one channel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoopbackChannel {
    /// Bin list from the last `load_bin_list`.
    pub bins: Vec<f64>,
    /// Sample count from the last `load_waveform_buffer`.
    pub buffered_samples: usize,
    /// Whether the accumulator was reset after the last buffer load.
    pub synced: bool,
}

/// Driver that records requests instead of touching hardware.
#[derive(Debug, Default)]
pub struct LoopbackDriver {
    overlay: Option<PathBuf>,
    registers: Option<RegisterConfig>,
    channels: [LoopbackChannel; 2],
}

impl LoopbackDriver {
    /// Creates a driver with no overlay loaded.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Path of the last uploaded overlay.
    #[must_use]
    pub fn overlay(&self) -> Option<&Path> {
        self.overlay.as_deref()
    }

    /// Last programmed register set.
    #[must_use]
    pub const fn registers(&self) -> Option<&RegisterConfig> {
        self.registers.as_ref()
    }

    /// Recorded state for `channel`.
    #[must_use]
    pub fn channel(&self, channel: Channel) -> &LoopbackChannel {
        match channel {
            Channel::One => &self.channels[0],
            Channel::Two => &self.channels[1],
        }
    }

    fn channel_mut(&mut self, channel: Channel) -> &mut LoopbackChannel {
        match channel {
            Channel::One => &mut self.channels[0],
            Channel::Two => &mut self.channels[1],
        }
    }

    fn require_overlay(&self, operation: &'static str) -> Result<(), DriverError> {
        if self.overlay.is_none() {
            return Err(DriverError::new(operation, "no overlay loaded"));
        }
        Ok(())
    }
}

impl HardwareDriver for LoopbackDriver {
    fn upload_overlay(&mut self, bitstream: &Path) -> Result<(), DriverError> {
        info!(target: DRIVER_TARGET, bitstream = %bitstream.display(), "overlay accepted");
        self.overlay = Some(bitstream.to_path_buf());
        self.channels = Default::default();
        Ok(())
    }

    fn configure_registers(&mut self, registers: &RegisterConfig) -> Result<(), DriverError> {
        self.require_overlay("configure_registers")?;
        info!(target: DRIVER_TARGET, ?registers, "registers accepted");
        self.registers = Some(*registers);
        Ok(())
    }

    fn generate_waveform(
        &mut self,
        tones: &[f64],
        amplitudes: &[f64],
    ) -> Result<Waveform, DriverError> {
        self.require_overlay("generate_waveform")?;
        if tones.len() != amplitudes.len() {
            return Err(DriverError::new(
                "generate_waveform",
                format!(
                    "{} tones but {} amplitudes",
                    tones.len(),
                    amplitudes.len()
                ),
            ));
        }
        Ok(Waveform {
            samples: amplitudes
                .iter()
                .map(|amplitude| IqSample {
                    i: *amplitude,
                    q: 0.0,
                })
                .collect(),
            phases: vec![0.0; tones.len()],
            frequencies: tones.to_vec(),
        })
    }

    fn load_bin_list(&mut self, channel: Channel, frequencies: &[f64]) -> Result<(), DriverError> {
        self.require_overlay("load_bin_list")?;
        let state = self.channel_mut(channel);
        state.bins = frequencies.to_vec();
        state.synced = false;
        Ok(())
    }

    fn normalize_waveform(
        &mut self,
        waveform: &Waveform,
    ) -> Result<NormalizedWaveform, DriverError> {
        self.require_overlay("normalize_waveform")?;
        Ok(NormalizedWaveform {
            real: vec![0; waveform.samples.len()],
            imaginary: vec![0; waveform.samples.len()],
        })
    }

    fn load_waveform_buffer(
        &mut self,
        channel: Channel,
        waveform: &NormalizedWaveform,
        _phases: &[f64],
    ) -> Result<(), DriverError> {
        self.require_overlay("load_waveform_buffer")?;
        self.channel_mut(channel).buffered_samples = waveform.real.len();
        Ok(())
    }

    fn reset_accumulator_and_sync(
        &mut self,
        channel: Channel,
        _frequencies: &[f64],
    ) -> Result<(), DriverError> {
        self.require_overlay("reset_accumulator_and_sync")?;
        self.channel_mut(channel).synced = true;
        info!(target: DRIVER_TARGET, %channel, "channel resynchronised");
        Ok(())
    }
}
