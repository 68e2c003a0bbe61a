//! Interface to the board's hardware driver.
//!
//! The driver owns everything that touches the programmable logic: loading
//! bitstreams, programming the UDP streaming registers, synthesising the
//! multi-tone waveform and loading it into DDR4. Handlers treat it as opaque
//! and only sequence its calls; none of the numeric work happens in this crate.

mod loopback;

use std::path::Path;

use thiserror::Error;

use crate::channels::Channel;

pub use self::loopback::LoopbackDriver;

/// Hardware operations the command handlers rely on.
#[cfg_attr(test, mockall::automock)]
pub trait HardwareDriver {
    /// Loads the bitstream overlay at `bitstream` into the programmable logic.
    fn upload_overlay(&mut self, bitstream: &Path) -> Result<(), DriverError>;

    /// Programs the UDP source/destination registers for both data streams.
    fn configure_registers(&mut self, registers: &RegisterConfig) -> Result<(), DriverError>;

    /// Synthesises the time-domain waveform for the requested tones.
    fn generate_waveform(
        &mut self,
        tones: &[f64],
        amplitudes: &[f64],
    ) -> Result<Waveform, DriverError>;

    /// Loads the FFT bin list for `channel`.
    fn load_bin_list(&mut self, channel: Channel, frequencies: &[f64]) -> Result<(), DriverError>;

    /// Scales a generated waveform into DAC-ready real and imaginary parts.
    fn normalize_waveform(&mut self, waveform: &Waveform)
    -> Result<NormalizedWaveform, DriverError>;

    /// Writes the normalised waveform into the DDR4 playback buffer.
    fn load_waveform_buffer(
        &mut self,
        channel: Channel,
        waveform: &NormalizedWaveform,
        phases: &[f64],
    ) -> Result<(), DriverError>;

    /// Resets the phase accumulator and resynchronises playback.
    fn reset_accumulator_and_sync(
        &mut self,
        channel: Channel,
        frequencies: &[f64],
    ) -> Result<(), DriverError>;
}

/// Register values for the two UDP data streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterConfig {
    /// Source IPv4 address of stream A.
    pub data_a_srcip: u32,
    /// Source IPv4 address of stream B.
    pub data_b_srcip: u32,
    /// Destination IPv4 address of stream A.
    pub data_a_dstip: u32,
    /// Destination IPv4 address of stream B.
    pub data_b_dstip: u32,
    /// Upper bytes of the destination MAC for stream A.
    pub destmac_a_msb: u64,
    /// Lower bytes of the destination MAC for stream A.
    pub destmac_a_lsb: u64,
    /// Upper bytes of the destination MAC for stream B.
    pub destmac_b_msb: u64,
    /// Lower bytes of the destination MAC for stream B.
    pub destmac_b_lsb: u64,
    /// UDP port of stream A.
    pub port_a: u16,
    /// UDP port of stream B.
    pub port_b: u16,
}

/// One complex sample of a generated waveform.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct IqSample {
    /// In-phase component.
    pub i: f64,
    /// Quadrature component.
    pub q: f64,
}

/// Output of waveform synthesis.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Waveform {
    /// Complex time-domain samples.
    pub samples: Vec<IqSample>,
    /// Per-tone phases.
    pub phases: Vec<f64>,
    /// Frequencies the hardware can actually produce, one per tone.
    pub frequencies: Vec<f64>,
}

/// DAC-ready waveform components.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedWaveform {
    /// Real component.
    pub real: Vec<i16>,
    /// Imaginary component.
    pub imaginary: Vec<i16>,
}

/// Failure reported by a driver operation.
#[derive(Debug, Error)]
#[error("{operation} failed: {message}")]
pub struct DriverError {
    operation: &'static str,
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl DriverError {
    /// Builds an error without an underlying source.
    #[must_use]
    pub fn new(operation: &'static str, message: impl Into<String>) -> Self {
        Self {
            operation,
            message: message.into(),
            source: None,
        }
    }

    /// Builds an error that wraps an underlying source.
    #[must_use]
    pub fn with_source(
        operation: &'static str,
        message: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self {
            operation,
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Driver operation that failed.
    #[must_use]
    pub const fn operation(&self) -> &'static str {
        self.operation
    }

    /// Human-readable message describing the failure.
    #[must_use]
    pub fn message(&self) -> &str {
        self.message.as_str()
    }
}
