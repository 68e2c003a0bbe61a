//! Last-applied tone configuration per output channel.
//!
//! The store lives for the lifetime of the process and starts empty. A
//! `set_tone_list` request overwrites the entry for its channel wholesale; a
//! `get_tone_list` request reads it back. Nothing is persisted across
//! restarts.

use std::fmt;

use serde_json::Value;

/// One of the two independent signal paths on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// First DAC/ADC chain.
    One,
    /// Second DAC/ADC chain.
    Two,
}

impl Channel {
    /// Maps a wire channel number onto a channel, if it names one.
    #[must_use]
    pub const fn from_number(number: i64) -> Option<Self> {
        match number {
            1 => Some(Self::One),
            2 => Some(Self::Two),
            _ => None,
        }
    }

    /// Wire number of the channel.
    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
        }
    }

    const fn slot(self) -> usize {
        match self {
            Self::One => 0,
            Self::Two => 1,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.number())
    }
}

/// Tone list and amplitudes exactly as the requester sent them.
#[derive(Debug, Clone, PartialEq)]
pub struct ToneConfig {
    /// Raw `tone_list` value.
    pub tone_list: Value,
    /// Raw `amplitudes` value.
    pub amplitudes: Value,
}

impl ToneConfig {
    /// Builds a configuration from the raw request values.
    #[must_use]
    pub const fn new(tone_list: Value, amplitudes: Value) -> Self {
        Self {
            tone_list,
            amplitudes,
        }
    }
}

impl Default for ToneConfig {
    fn default() -> Self {
        Self::new(Value::Array(Vec::new()), Value::Array(Vec::new()))
    }
}

/// Per-channel cache owned by the command router.
#[derive(Debug, Default, Clone)]
pub struct ChannelStore {
    slots: [ToneConfig; 2],
}

impl ChannelStore {
    /// Creates a store with both channels empty.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the cached configuration for `channel`.
    pub fn record(&mut self, channel: Channel, config: ToneConfig) {
        self.slots[channel.slot()] = config;
    }

    /// Returns the cached configuration for `channel`.
    #[must_use]
    pub fn get(&self, channel: Channel) -> &ToneConfig {
        &self.slots[channel.slot()]
    }
}
