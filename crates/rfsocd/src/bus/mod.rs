//! Connection to the publish/subscribe message bus.
//!
//! The dispatcher only sees the [`MessageBus`] trait: a health probe, a
//! blocking receive and a fire-and-forget publish. Transport faults never
//! surface as errors here; they collapse to "unhealthy" and the caller backs
//! off.

mod errors;
mod redis_bus;

use std::time::Duration;

use rfsoc_config::Config;

pub use self::errors::{BusError, ProbeFailure};
pub use self::redis_bus::RedisBus;

/// Tracing target for bus operations.
pub(crate) const BUS_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::bus");

/// Operations the dispatcher needs from the bus.
pub trait MessageBus {
    /// Probes the server; `false` on any transport failure.
    fn is_healthy(&mut self) -> bool;

    /// Blocks until the next frame on the subscribed topic.
    ///
    /// Returns `None` immediately when the bus is unhealthy, and after a
    /// receive failure.
    fn wait_for_message(&mut self) -> Option<BusMessage>;

    /// Publishes `payload` on `topic`, dropping it when the bus is unhealthy.
    fn publish(&mut self, topic: &str, payload: &str);
}

/// Kind of a pub/sub frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageKind {
    /// A published message carrying a payload.
    Message,
    /// Anything else, such as a subscribe confirmation.
    Control(String),
}

/// One frame received from the bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusMessage {
    /// Frame kind.
    pub kind: MessageKind,
    /// Channel the frame arrived on.
    pub channel: String,
    /// Raw payload bytes.
    pub payload: Vec<u8>,
}

impl BusMessage {
    /// Builds a data frame.
    pub fn message(channel: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            kind: MessageKind::Message,
            channel: channel.into(),
            payload: payload.into(),
        }
    }

    /// Builds a control frame.
    pub fn control(kind: impl Into<String>, channel: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Control(kind.into()),
            channel: channel.into(),
            payload: Vec::new(),
        }
    }

    /// Returns true for frames that carry a request.
    #[must_use]
    pub fn is_data(&self) -> bool {
        self.kind == MessageKind::Message
    }
}

/// Where and how to reach the bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusSettings {
    /// Server host.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Topic to subscribe to.
    pub topic: String,
    /// Connect timeout used by health probes.
    pub probe_timeout: Duration,
}

impl BusSettings {
    /// Derives bus settings from the daemon configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            host: config.redis_host().to_owned(),
            port: config.redis_port(),
            topic: config.device_name().to_owned(),
            probe_timeout: config.probe_timeout(),
        }
    }
}
