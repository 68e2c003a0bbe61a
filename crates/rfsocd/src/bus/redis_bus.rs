//! Redis pub/sub implementation of [`MessageBus`].
//!
//! Two connections are kept: one for `PING` and `PUBLISH`, and one parked in
//! subscribe mode. Both are opened lazily and discarded together when a probe
//! fails, so the next healthy probe reconnects and the next receive
//! re-subscribes.

use redis::{Client, Connection, ConnectionAddr, ConnectionInfo, Msg, RedisConnectionInfo, Value};
use tracing::{debug, info, warn};

use super::{BUS_TARGET, BusError, BusMessage, BusSettings, MessageBus, ProbeFailure};

/// Bus session backed by a Redis server.
pub struct RedisBus {
    client: Client,
    settings: BusSettings,
    publisher: Option<Connection>,
    subscriber: Option<Connection>,
}

impl RedisBus {
    /// Opens a session and verifies the server answers.
    ///
    /// # Errors
    ///
    /// Returns `BusError::Client` if the settings are rejected, or
    /// `BusError::Unreachable` if the first health probe fails.
    pub fn connect(settings: BusSettings) -> Result<Self, BusError> {
        let mut bus = Self::with_settings(settings)?;
        if !bus.is_healthy() {
            return Err(BusError::Unreachable {
                host: bus.settings.host.clone(),
                port: bus.settings.port,
            });
        }
        info!(
            target: BUS_TARGET,
            host = %bus.settings.host,
            port = bus.settings.port,
            topic = %bus.settings.topic,
            "connected to Redis"
        );
        Ok(bus)
    }

    fn with_settings(settings: BusSettings) -> Result<Self, BusError> {
        let info = ConnectionInfo {
            addr: ConnectionAddr::Tcp(settings.host.clone(), settings.port),
            redis: RedisConnectionInfo::default(),
        };
        let client = Client::open(info).map_err(BusError::Client)?;
        Ok(Self {
            client,
            settings,
            publisher: None,
            subscriber: None,
        })
    }

    /// Topic this session subscribes to.
    #[must_use]
    pub fn topic(&self) -> &str {
        &self.settings.topic
    }

    fn open(&self) -> redis::RedisResult<Connection> {
        self.client
            .get_connection_with_timeout(self.settings.probe_timeout)
    }

    fn probe(&mut self) -> redis::RedisResult<()> {
        let mut connection = match self.publisher.take() {
            Some(connection) => connection,
            None => self.open()?,
        };
        connection.set_read_timeout(Some(self.settings.probe_timeout))?;
        redis::cmd("PING").query::<String>(&mut connection)?;
        self.publisher = Some(connection);
        Ok(())
    }

    fn subscribe(&self) -> redis::RedisResult<Connection> {
        let mut connection = self.open()?;
        connection.set_read_timeout(None)?;
        let command = redis::cmd("SUBSCRIBE")
            .arg(&self.settings.topic)
            .get_packed_command();
        connection.send_packed_command(&command)?;
        debug!(target: BUS_TARGET, topic = %self.settings.topic, "subscription requested");
        Ok(connection)
    }

    fn receive(&mut self) -> redis::RedisResult<BusMessage> {
        let mut connection = match self.subscriber.take() {
            Some(connection) => connection,
            None => self.subscribe()?,
        };
        let frame = connection.recv_response()?;
        self.subscriber = Some(connection);
        Ok(classify(&frame))
    }
}

impl MessageBus for RedisBus {
    fn is_healthy(&mut self) -> bool {
        match self.probe() {
            Ok(()) => true,
            Err(error) => {
                let failure = ProbeFailure::classify(&error);
                warn!(
                    target: BUS_TARGET,
                    failure = failure.as_str(),
                    error = %error,
                    "Redis health probe failed"
                );
                self.publisher = None;
                self.subscriber = None;
                false
            }
        }
    }

    fn wait_for_message(&mut self) -> Option<BusMessage> {
        if !self.is_healthy() {
            return None;
        }
        match self.receive() {
            Ok(message) => Some(message),
            Err(error) => {
                warn!(target: BUS_TARGET, error = %error, "receive from Redis failed");
                None
            }
        }
    }

    fn publish(&mut self, topic: &str, payload: &str) {
        if !self.is_healthy() {
            warn!(target: BUS_TARGET, topic, "bus unhealthy; reply dropped");
            return;
        }
        let Some(connection) = self.publisher.as_mut() else {
            return;
        };
        match redis::cmd("PUBLISH")
            .arg(topic)
            .arg(payload)
            .query::<i64>(connection)
        {
            Ok(receivers) => debug!(target: BUS_TARGET, topic, receivers, "reply published"),
            Err(error) => warn!(target: BUS_TARGET, topic, error = %error, "publish failed"),
        }
    }
}

/// Maps a raw subscribe-mode frame onto a [`BusMessage`].
fn classify(frame: &Value) -> BusMessage {
    if let Some(message) = Msg::from_value(frame) {
        let channel = message.get_channel_name().to_owned();
        if message.from_pattern() {
            return BusMessage::control("pmessage", channel);
        }
        return BusMessage::message(channel, message.get_payload_bytes().to_vec());
    }
    match frame {
        Value::Bulk(items) => {
            let kind = items.first().and_then(text).unwrap_or_default();
            let channel = items.get(1).and_then(text).unwrap_or_default();
            BusMessage::control(kind, channel)
        }
        _ => BusMessage::control("unknown", ""),
    }
}

fn text(value: &Value) -> Option<String> {
    match value {
        Value::Data(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
        Value::Status(status) => Some(status.clone()),
        _ => None,
    }
}

/// Redis connections are not `Debug`; only the settings are shown.
impl std::fmt::Debug for RedisBus {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("RedisBus")
            .field("settings", &self.settings)
            .field("publisher", &self.publisher.is_some())
            .field("subscriber", &self.subscriber.is_some())
            .finish_non_exhaustive()
    }
}
