//! Test message bus: replays queued frames and records every publish.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::bus::{BusError, BusMessage, BusSettings, MessageBus};

/// Bus double whose clones share one queue, so a scenario can feed frames to
/// a bus already owned by a dispatcher.
///
/// A queued `None` stands for a failed receive. An empty queue also reports
/// the bus as down.
#[derive(Debug, Clone, Default)]
pub struct ScriptedBus {
    topic: String,
    state: Arc<Mutex<BusState>>,
}

impl ScriptedBus {
    /// Builds a healthy bus subscribed to `topic`.
    #[must_use]
    pub fn new(topic: &str) -> Self {
        Self {
            topic: topic.to_owned(),
            state: Arc::default(),
        }
    }

    /// Connector for [`crate::launch`].
    pub fn connect(settings: BusSettings) -> Result<Self, BusError> {
        Ok(Self::new(&settings.topic))
    }

    /// Queues a data frame on the subscribed topic.
    pub fn push_request(&self, payload: &str) {
        let frame = BusMessage::message(self.topic.clone(), payload.as_bytes().to_vec());
        self.lock().inbound.push_back(Some(frame));
    }

    /// Queues an arbitrary frame.
    pub fn push_frame(&self, frame: BusMessage) {
        self.lock().inbound.push_back(Some(frame));
    }

    /// Queues a failed receive.
    pub fn push_outage(&self) {
        self.lock().inbound.push_back(None);
    }

    /// Topic the bus was opened for.
    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Everything published so far as `(topic, payload)` pairs.
    #[must_use]
    pub fn published(&self) -> Vec<(String, String)> {
        self.lock().published.clone()
    }

    fn lock(&self) -> MutexGuard<'_, BusState> {
        self.state.lock().expect("bus state mutex poisoned")
    }
}

impl MessageBus for ScriptedBus {
    fn is_healthy(&mut self) -> bool {
        true
    }

    fn wait_for_message(&mut self) -> Option<BusMessage> {
        self.lock().inbound.pop_front().flatten()
    }

    fn publish(&mut self, topic: &str, payload: &str) {
        self.lock()
            .published
            .push((topic.to_owned(), payload.to_owned()));
    }
}

#[derive(Debug, Default)]
struct BusState {
    inbound: VecDeque<Option<BusMessage>>,
    published: Vec<(String, String)>,
}
