//! Response envelopes published on the reply topic.
//!
//! An envelope is always a JSON object with the keys `status`, `uuid`, `error`
//! and `data`, serialised in that order.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Uuid used when the requester's own uuid could not be recovered.
pub const SENTINEL_UUID: &str = "000000000000";

/// Outcome flag carried by every envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    /// The command completed.
    #[serde(rename = "OK")]
    Ok,
    /// The command failed; `error` explains why.
    #[serde(rename = "ERROR")]
    Error,
}

impl Status {
    /// Wire spelling of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Error => "ERROR",
        }
    }
}

/// A complete response to one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    status: Status,
    uuid: String,
    error: String,
    data: Map<String, Value>,
}

impl Envelope {
    /// Successful envelope with empty data.
    pub fn ok(uuid: impl Into<String>) -> Self {
        Self {
            status: Status::Ok,
            uuid: uuid.into(),
            error: String::new(),
            data: Map::new(),
        }
    }

    /// Failed envelope with empty data.
    pub fn error(uuid: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            uuid: uuid.into(),
            error: error.into(),
            data: Map::new(),
        }
    }

    /// Replaces the data payload.
    #[must_use]
    pub fn with_data(mut self, data: Map<String, Value>) -> Self {
        self.data = data;
        self
    }

    /// Returns true for an `OK` envelope.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status == Status::Ok
    }

    /// Outcome flag.
    #[must_use]
    pub const fn status(&self) -> Status {
        self.status
    }

    /// Correlation id echoed from the request, or the sentinel.
    #[must_use]
    pub fn uuid(&self) -> &str {
        &self.uuid
    }

    /// Failure description; empty on success.
    #[must_use]
    pub fn error_message(&self) -> &str {
        &self.error
    }

    /// Data payload.
    #[must_use]
    pub const fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    /// Serialises the envelope to its wire form.
    #[must_use]
    pub fn encode(&self) -> String {
        let mut object = Map::with_capacity(4);
        object.insert("status".to_owned(), Value::from(self.status.as_str()));
        object.insert("uuid".to_owned(), Value::from(self.uuid.as_str()));
        object.insert("error".to_owned(), Value::from(self.error.as_str()));
        object.insert("data".to_owned(), Value::Object(self.data.clone()));
        Value::Object(object).to_string()
    }

    /// Parses a wire envelope, as a requester would.
    ///
    /// # Errors
    ///
    /// Returns the parser error when `text` is not a well-formed envelope.
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

/// Builds and encodes an envelope in one step.
#[must_use]
pub fn build_envelope(ok: bool, uuid: &str, data: Map<String, Value>, error: &str) -> String {
    let envelope = if ok {
        Envelope::ok(uuid)
    } else {
        Envelope::error(uuid, error)
    };
    envelope.with_data(data).encode()
}
