//! Request decoding for the dispatch loop.
//!
//! Decoding happens in two stages so each failure is reported distinctly:
//! [`Request::decode`] turns the raw payload into a JSON document and
//! [`Request::from_document`] extracts `command`, `data` and `uuid` in that
//! order. Neither stage is fatal to the loop.

use serde_json::{Map, Value};

use super::errors::{DispatchError, MISSING_COMMAND_LABEL};

/// A decoded command request.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    /// Command name, not yet looked up.
    pub command: String,
    /// Correlation id chosen by the requester.
    pub uuid: String,
    /// Command arguments.
    pub data: Map<String, Value>,
}

impl Request {
    /// Parses a raw bus payload as a JSON document.
    ///
    /// # Errors
    ///
    /// Returns `DispatchError::Decode` if the payload is not UTF-8 or not
    /// valid JSON.
    pub fn decode(payload: &[u8]) -> Result<Value, DispatchError> {
        let text = std::str::from_utf8(payload)
            .map_err(|error| DispatchError::undecodable(error.to_string()))?;
        serde_json::from_str(text).map_err(DispatchError::from_json_error)
    }

    /// Extracts the request fields from a decoded document.
    ///
    /// `data` is checked before `uuid`. A missing or non-string `command` is
    /// only reported once both of those are present, since it is a lookup
    /// miss rather than an extraction failure.
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the first missing or malformed key,
    /// or `DispatchError::MissingCommand` when the command cannot be looked up.
    pub fn from_document(document: Value) -> Result<Self, DispatchError> {
        let Value::Object(mut object) = document else {
            return Err(DispatchError::NotAnObject);
        };

        let command = match object.remove("command") {
            Some(Value::String(command)) => Some(command),
            _ => None,
        };
        let label = command.as_deref().unwrap_or(MISSING_COMMAND_LABEL);

        let data = match object.remove("data") {
            None | Some(Value::Null) => return Err(DispatchError::missing_data(label)),
            Some(Value::Object(data)) => data,
            Some(_) => return Err(DispatchError::invalid_field("data", label)),
        };

        let uuid = match object.remove("uuid") {
            None | Some(Value::Null) => return Err(DispatchError::missing_uuid(label)),
            Some(Value::String(uuid)) => uuid,
            Some(_) => return Err(DispatchError::invalid_field("uuid", label)),
        };

        let command = command.ok_or(DispatchError::MissingCommand)?;
        Ok(Self {
            command,
            uuid,
            data,
        })
    }

    /// Runs both decoding stages.
    ///
    /// # Errors
    ///
    /// Returns the first failure from [`Request::decode`] or
    /// [`Request::from_document`].
    pub fn parse(payload: &[u8]) -> Result<Self, DispatchError> {
        Self::from_document(Self::decode(payload)?)
    }
}
