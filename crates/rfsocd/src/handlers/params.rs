//! Field extraction and coercion for handler arguments.
//!
//! Requesters are loose about types: integers may arrive as floats, booleans
//! or decimal strings, and MAC halves as hexadecimal strings. These helpers
//! accept the same spellings and report the first field that fails.

use std::net::Ipv4Addr;

use serde_json::{Map, Value};
use thiserror::Error;

/// A required field was absent or could not be coerced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    /// The field was not present in `data`.
    #[error("{0} is missing")]
    Missing(&'static str),
    /// The field was present but held an unusable value.
    #[error("{field} is invalid: {reason}")]
    Invalid {
        /// Offending field.
        field: &'static str,
        /// What was wrong with it.
        reason: String,
    },
}

impl FieldError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Returns the value of `field`, failing when it is absent.
///
/// # Errors
///
/// Returns `FieldError::Missing` when `data` has no such key.
pub fn require<'a>(
    data: &'a Map<String, Value>,
    field: &'static str,
) -> Result<&'a Value, FieldError> {
    data.get(field).ok_or(FieldError::Missing(field))
}

/// Coerces a JSON value to an integer.
///
/// Accepts integers, finite floats (truncated towards zero), booleans and
/// decimal strings with surrounding whitespace.
///
/// # Errors
///
/// Returns `FieldError::Invalid` for any other value.
pub fn integer(field: &'static str, value: &Value) -> Result<i64, FieldError> {
    match value {
        Value::Number(number) => {
            if let Some(integer) = number.as_i64() {
                return Ok(integer);
            }
            number
                .as_f64()
                .and_then(truncate)
                .ok_or_else(|| FieldError::invalid(field, format!("{number} is out of range")))
        }
        Value::Bool(flag) => Ok(i64::from(*flag)),
        Value::String(text) => text
            .trim()
            .parse::<i64>()
            .map_err(|error| FieldError::invalid(field, format!("{text:?}: {error}"))),
        other => Err(FieldError::invalid(
            field,
            format!("expected an integer, got {other}"),
        )),
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "the value is finite and inside the i64 range, so the cast only drops the fraction"
)]
fn truncate(value: f64) -> Option<i64> {
    const LOWER: f64 = -9_223_372_036_854_775_808.0;
    const UPPER: f64 = 9_223_372_036_854_775_808.0;
    let truncated = value.trunc();
    (LOWER..UPPER).contains(&truncated).then_some(truncated as i64)
}

/// Parses an IPv4 address into its big-endian integer form.
///
/// Accepts dotted-quad strings and integers that fit in 32 bits.
///
/// # Errors
///
/// Returns `FieldError::Invalid` for anything else, including IPv6 text.
pub fn ipv4(field: &'static str, value: &Value) -> Result<u32, FieldError> {
    match value {
        Value::String(text) => text
            .parse::<Ipv4Addr>()
            .map(u32::from)
            .map_err(|error| FieldError::invalid(field, format!("{text:?}: {error}"))),
        Value::Number(number) => number
            .as_u64()
            .and_then(|raw| u32::try_from(raw).ok())
            .ok_or_else(|| FieldError::invalid(field, format!("{number} is not an IPv4 address"))),
        other => Err(FieldError::invalid(
            field,
            format!("expected an IPv4 address, got {other}"),
        )),
    }
}

/// Parses a hexadecimal string with an optional `0x` prefix.
///
/// # Errors
///
/// Returns `FieldError::Invalid` for non-strings and malformed digits.
pub fn hex(field: &'static str, value: &Value) -> Result<u64, FieldError> {
    let Value::String(text) = value else {
        return Err(FieldError::invalid(
            field,
            format!("expected a hex string, got {value}"),
        ));
    };
    let trimmed = text.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    u64::from_str_radix(digits, 16)
        .map_err(|error| FieldError::invalid(field, format!("{text:?}: {error}")))
}

/// Coerces a value to a UDP port.
///
/// # Errors
///
/// Returns `FieldError::Invalid` when the value is not an integer in
/// `0..=65535`.
pub fn port(field: &'static str, value: &Value) -> Result<u16, FieldError> {
    let raw = integer(field, value)?;
    u16::try_from(raw).map_err(|_| FieldError::invalid(field, format!("{raw} is not a valid port")))
}
