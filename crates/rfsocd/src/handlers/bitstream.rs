//! `upload_bitstream`: loads an FPGA overlay from the board's filesystem.

use std::path::Path;

use serde_json::{Map, Value};

use crate::dispatch::Envelope;
use crate::driver::HardwareDriver;

use super::params::{FieldError, require};
use super::{HandlerError, respond};

const FIELD: &str = "abs_bitstream_path";

/// Uploads the bitstream named by `abs_bitstream_path`.
///
/// The path must exist before the driver is called.
pub fn upload_bitstream<D: HardwareDriver>(
    driver: &mut D,
    uuid: &str,
    data: &Map<String, Value>,
) -> Envelope {
    respond("upload_bitstream", uuid, apply(driver, data))
}

fn apply<D: HardwareDriver>(
    driver: &mut D,
    data: &Map<String, Value>,
) -> Result<Map<String, Value>, HandlerError> {
    let Value::String(raw) = require(data, FIELD)? else {
        return Err(HandlerError::from(FieldError::Invalid {
            field: FIELD,
            reason: "expected a path string".to_owned(),
        }));
    };
    let path = Path::new(raw);
    if !path.exists() {
        return Err(HandlerError::BitstreamNotFound {
            path: path.to_path_buf(),
        });
    }
    driver
        .upload_overlay(path)
        .map_err(HandlerError::BitstreamUpload)?;
    Ok(Map::new())
}
