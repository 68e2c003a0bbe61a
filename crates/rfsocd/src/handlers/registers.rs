//! `config_hardware`: programs the UDP streaming registers.

use serde_json::{Map, Value};

use crate::dispatch::Envelope;
use crate::driver::{HardwareDriver, RegisterConfig};

use super::params::{FieldError, hex, ipv4, port, require};
use super::{HandlerError, respond};

/// Configures both UDP data streams from the request fields.
///
/// Fields are read in a fixed order and the first bad one aborts the request
/// before the driver is touched.
pub fn config_hardware<D: HardwareDriver>(
    driver: &mut D,
    uuid: &str,
    data: &Map<String, Value>,
) -> Envelope {
    respond("config_hardware", uuid, apply(driver, data))
}

fn apply<D: HardwareDriver>(
    driver: &mut D,
    data: &Map<String, Value>,
) -> Result<Map<String, Value>, HandlerError> {
    let registers = parse_registers(data)?;
    driver
        .configure_registers(&registers)
        .map_err(HandlerError::RegisterWrite)?;
    Ok(Map::new())
}

fn parse_registers(data: &Map<String, Value>) -> Result<RegisterConfig, FieldError> {
    let address = |field| require(data, field).and_then(|value| ipv4(field, value));
    let mac = |field| require(data, field).and_then(|value| hex(field, value));
    let udp_port = |field| require(data, field).and_then(|value| port(field, value));

    Ok(RegisterConfig {
        data_a_srcip: address("data_a_srcip")?,
        data_b_srcip: address("data_b_srcip")?,
        data_a_dstip: address("data_a_dstip")?,
        data_b_dstip: address("data_b_dstip")?,
        destmac_a_msb: mac("destmac_a_msb")?,
        destmac_a_lsb: mac("destmac_a_lsb")?,
        destmac_b_msb: mac("destmac_b_msb")?,
        destmac_b_lsb: mac("destmac_b_lsb")?,
        port_a: udp_port("port_a")?,
        port_b: udp_port("port_b")?,
    })
}
