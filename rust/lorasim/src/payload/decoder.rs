use super::envelope::ReceivedUplink;
use crate::error::{LoraSimError, Result};
use crate::sensor::SensorKind;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Reading {
    pub kind: SensorKind,
    pub value: u64,
}

/// Splits a `data` payload into readings, positionally, the way the ingestion side does.
/// Every record must carry the expected type code and the payload must end exactly
/// after the last record.
pub fn decode_fields(sensors: &[SensorKind], bytes: &[u8]) -> Result<Vec<Reading>> {
    let mut readings = Vec::with_capacity(sensors.len());
    let mut rest = bytes;

    for kind in sensors {
        let len = kind.field_len();
        if rest.len() < len {
            return Err(LoraSimError::InvalidPayload(format!(
                "{} field needs {} bytes, {} left",
                kind,
                len,
                rest.len()
            )));
        }
        let (field, tail) = rest.split_at(len);
        if field[0] != kind.type_code() {
            return Err(LoraSimError::InvalidPayload(format!(
                "expected type code {:#04x} for {}, found {:#04x}",
                kind.type_code(),
                kind,
                field[0]
            )));
        }
        let value = field[1..]
            .iter()
            .fold(0u64, |acc, byte| (acc << 8) | u64::from(*byte));
        readings.push(Reading { kind: *kind, value });
        rest = tail;
    }

    if !rest.is_empty() {
        return Err(LoraSimError::InvalidPayload(format!(
            "{} trailing bytes",
            rest.len()
        )));
    }
    Ok(readings)
}

pub fn parse_uplink(body: &str) -> Result<ReceivedUplink> {
    Ok(serde_json::from_str(body)?)
}

pub fn decode_data(data: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(data)
        .map_err(|e| LoraSimError::InvalidPayload(format!("bad base64 data: {}", e)))
}
