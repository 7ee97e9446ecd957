use super::envelope::{Envelope, Uplink};
use crate::device::{Catalog, DeviceType};
use crate::error::Result;
use crate::sensor::{SensorEncoder, Tick};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

/// One uplink ready for the transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    pub topic: String,
    pub body: String,
}

/// Turns a (device type, tick) pair into the uplink a network server would emit.
pub struct PayloadAssembler {
    catalog: Catalog,
    envelope: Envelope,
    encoder: SensorEncoder,
}

impl PayloadAssembler {
    pub fn new(catalog: Catalog, envelope: Envelope, encoder: SensorEncoder) -> Self {
        Self {
            catalog,
            envelope,
            encoder,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    /// Sensor fields of `device_type` for `tick`, in declared order.
    ///
    /// Fails rather than truncating when the fields do not pack into whole bytes.
    pub fn sensor_data(&mut self, device_type: DeviceType, tick: Tick) -> Result<Vec<u8>> {
        let profile = self.catalog.profile(device_type)?;
        let fields: String = profile
            .sensors
            .iter()
            .map(|kind| self.encoder.encode_hex(*kind, tick))
            .collect();
        Ok(hex::decode(fields)?)
    }

    pub fn assemble(&mut self, device_type: DeviceType, tick: Tick) -> Result<Message> {
        let data = STANDARD.encode(self.sensor_data(device_type, tick)?);
        let device = self.catalog.select_device(device_type, tick)?;

        let uplink = Uplink {
            application_id: &self.envelope.application_id,
            application_name: &self.envelope.application_name,
            node_name: &device.node_name,
            dev_eui: &device.dev_eui,
            rx_info: &self.envelope.rx_info,
            tx_info: &self.envelope.tx_info,
            f_cnt: self.envelope.f_cnt,
            f_port: self.envelope.f_port,
            data,
        };

        Ok(Message {
            topic: self.envelope.topic(&device.dev_eui),
            body: serde_json::to_string(&uplink)?,
        })
    }
}
