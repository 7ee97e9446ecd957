use crate::sensor::SensorKind;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DeviceType {
    SmartLights,
    WaterTankLevels,
    Hidrometers,
    ArtesianWells,
}

impl DeviceType {
    pub const ALL: [DeviceType; 4] = [
        DeviceType::SmartLights,
        DeviceType::WaterTankLevels,
        DeviceType::Hidrometers,
        DeviceType::ArtesianWells,
    ];

    /// Order in which one cycle publishes the device types.
    pub const PUBLISH_ORDER: [DeviceType; 4] = [
        DeviceType::WaterTankLevels,
        DeviceType::Hidrometers,
        DeviceType::ArtesianWells,
        DeviceType::SmartLights,
    ];

    pub fn name(self) -> &'static str {
        match self {
            DeviceType::SmartLights => "SmartLights",
            DeviceType::WaterTankLevels => "WaterTankLevels",
            DeviceType::Hidrometers => "Hidrometers",
            DeviceType::ArtesianWells => "ArtesianWells",
        }
    }

    /// Field layout the stock firmware of this device type reports.
    pub fn default_sensors(self) -> &'static [SensorKind] {
        match self {
            DeviceType::SmartLights => &[
                SensorKind::Counter,
                SensorKind::CounterAlt,
                SensorKind::CounterAlt,
                SensorKind::BoardVoltage,
            ],
            DeviceType::WaterTankLevels => &[SensorKind::Distance, SensorKind::BoardVoltage],
            DeviceType::Hidrometers => &[SensorKind::Counter, SensorKind::BoardVoltage],
            DeviceType::ArtesianWells => &[
                SensorKind::Pressure,
                SensorKind::Pressure,
                SensorKind::BoardVoltage,
            ],
        }
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub node_name: String,
    pub dev_eui: String,
}

impl Device {
    pub fn new(node_name: impl Into<String>, dev_eui: impl Into<String>) -> Self {
        Self {
            node_name: node_name.into(),
            dev_eui: dev_eui.into(),
        }
    }
}
