use serde::{Deserialize, Serialize};
use std::fmt;

/// One simulation cycle. Shared by every device type within a cycle.
pub type Tick = u64;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SensorKind {
    Temperature,
    Humidity,
    BoardVoltage,
    Counter,
    #[serde(rename = "counter_0d")]
    CounterAlt,
    Distance,
    Pressure,
}

/// Where a sensor's value comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueDomain {
    /// Uniform draw from `min..=max`.
    Range { min: u32, max: u32 },
    /// The tick index itself.
    Tick,
}

impl SensorKind {
    pub const ALL: [SensorKind; 7] = [
        SensorKind::Temperature,
        SensorKind::Humidity,
        SensorKind::BoardVoltage,
        SensorKind::Counter,
        SensorKind::CounterAlt,
        SensorKind::Distance,
        SensorKind::Pressure,
    ];

    pub fn type_code(self) -> u8 {
        match self {
            SensorKind::Temperature => 0x01,
            SensorKind::Humidity => 0x02,
            SensorKind::Pressure => 0x03,
            SensorKind::Counter => 0x0b,
            SensorKind::BoardVoltage => 0x0c,
            SensorKind::CounterAlt => 0x0d,
            SensorKind::Distance => 0x13,
        }
    }

    pub fn domain(self) -> ValueDomain {
        match self {
            SensorKind::Temperature => ValueDomain::Range { min: 0, max: 400 },
            SensorKind::Humidity => ValueDomain::Range { min: 0, max: 100 },
            SensorKind::BoardVoltage => ValueDomain::Range { min: 0, max: 4200 },
            SensorKind::Counter => ValueDomain::Tick,
            SensorKind::CounterAlt | SensorKind::Distance | SensorKind::Pressure => {
                ValueDomain::Range { min: 0, max: 4096 }
            }
        }
    }

    /// Number of hex digits the value is zero-padded to.
    pub fn hex_width(self) -> usize {
        match self.domain() {
            ValueDomain::Range { .. } => 4,
            ValueDomain::Tick => 6,
        }
    }

    /// Encoded field length in bytes, type code included.
    pub fn field_len(self) -> usize {
        1 + self.hex_width() / 2
    }

    pub fn name(self) -> &'static str {
        match self {
            SensorKind::Temperature => "temperature",
            SensorKind::Humidity => "humidity",
            SensorKind::BoardVoltage => "boardVoltage",
            SensorKind::Counter => "counter",
            SensorKind::CounterAlt => "counter_0d",
            SensorKind::Distance => "distance",
            SensorKind::Pressure => "pressure",
        }
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}
