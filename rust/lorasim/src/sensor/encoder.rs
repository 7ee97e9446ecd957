use super::interface::{SensorKind, Tick, ValueDomain};
use crate::error::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Renders sensor readings as `type code || big-endian value` fields.
///
/// Holds the only random source of the simulation; seed it once per process.
pub struct SensorEncoder {
    rng: StdRng,
}

impl SensorEncoder {
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn value(&mut self, kind: SensorKind, tick: Tick) -> u64 {
        match kind.domain() {
            ValueDomain::Range { min, max } => u64::from(self.rng.gen_range(min..=max)),
            ValueDomain::Tick => tick,
        }
    }

    /// Lowercase hex rendering of one field. The counter is not clamped, so a tick
    /// past `0xffffff` yields a wider (possibly odd-length) value.
    pub fn encode_hex(&mut self, kind: SensorKind, tick: Tick) -> String {
        let value = self.value(kind, tick);
        format!(
            "{:02x}{:0width$x}",
            kind.type_code(),
            value,
            width = kind.hex_width()
        )
    }

    pub fn encode(&mut self, kind: SensorKind, tick: Tick) -> Result<Vec<u8>> {
        Ok(hex::decode(self.encode_hex(kind, tick))?)
    }
}
