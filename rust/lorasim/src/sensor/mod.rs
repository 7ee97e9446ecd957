pub mod encoder;
pub mod interface;

pub use encoder::SensorEncoder;
pub use interface::{SensorKind, Tick, ValueDomain};
