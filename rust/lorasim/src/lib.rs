pub mod config;
pub mod device;
pub mod error;
pub mod logging;
pub mod payload;
pub mod sensor;
pub mod simulator;
pub mod transport;

pub use error::{LoraSimError, Result};
pub use logging::init_logger;
