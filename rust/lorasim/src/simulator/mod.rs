mod node;
pub use node::SimulatorNode;

use crate::device::DeviceType;
use crate::transport::Qos;
use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublishSettings {
    pub interval: Duration,
    pub run_duration: Option<Duration>,
    pub drain_timeout: Duration,
    /// Published in this order on every tick.
    pub device_types: Vec<DeviceType>,
    pub qos: Qos,
    pub retain: bool,
}

/// Outcome of one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub published: u64,
    pub dropped: u64,
    pub publish_failures: u64,
}

/// Totals over a whole run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u64,
    pub published: u64,
    pub dropped: u64,
    pub publish_failures: u64,
}

impl RunSummary {
    pub fn record(&mut self, cycle: CycleReport) {
        self.ticks += 1;
        self.published += cycle.published;
        self.dropped += cycle.dropped;
        self.publish_failures += cycle.publish_failures;
    }
}
