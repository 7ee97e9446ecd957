pub mod memory;
pub mod mqtt;

pub use memory::{MemoryTransport, PublishedMessage};
pub use mqtt::{BrokerAddress, ConnectOptions, MqttTransport};

use crate::error::{LoraSimError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Qos {
    #[default]
    AtMostOnce,
    AtLeastOnce,
    ExactlyOnce,
}

impl TryFrom<u8> for Qos {
    type Error = LoraSimError;

    fn try_from(level: u8) -> Result<Self> {
        match level {
            0 => Ok(Qos::AtMostOnce),
            1 => Ok(Qos::AtLeastOnce),
            2 => Ok(Qos::ExactlyOnce),
            other => Err(LoraSimError::InvalidConfig(format!(
                "QoS must be 0, 1 or 2, got {}",
                other
            ))),
        }
    }
}

impl From<Qos> for u8 {
    fn from(qos: Qos) -> Self {
        match qos {
            Qos::AtMostOnce => 0,
            Qos::AtLeastOnce => 1,
            Qos::ExactlyOnce => 2,
        }
    }
}

impl From<Qos> for rumqttc::QoS {
    fn from(qos: Qos) -> Self {
        match qos {
            Qos::AtMostOnce => rumqttc::QoS::AtMostOnce,
            Qos::AtLeastOnce => rumqttc::QoS::AtLeastOnce,
            Qos::ExactlyOnce => rumqttc::QoS::ExactlyOnce,
        }
    }
}

/// Where assembled uplinks go.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn publish(&self, topic: &str, qos: Qos, retain: bool, payload: Vec<u8>)
        -> Result<()>;

    /// Flushes what was already handed to `publish`, waiting at most `drain_timeout`,
    /// then releases the connection.
    async fn disconnect(&self, drain_timeout: Duration) -> Result<()>;
}

/// Client identifier for this process: `prefix` followed by a random UUID.
pub fn client_id(prefix: &str) -> Result<String> {
    if prefix.chars().any(|c| c.is_whitespace() || c == '/' || c == '#' || c == '+') {
        return Err(LoraSimError::InvalidConfig(format!(
            "client id prefix {:?} contains reserved characters",
            prefix
        )));
    }
    Ok(format!("{}{}", prefix, Uuid::new_v4()))
}
