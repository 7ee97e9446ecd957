use crate::device::DeviceType;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoraSimError {
    #[error("MQTT client error: {0}")]
    MqttClientError(#[from] rumqttc::ClientError),
    #[error("MQTT connection error: {0}")]
    MqttConnectionError(#[from] rumqttc::ConnectionError),
    #[error("Broker refused connection: {0:?}")]
    ConnectionRefused(rumqttc::ConnectReturnCode),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Encoding error: {0}")]
    EncodingError(#[from] hex::FromHexError),
    #[error("Unknown device type: {0}")]
    UnknownDeviceType(DeviceType),
    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),
    #[error("Other error: {0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, LoraSimError>;
