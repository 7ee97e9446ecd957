use crate::device::DeviceType;
use crate::error::{LoraSimError, Result};
use crate::simulator::PublishSettings;
use crate::transport::{BrokerAddress, ConnectOptions, Qos};
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    pub broker_url: String,
    pub client_id_prefix: String,
    pub keep_alive_secs: u64,
    pub connect_timeout_secs: u64,
    pub interval_ms: u64,
    /// `None` runs until cancelled.
    pub run_duration_secs: Option<u64>,
    pub drain_timeout_ms: u64,
    pub qos: Qos,
    pub retain: bool,
    pub device_types: Vec<DeviceType>,
    pub catalog_path: Option<PathBuf>,
    pub log_level: String,
    pub dry_run: bool,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            broker_url: "mqtt://localhost:1883".to_string(),
            client_id_prefix: "mqtt-".to_string(),
            keep_alive_secs: 30,
            connect_timeout_secs: 10,
            interval_ms: 1000,
            run_duration_secs: Some(1000),
            drain_timeout_ms: 250,
            qos: Qos::AtMostOnce,
            retain: false,
            device_types: DeviceType::PUBLISH_ORDER.to_vec(),
            catalog_path: None,
            log_level: "info".to_string(),
            dry_run: false,
        }
    }
}

impl SimulatorConfig {
    /// Reads the YAML file if one is given, then applies `SIM_*` environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_yaml_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let config_str = fs::read_to_string(path).map_err(|e| {
            LoraSimError::InvalidConfig(format!(
                "failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        Ok(serde_yaml::from_str(&config_str)?)
    }

    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(url) = lookup("SIM_BROKER_URL") {
            self.broker_url = url;
        }
        if let Some(interval) = lookup("SIM_INTERVAL_MS") {
            self.interval_ms = parse_var("SIM_INTERVAL_MS", &interval)?;
        }
        if let Some(duration) = lookup("SIM_RUN_DURATION_SECS") {
            self.run_duration_secs = match duration.trim() {
                "" | "none" => None,
                secs => Some(parse_var("SIM_RUN_DURATION_SECS", secs)?),
            };
        }
        if let Some(level) = lookup("SIM_LOG_LEVEL") {
            self.log_level = level;
        }
        if let Some(path) = lookup("SIM_CATALOG") {
            self.catalog_path = Some(PathBuf::from(path));
        }
        if let Some(dry_run) = lookup("SIM_DRY_RUN") {
            self.dry_run = matches!(dry_run.trim(), "1" | "true" | "yes");
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.interval_ms == 0 {
            return Err(LoraSimError::InvalidConfig(
                "interval_ms must be positive".into(),
            ));
        }
        if self.device_types.is_empty() {
            return Err(LoraSimError::InvalidConfig(
                "at least one device type must be simulated".into(),
            ));
        }
        if self.keep_alive_secs == 0 {
            return Err(LoraSimError::InvalidConfig(
                "keep_alive_secs must be positive".into(),
            ));
        }
        self.broker_address()?;
        self.log_level_filter()?;
        Ok(())
    }

    pub fn broker_address(&self) -> Result<BrokerAddress> {
        self.broker_url.parse()
    }

    pub fn log_level_filter(&self) -> Result<LevelFilter> {
        LevelFilter::from_str(&self.log_level).map_err(|_| {
            LoraSimError::InvalidConfig(format!("unknown log level {:?}", self.log_level))
        })
    }

    pub fn connect_options(&self) -> ConnectOptions {
        ConnectOptions {
            keep_alive: Duration::from_secs(self.keep_alive_secs),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            ..ConnectOptions::default()
        }
    }

    pub fn publish_settings(&self) -> PublishSettings {
        PublishSettings {
            interval: Duration::from_millis(self.interval_ms),
            run_duration: self.run_duration_secs.map(Duration::from_secs),
            drain_timeout: Duration::from_millis(self.drain_timeout_ms),
            device_types: self.device_types.clone(),
            qos: self.qos,
            retain: self.retain,
        }
    }
}

fn parse_var<T: FromStr>(key: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| LoraSimError::InvalidConfig(format!("{}={:?}: {}", key, value, e)))
}
