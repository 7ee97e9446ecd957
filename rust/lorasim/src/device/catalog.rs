use super::interface::{Device, DeviceType};
use crate::error::{LoraSimError, Result};
use crate::sensor::{SensorKind, Tick};
use lazy_static::lazy_static;
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceProfile {
    pub sensors: Vec<SensorKind>,
    pub devices: Vec<Device>,
}

impl DeviceProfile {
    /// Round-robin: the device at `tick mod len` reports on this tick.
    pub fn select(&self, tick: Tick) -> &Device {
        let index = (tick % self.devices.len() as u64) as usize;
        &self.devices[index]
    }

    fn validate(&self, device_type: DeviceType) -> Result<()> {
        if self.sensors.is_empty() {
            return Err(LoraSimError::InvalidCatalog(format!(
                "{} has no sensors",
                device_type
            )));
        }
        if self.devices.is_empty() {
            return Err(LoraSimError::InvalidCatalog(format!(
                "{} has no devices",
                device_type
            )));
        }
        for device in &self.devices {
            let well_formed = device.dev_eui.len() == 16
                && device.dev_eui.chars().all(|c| c.is_ascii_hexdigit());
            if !well_formed {
                return Err(LoraSimError::InvalidCatalog(format!(
                    "{} device {} has malformed devEUI {:?}",
                    device_type, device.node_name, device.dev_eui
                )));
            }
        }
        Ok(())
    }
}

/// Immutable mapping from device type to its sensor layout and devices.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<DeviceType, DeviceProfile>")]
#[serde(into = "BTreeMap<DeviceType, DeviceProfile>")]
pub struct Catalog {
    profiles: BTreeMap<DeviceType, DeviceProfile>,
}

impl TryFrom<BTreeMap<DeviceType, DeviceProfile>> for Catalog {
    type Error = LoraSimError;

    fn try_from(profiles: BTreeMap<DeviceType, DeviceProfile>) -> Result<Self> {
        Catalog::new(profiles)
    }
}

impl From<Catalog> for BTreeMap<DeviceType, DeviceProfile> {
    fn from(catalog: Catalog) -> Self {
        catalog.profiles
    }
}

fn numbered(prefix: &str, eui_base: &str, count: u32) -> Vec<Device> {
    (1..=count)
        .map(|n| Device::new(format!("{}_{}", prefix, n), format!("{}{}", eui_base, n)))
        .collect()
}

lazy_static! {
    static ref BUILTIN: Catalog = {
        let profiles = DeviceType::ALL
            .into_iter()
            .map(|device_type| {
                let devices = match device_type {
                    DeviceType::SmartLights => numbered("SmartLight", "0004a30b0000000", 7),
                    DeviceType::WaterTankLevels => {
                        numbered("WaterTankLevel", "0004a30b0000100", 8)
                    }
                    DeviceType::Hidrometers => numbered("Hidrometer", "0004a30b0010100", 8),
                    DeviceType::ArtesianWells => {
                        vec![Device::new("ArtesianWell_1", "0004a30b0040100c")]
                    }
                };
                let profile = DeviceProfile {
                    sensors: device_type.default_sensors().to_vec(),
                    devices,
                };
                (device_type, profile)
            })
            .collect();
        Catalog { profiles }
    };
}

impl Catalog {
    pub fn new(profiles: BTreeMap<DeviceType, DeviceProfile>) -> Result<Self> {
        for (device_type, profile) in &profiles {
            profile.validate(*device_type)?;
        }
        Ok(Self { profiles })
    }

    /// The campus fleet the simulator ships with.
    pub fn builtin() -> Self {
        BUILTIN.clone()
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let yaml = fs::read_to_string(path)?;
        let catalog = Self::from_yaml_str(&yaml)?;
        info!(
            "Loaded catalog with {} device types from {}",
            catalog.profiles.len(),
            path.display()
        );
        Ok(catalog)
    }

    pub fn profile(&self, device_type: DeviceType) -> Result<&DeviceProfile> {
        self.profiles
            .get(&device_type)
            .ok_or(LoraSimError::UnknownDeviceType(device_type))
    }

    pub fn select_device(&self, device_type: DeviceType, tick: Tick) -> Result<&Device> {
        Ok(self.profile(device_type)?.select(tick))
    }

    pub fn contains(&self, device_type: DeviceType) -> bool {
        self.profiles.contains_key(&device_type)
    }

    pub fn device_types(&self) -> impl Iterator<Item = DeviceType> + '_ {
        self.profiles.keys().copied()
    }
}
