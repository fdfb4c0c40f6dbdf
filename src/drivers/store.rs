use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use crate::drivers::{DeviceRequest, ScopeError};
use crate::scope::ScopeConfig;
/// Persisted scope settings, in the same shape the device UI has always written.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoredConfig {
    #[serde(rename = "desiredRate")]
    pub desired_rate: u32,
    pub sample_rate: u32,
    pub bit_width: u8,
    pub atten: u8,
    pub test_hz: u32,
    pub trigger: u16,
    pub invert: bool,
}
impl StoredConfig {
    pub fn from_scope(config: &ScopeConfig) -> Self {
        Self {
            desired_rate: config.desired_rate,
            sample_rate: config.hardware_sample_rate,
            bit_width: config.bit_width,
            atten: config.attenuation.min(u8::MAX as usize) as u8,
            test_hz: config.test_hz,
            trigger: config.trigger_level,
            invert: config.trigger_invert,
        }
    }
    /// Rebuilds the pipeline configuration. The hardware rate is re-derived from
    /// the desired rate so the two can never disagree.
    pub fn scope_config(&self) -> ScopeConfig {
        ScopeConfig::new(
            self.desired_rate,
            self.atten as usize,
            self.bit_width,
            self.test_hz,
        )
        .with_trigger(self.trigger, self.invert)
    }
    pub fn device_request(&self) -> DeviceRequest {
        let config = self.scope_config();
        DeviceRequest {
            sample_rate: config.hardware_sample_rate,
            bit_width: self.bit_width,
            atten: self.atten,
            test_hz: self.test_hz,
        }
    }
}
impl Default for StoredConfig {
    fn default() -> Self {
        StoredConfig::from_scope(&ScopeConfig::default())
    }
}
pub struct ConfigStore {
    path: PathBuf,
}
impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
    pub fn path(&self) -> &Path {
        &self.path
    }
    /// Missing or unreadable records mean "nothing stored".
    pub fn load(&self) -> Option<StoredConfig> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                log::debug!("no stored config at {}", self.path.display());
                return None;
            }
            Err(err) => {
                log::warn!("failed to read {}: {err}", self.path.display());
                return None;
            }
        };
        match serde_json::from_str(&text) {
            Ok(config) => Some(config),
            Err(err) => {
                log::warn!("ignoring corrupt config {}: {err}", self.path.display());
                None
            }
        }
    }
    pub fn save(&self, config: &StoredConfig) -> Result<(), ScopeError> {
        let json = serde_json::to_string_pretty(config)?;
        fs::write(&self.path, json)?;
        log::debug!("saved config to {}", self.path.display());
        Ok(())
    }
}
