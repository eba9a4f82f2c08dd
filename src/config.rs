//! Server configuration.
//!
//! Loaded from JSON by the replay tool; every field has a default so a
//! partial document (or none at all) is valid.

use serde::{Deserialize, Serialize};

use crate::engine::{DeviceId, Phase};
use crate::error::ConfigError;
use crate::protocol::cipher;

/// Initial schedule for one device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceWorkSchedule {
    pub device_id: DeviceId,
    /// Any order; sorted when applied.
    pub phases: Vec<Phase>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Obfuscation cipher to select at startup.  `None` keeps the encoder
    /// closed until one is selected at runtime.
    pub cipher: Option<String>,
    /// Drop a device's engine state when its connection closes.
    pub forget_on_disconnect: bool,
    /// Schedules applied before the first event is served.
    pub schedules: Vec<DeviceWorkSchedule>,
    /// Default `env_logger` filter (`RUST_LOG` overrides it).
    pub log_filter: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            cipher: None,
            forget_on_disconnect: false,
            schedules: Vec::new(),
            log_filter: "info".into(),
        }
    }
}

impl ServerConfig {
    /// Parse and validate a JSON document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(name) = &self.cipher {
            if !cipher::BUILTIN_NAMES.contains(&name.as_str()) {
                return Err(ConfigError::ValidationFailed("cipher: unknown name"));
            }
        }

        let mut ids: Vec<DeviceId> = self.schedules.iter().map(|s| s.device_id).collect();
        ids.sort_unstable();
        if ids.windows(2).any(|w| w[0] == w[1]) {
            return Err(ConfigError::ValidationFailed(
                "schedules: duplicate device_id",
            ));
        }

        if self.log_filter.trim().is_empty() {
            return Err(ConfigError::ValidationFailed("log_filter: empty"));
        }

        Ok(())
    }
}
