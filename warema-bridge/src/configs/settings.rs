use std::collections::BTreeSet;
use std::env;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::configs::resolve::*;
use crate::stick::{ScannedDevice, StickConfig};

pub const DEFAULT_MQTT_SERVER: &str = "mqtt://localhost:1883";
pub const DEFAULT_CLIENT_ID: &str = "warema-bridge";
pub const DEFAULT_SERIAL_PORT: &str = "/dev/ttyUSB0";

/// Settings exactly as supplied by the config files and the environment.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSettings {
    pub mqtt_server: Option<String>,
    pub mqtt_user: Option<String>,
    pub mqtt_password: Option<String>,
    pub mqtt_client_id: Option<String>,
    pub ignored_devices: Option<String>,
    pub force_devices: Option<String>,
    pub wms_channel: Option<String>,
    pub wms_pan_id: Option<String>,
    pub wms_key: Option<String>,
    pub wms_serial_port: Option<String>,
    pub log_level: Option<String>,
    pub simulated_devices: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Logger {
    pub level: String,
}

#[derive(Debug, Clone)]
pub struct Mqtt {
    pub server: String,
    pub client_id: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Wms {
    pub channel: u8,
    pub pan_id: String,
    pub key: String,
    pub serial_port: String,
}

#[derive(Debug, Clone, Default)]
pub struct Devices {
    pub ignored: BTreeSet<String>,
    pub forced: Vec<String>,
    pub simulated: Vec<ScannedDevice>,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub logger: Logger,
    pub mqtt: Mqtt,
    pub wms: Wms,
    pub devices: Devices,
}

impl RawSettings {
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or("development".into());

        let config = Config::builder()
            .add_source(File::with_name("configs/default").required(false))
            .add_source(File::with_name(&format!("configs/{run_mode}")).required(false))
            .add_source(Environment::default())
            .build()?;

        Self::from_config(config)
    }

    pub fn from_config(config: Config) -> Result<Self, ConfigError> {
        config.try_deserialize()
    }

    pub fn log_level(&self) -> &'static str {
        resolve_log_level(self.log_level.as_deref())
    }
}

impl Settings {
    /// Applies defaults and validation. Never fails, invalid values are
    /// replaced and reported as warnings.
    pub fn from_raw(raw: RawSettings) -> Self {
        let logger = Logger { level: raw.log_level().to_string() };

        let username = non_empty(raw.mqtt_user);
        let mqtt = Mqtt {
            server: non_empty(raw.mqtt_server).unwrap_or_else(|| DEFAULT_MQTT_SERVER.to_string()),
            client_id: non_empty(raw.mqtt_client_id).unwrap_or_else(|| DEFAULT_CLIENT_ID.to_string()),
            password: username.as_ref().and(raw.mqtt_password),
            username,
        };

        let wms = Wms {
            channel: resolve_channel(non_empty(raw.wms_channel).as_deref().unwrap_or("17")),
            pan_id: resolve_pan_id(non_empty(raw.wms_pan_id).as_deref().unwrap_or(DEFAULT_PAN_ID)),
            key: resolve_key(non_empty(raw.wms_key).as_deref().unwrap_or(DEFAULT_KEY)),
            serial_port: non_empty(raw.wms_serial_port)
                .unwrap_or_else(|| DEFAULT_SERIAL_PORT.to_string()),
        };

        let devices = Devices {
            ignored: parse_serial_set(raw.ignored_devices.as_deref()),
            forced: parse_serial_list(raw.force_devices.as_deref()),
            simulated: parse_simulated_devices(raw.simulated_devices.as_deref()),
        };

        Self { logger, mqtt, wms, devices }
    }

    pub fn stick_config(&self) -> StickConfig {
        StickConfig {
            serial_port: self.wms.serial_port.clone(),
            channel: self.wms.channel,
            pan_id: self.wms.pan_id.clone(),
            key: self.wms.key.clone(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_raw(RawSettings::default())
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}
