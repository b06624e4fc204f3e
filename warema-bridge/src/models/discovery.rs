//! Home Assistant discovery documents.
//!
//! Field names follow the MQTT discovery schema Home Assistant expects for
//! `cover` and `sensor` entities. Payloads are rebuilt for every publish.

use serde::Serialize;

use crate::models::device::{DeviceClass, DeviceType, MANUFACTURER};
use crate::models::topic;

pub const POSITION_OPEN: u8 = 0;
pub const POSITION_CLOSED: u8 = 100;
pub const TILT_MIN: i8 = -100;
pub const TILT_MAX: i8 = 100;

const WEATHER_STATION_MODEL: &str = "Weather Station";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Availability {
    pub topic: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceInfo {
    pub identifiers: String,
    pub manufacturer: &'static str,
    pub name: String,
    pub model: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TiltConfig {
    pub tilt_status_topic: String,
    pub tilt_command_topic: String,
    pub tilt_closed_value: i8,
    pub tilt_opened_value: i8,
    pub tilt_min: i8,
    pub tilt_max: i8,
}

/// Shading actuator exposed as a cover.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoverDiscovery {
    pub name: String,
    pub unique_id: String,
    pub availability: Vec<Availability>,
    pub device: DeviceInfo,
    pub position_open: u8,
    pub position_closed: u8,
    pub command_topic: String,
    pub position_topic: String,
    pub set_position_topic: String,
    #[serde(flatten)]
    pub tilt: Option<TiltConfig>,
}

/// Identity-only document for a weather station found by a scan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationDiscovery {
    pub name: String,
    pub unique_id: String,
    pub availability: Vec<Availability>,
    pub device: DeviceInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Discovery {
    Cover(CoverDiscovery),
    Station(StationDiscovery),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorKind {
    Illuminance,
    Temperature,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorDiscovery {
    pub name: String,
    pub unique_id: String,
    pub availability: Vec<Availability>,
    pub device: DeviceInfo,
    pub force_update: bool,
    pub state_topic: String,
    pub device_class: &'static str,
    pub unit_of_measurement: &'static str,
}

fn availability(serial: &str) -> Vec<Availability> {
    vec![
        Availability { topic: topic::BRIDGE_STATE.to_string() },
        Availability { topic: topic::availability(serial) },
    ]
}

fn device_info(serial: &str, model: &'static str) -> DeviceInfo {
    DeviceInfo {
        identifiers: serial.to_string(),
        manufacturer: MANUFACTURER,
        name: serial.to_string(),
        model,
    }
}

impl Discovery {
    /// Discovery document for a scanned or forced device.
    ///
    /// Returns `None` for the unsupported WebControl pro and for unknown type
    /// codes; the latter is logged.
    pub fn build(serial: &str, device_type: DeviceType) -> Option<Self> {
        match device_type.class() {
            DeviceClass::Sensor { model } => Some(Discovery::Station(StationDiscovery {
                name: serial.to_string(),
                unique_id: serial.to_string(),
                availability: availability(serial),
                device: device_info(serial, model),
            })),
            DeviceClass::Shading { model, tilt } => Some(Discovery::Cover(CoverDiscovery {
                name: serial.to_string(),
                unique_id: serial.to_string(),
                availability: availability(serial),
                device: device_info(serial, model),
                position_open: POSITION_OPEN,
                position_closed: POSITION_CLOSED,
                command_topic: topic::command(serial),
                position_topic: topic::position(serial),
                set_position_topic: topic::set_position(serial),
                tilt: tilt.then(|| TiltConfig {
                    tilt_status_topic: topic::tilt(serial),
                    tilt_command_topic: topic::set_tilt(serial),
                    tilt_closed_value: TILT_MIN,
                    tilt_opened_value: TILT_MAX,
                    tilt_min: TILT_MIN,
                    tilt_max: TILT_MAX,
                }),
            })),
            DeviceClass::Unsupported => None,
            DeviceClass::Unrecognized(code) => {
                tracing::warn!("Unrecognized device type: {}", code);
                None
            }
        }
    }

    pub fn unique_id(&self) -> &str {
        match self {
            Discovery::Cover(cover) => &cover.unique_id,
            Discovery::Station(station) => &station.unique_id,
        }
    }

    /// Registration always lands on the cover config topic.
    pub fn config_topic(&self) -> String {
        topic::cover_config(self.unique_id())
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl SensorKind {
    pub const ALL: [SensorKind; 2] = [SensorKind::Illuminance, SensorKind::Temperature];

    pub fn as_str(self) -> &'static str {
        match self {
            SensorKind::Illuminance => "illuminance",
            SensorKind::Temperature => "temperature",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            SensorKind::Illuminance => "lm",
            SensorKind::Temperature => "C",
        }
    }
}

impl SensorDiscovery {
    pub fn new(serial: &str, kind: SensorKind) -> Self {
        Self {
            name: serial.to_string(),
            unique_id: format!("{serial}_{}", kind.as_str()),
            availability: availability(serial),
            device: device_info(serial, WEATHER_STATION_MODEL),
            force_update: true,
            state_topic: topic::sensor_state(serial, kind.as_str()),
            device_class: kind.as_str(),
            unit_of_measurement: kind.unit(),
        }
    }

    pub fn config_topic(&self) -> String {
        topic::sensor_config(&self.device.identifiers, self.device_class)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;

    fn to_value(discovery: &Discovery) -> Value {
        serde_json::from_str(&discovery.to_json().unwrap()).unwrap()
    }

    #[test]
    fn test_tilt_cover_payload() {
        let discovery = Discovery::build("12345", DeviceType::ActuatorUp).unwrap();
        let value = to_value(&discovery);

        assert_eq!(discovery.config_topic(), "homeassistant/cover/12345/12345/config");
        assert_eq!(value["unique_id"], json!("12345"));
        assert_eq!(value["position_open"], json!(0));
        assert_eq!(value["position_closed"], json!(100));
        assert_eq!(value["command_topic"], json!("warema/12345/set"));
        assert_eq!(value["position_topic"], json!("warema/12345/position"));
        assert_eq!(value["set_position_topic"], json!("warema/12345/set_position"));
        assert_eq!(value["tilt_status_topic"], json!("warema/12345/tilt"));
        assert_eq!(value["tilt_command_topic"], json!("warema/12345/set_tilt"));
        assert_eq!(value["tilt_min"], json!(-100));
        assert_eq!(value["tilt_max"], json!(100));
        assert_eq!(value["tilt_closed_value"], json!(-100));
        assert_eq!(value["tilt_opened_value"], json!(100));
        assert_eq!(
            value["availability"],
            json!([{ "topic": "warema/bridge/state" }, { "topic": "warema/12345/availability" }])
        );
        assert_eq!(
            value["device"],
            json!({
                "identifiers": "12345",
                "manufacturer": "Warema",
                "name": "12345",
                "model": "Actuator UP"
            })
        );
    }

    #[test]
    fn test_plug_receiver_supports_tilt() {
        let value = to_value(&Discovery::build("7", DeviceType::PlugReceiver).unwrap());

        assert_eq!(value["device"]["model"], json!("Plug receiver"));
        assert_eq!(value["tilt_command_topic"], json!("warema/7/set_tilt"));
    }

    #[test]
    fn test_vertical_awning_has_no_tilt() {
        let value = to_value(&Discovery::build("222", DeviceType::VerticalAwning).unwrap());
        let object = value.as_object().unwrap();

        assert_eq!(value["device"]["model"], json!("Vertical awning"));
        assert!(object.keys().all(|key| !key.starts_with("tilt_")));
    }

    #[test]
    fn test_weather_station_payload() {
        let discovery = Discovery::build("999", DeviceType::WeatherStation).unwrap();
        let value = to_value(&discovery);

        assert!(matches!(discovery, Discovery::Station(_)));
        assert_eq!(value["device"]["model"], json!("Weather station"));
        assert!(value.get("command_topic").is_none());
        assert_eq!(value["availability"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_unsupported_and_unknown_types() {
        assert!(Discovery::build("1", DeviceType::WebControlPro).is_none());
        assert!(Discovery::build("1", DeviceType::Unknown(77)).is_none());
    }

    #[test]
    fn test_sensor_payloads() {
        let illuminance = SensorDiscovery::new("999", SensorKind::Illuminance);
        let temperature = SensorDiscovery::new("999", SensorKind::Temperature);

        assert_eq!(illuminance.config_topic(), "homeassistant/sensor/999/illuminance/config");
        assert_eq!(temperature.config_topic(), "homeassistant/sensor/999/temperature/config");

        let value: Value = serde_json::from_str(&illuminance.to_json().unwrap()).unwrap();
        assert_eq!(value["unique_id"], json!("999_illuminance"));
        assert_eq!(value["state_topic"], json!("warema/999/illuminance/state"));
        assert_eq!(value["unit_of_measurement"], json!("lm"));
        assert_eq!(value["force_update"], json!(true));
        assert_eq!(value["device"]["model"], json!("Weather Station"));

        assert_eq!(temperature.unique_id, "999_temperature");
        assert_eq!(temperature.unit_of_measurement, "C");
    }
}
