//! Contract of the WMS USB stick driver.
//!
//! The radio protocol itself lives behind [`Stick`]. Driver events are
//! delivered as [`StickNotification`]s on a channel drained by the bridge
//! dispatcher, one at a time.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc;

use crate::errors::StickError;
use crate::models::DeviceType;

pub mod simulated;

pub use simulated::SimulatedStick;

pub const INIT_COMPLETION: &str = "wms-vb-init-completion";
pub const WEATHER_BROADCAST: &str = "wms-vb-rcv-weather-broadcast";
pub const BLIND_POSITION_UPDATE: &str = "wms-vb-blind-position-update";
pub const SCANNED_DEVICES: &str = "wms-vb-scanned-devices";

pub type StickSender = mpsc::UnboundedSender<StickNotification>;
pub type StickReceiver = mpsc::UnboundedReceiver<StickNotification>;

/// Parameters the stick is opened with.
#[derive(Clone, PartialEq, Eq)]
pub struct StickConfig {
    pub serial_port: String,
    pub channel: u8,
    pub pan_id: String,
    pub key: String,
}

impl fmt::Debug for StickConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StickConfig")
            .field("serial_port", &self.serial_port)
            .field("channel", &self.channel)
            .field("pan_id", &self.pan_id)
            .field("key", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanOptions {
    pub auto_assign_blinds: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScannedDevice {
    pub snr: u32,
    #[serde(rename = "type")]
    pub device_type: DeviceType,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherReading {
    pub snr: u32,
    pub lumen: f64,
    pub temp: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlindPosition {
    #[serde(default)]
    pub snr: Option<u32>,
    #[serde(default = "f64_nan")]
    pub position: f64,
    #[serde(default = "f64_nan")]
    pub angle: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StickEvent {
    InitCompletion,
    WeatherBroadcast(Option<WeatherReading>),
    BlindPositionUpdate(BlindPosition),
    ScannedDevices(Vec<ScannedDevice>),
    Unrecognized { kind: String, payload: Value },
}

/// One driver callback: an optional error and an optional event.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StickNotification {
    pub error: Option<StickError>,
    pub event: Option<StickEvent>,
}

#[derive(Deserialize)]
struct WeatherPayload {
    weather: Option<WeatherReading>,
}

fn f64_nan() -> f64 {
    f64::NAN
}

/// Fields are read one by one so a bad value never hides the serial number.
fn decode_position(payload: &Value) -> BlindPosition {
    let number = |field: &str| payload.get(field).and_then(Value::as_f64).unwrap_or(f64::NAN);

    BlindPosition {
        snr: payload
            .get("snr")
            .and_then(Value::as_u64)
            .and_then(|snr| u32::try_from(snr).ok()),
        position: number("position"),
        angle: number("angle"),
    }
}

/// Keeps every descriptor that decodes, logging the ones that do not.
fn decode_scanned_devices(payload: &Value) -> Vec<ScannedDevice> {
    let Some(Value::Array(entries)) = payload.get("devices") else {
        tracing::warn!("Ignoring scan result without device list: {}", payload);
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| match serde_json::from_value::<ScannedDevice>(entry.clone()) {
            Ok(device) => Some(device),
            Err(e) => {
                tracing::warn!("Ignoring scanned device {}: {}", entry, e);
                None
            }
        })
        .collect()
}

impl StickEvent {
    pub fn kind(&self) -> &str {
        match self {
            StickEvent::InitCompletion => INIT_COMPLETION,
            StickEvent::WeatherBroadcast(_) => WEATHER_BROADCAST,
            StickEvent::BlindPositionUpdate(_) => BLIND_POSITION_UPDATE,
            StickEvent::ScannedDevices(_) => SCANNED_DEVICES,
            StickEvent::Unrecognized { kind, .. } => kind,
        }
    }

    /// Decodes a driver message given as a topic tag plus JSON payload.
    ///
    /// Known kinds with a malformed payload degrade to an empty event
    /// rather than being dropped, the dispatcher validates the content.
    pub fn from_message(kind: &str, payload: Value) -> Self {
        match kind {
            INIT_COMPLETION => StickEvent::InitCompletion,
            WEATHER_BROADCAST => StickEvent::WeatherBroadcast(
                serde_json::from_value::<WeatherPayload>(payload)
                    .ok()
                    .and_then(|payload| payload.weather),
            ),
            BLIND_POSITION_UPDATE => StickEvent::BlindPositionUpdate(decode_position(&payload)),
            SCANNED_DEVICES => StickEvent::ScannedDevices(decode_scanned_devices(&payload)),
            other => StickEvent::Unrecognized {
                kind: other.to_string(),
                payload,
            },
        }
    }
}

impl StickNotification {
    pub fn event(event: StickEvent) -> Self {
        Self { error: None, event: Some(event) }
    }

    pub fn error(error: StickError) -> Self {
        Self { error: Some(error), event: None }
    }
}

/// Operations the bridge needs from the stick driver.
///
/// Calls never block; results of scans and moves come back as events.
pub trait Stick: Send {
    fn add_device(&mut self, device_id: u32, serial: &str) -> Result<(), StickError>;

    /// Optional capability, drivers without it keep the default.
    fn remove_device(&mut self, _device_id: u32) -> Result<(), StickError> {
        Err(StickError::Unsupported("remove_device"))
    }

    fn scan_devices(&mut self, options: ScanOptions) -> Result<(), StickError>;

    fn set_position_update_interval(&mut self, interval: Duration) -> Result<(), StickError>;

    fn set_position(
        &mut self,
        device_id: u32,
        position: u8,
        angle: Option<i8>,
    ) -> Result<(), StickError>;

    fn stop(&mut self, device_id: u32) -> Result<(), StickError>;

    fn registered_devices(&self) -> Vec<String>;
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_decode_position_update() {
        let event = StickEvent::from_message(
            BLIND_POSITION_UPDATE,
            json!({ "snr": 12345, "position": 50, "angle": 10 }),
        );

        assert_eq!(
            event,
            StickEvent::BlindPositionUpdate(BlindPosition {
                snr: Some(12345),
                position: 50.0,
                angle: 10.0,
            })
        );
    }

    #[test]
    fn test_decode_position_update_without_values() {
        let StickEvent::BlindPositionUpdate(update) =
            StickEvent::from_message(BLIND_POSITION_UPDATE, json!({ "snr": 1 }))
        else {
            panic!("expected position update");
        };

        assert_eq!(update.snr, Some(1));
        assert!(update.position.is_nan());
        assert!(update.angle.is_nan());
    }

    #[test]
    fn test_decode_weather_broadcast() {
        let event = StickEvent::from_message(
            WEATHER_BROADCAST,
            json!({ "weather": { "snr": 999, "lumen": 123, "temp": 24 } }),
        );
        assert_eq!(
            event,
            StickEvent::WeatherBroadcast(Some(WeatherReading { snr: 999, lumen: 123.0, temp: 24.0 }))
        );

        let missing = StickEvent::from_message(WEATHER_BROADCAST, json!({}));
        assert_eq!(missing, StickEvent::WeatherBroadcast(None));
    }

    #[test]
    fn test_decode_scanned_devices() {
        let event = StickEvent::from_message(
            SCANNED_DEVICES,
            json!({ "devices": [{ "snr": 222, "type": 25 }, { "snr": 7, "type": 63 }] }),
        );

        assert_eq!(
            event,
            StickEvent::ScannedDevices(vec![
                ScannedDevice { snr: 222, device_type: DeviceType::VerticalAwning },
                ScannedDevice { snr: 7, device_type: DeviceType::Unknown(63) },
            ])
        );

        let malformed = StickEvent::from_message(SCANNED_DEVICES, json!({ "devices": "none" }));
        assert_eq!(malformed, StickEvent::ScannedDevices(vec![]));
    }

    #[test]
    fn test_decode_scanned_devices_keeps_valid_entries() {
        let event = StickEvent::from_message(
            SCANNED_DEVICES,
            json!({ "devices": [
                { "snr": 222, "type": 25 },
                { "snr": 7, "type": 70000 },
                { "snr": 8, "type": "awning" },
                { "type": 21 },
                { "snr": 21, "type": 21 },
            ] }),
        );

        assert_eq!(
            event,
            StickEvent::ScannedDevices(vec![
                ScannedDevice { snr: 222, device_type: DeviceType::VerticalAwning },
                ScannedDevice { snr: 21, device_type: DeviceType::ActuatorUp },
            ])
        );
    }

    #[test]
    fn test_decode_position_update_keeps_serial_with_bad_values() {
        let StickEvent::BlindPositionUpdate(update) = StickEvent::from_message(
            BLIND_POSITION_UPDATE,
            json!({ "snr": 12345, "position": "50", "angle": 10 }),
        ) else {
            panic!("expected position update");
        };

        assert_eq!(update.snr, Some(12345));
        assert!(update.position.is_nan());
        assert_eq!(update.angle, 10.0);
    }

    #[test]
    fn test_decode_unrecognized() {
        let event = StickEvent::from_message("unknown-topic", json!({ "a": 1 }));

        assert_eq!(event.kind(), "unknown-topic");
        assert!(matches!(event, StickEvent::Unrecognized { payload, .. } if payload == json!({ "a": 1 })));
        assert_eq!(StickEvent::from_message(INIT_COMPLETION, Value::Null).kind(), INIT_COMPLETION);
    }

    #[test]
    fn test_config_debug_hides_key() {
        let config = StickConfig {
            serial_port: "/dev/ttyUSB0".into(),
            channel: 17,
            pan_id: "FFFF".into(),
            key: "00112233445566778899AABBCCDDEEFF".into(),
        };

        assert!(!format!("{config:?}").contains("0011"));
    }
}
