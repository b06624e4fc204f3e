use serde::{Deserialize, Serialize};

pub const MANUFACTURER: &str = "Warema";

/// Device types reported by the stick during a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u16", into = "u16")]
pub enum DeviceType {
    WeatherStation,
    WebControlPro,
    PlugReceiver,
    ActuatorUp,
    VerticalAwning,
    Unknown(u16),
}

/// What a device type is exposed as on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceClass {
    Sensor { model: &'static str },
    Shading { model: &'static str, tilt: bool },
    Unsupported,
    Unrecognized(u16),
}

impl DeviceType {
    pub fn code(self) -> u16 {
        match self {
            DeviceType::WeatherStation => 6,
            DeviceType::WebControlPro => 9,
            DeviceType::PlugReceiver => 20,
            DeviceType::ActuatorUp => 21,
            DeviceType::VerticalAwning => 25,
            DeviceType::Unknown(code) => code,
        }
    }

    pub fn class(self) -> DeviceClass {
        match self {
            DeviceType::WeatherStation => DeviceClass::Sensor { model: "Weather station" },
            DeviceType::WebControlPro => DeviceClass::Unsupported,
            DeviceType::PlugReceiver => DeviceClass::Shading { model: "Plug receiver", tilt: true },
            DeviceType::ActuatorUp => DeviceClass::Shading { model: "Actuator UP", tilt: true },
            DeviceType::VerticalAwning => DeviceClass::Shading { model: "Vertical awning", tilt: false },
            DeviceType::Unknown(code) => DeviceClass::Unrecognized(code),
        }
    }
}

impl From<u16> for DeviceType {
    fn from(code: u16) -> Self {
        match code {
            6 => DeviceType::WeatherStation,
            9 => DeviceType::WebControlPro,
            20 => DeviceType::PlugReceiver,
            21 => DeviceType::ActuatorUp,
            25 => DeviceType::VerticalAwning,
            other => DeviceType::Unknown(other),
        }
    }
}

impl From<DeviceType> for u16 {
    fn from(device_type: DeviceType) -> Self {
        device_type.code()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceRecord {
    pub serial: String,
    pub device_type: Option<DeviceType>,
    pub registered: bool,
    /// Last reported position, `0..=100`.
    pub last_position: Option<u8>,
    /// Last reported tilt angle, `-100..=100`.
    pub last_tilt: Option<i8>,
}

impl DeviceRecord {
    pub fn new(serial: &str) -> Self {
        Self {
            serial: serial.to_string(),
            device_type: None,
            registered: false,
            last_position: None,
            last_tilt: None,
        }
    }
}

/// Numeric stick id for a serial number string, `None` when the serial is not an integer.
pub fn parse_device_id(serial: &str) -> Option<u32> {
    serial.trim().parse().ok()
}
