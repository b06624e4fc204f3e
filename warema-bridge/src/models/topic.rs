//! Bus topic layout shared by the command and event paths.

pub const SCOPE: &str = "warema";
pub const BRIDGE_STATE: &str = "warema/bridge/state";
pub const WAREMA_WILDCARD: &str = "warema/#";
pub const HOME_ASSISTANT_STATUS: &str = "homeassistant/status";

pub const ONLINE: &str = "online";
pub const OFFLINE: &str = "offline";

pub fn availability(serial: &str) -> String {
    format!("{SCOPE}/{serial}/availability")
}

pub fn position(serial: &str) -> String {
    format!("{SCOPE}/{serial}/position")
}

pub fn tilt(serial: &str) -> String {
    format!("{SCOPE}/{serial}/tilt")
}

pub fn command(serial: &str) -> String {
    format!("{SCOPE}/{serial}/set")
}

pub fn set_position(serial: &str) -> String {
    format!("{SCOPE}/{serial}/set_position")
}

pub fn set_tilt(serial: &str) -> String {
    format!("{SCOPE}/{serial}/set_tilt")
}

/// `warema/<serial>/<kind>/state`
pub fn sensor_state(serial: &str, kind: &str) -> String {
    format!("{SCOPE}/{serial}/{kind}/state")
}

pub fn cover_config(serial: &str) -> String {
    format!("homeassistant/cover/{serial}/{serial}/config")
}

pub fn sensor_config(serial: &str, kind: &str) -> String {
    format!("homeassistant/sensor/{serial}/{kind}/config")
}
