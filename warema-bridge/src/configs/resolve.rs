//! Validation of the radio network parameters and device lists.
//!
//! Every resolver degrades to a safe default and logs a warning instead of
//! failing, so a misconfigured add-on still starts.

use std::collections::BTreeSet;

use crate::models::DeviceType;
use crate::stick::ScannedDevice;

pub const DEFAULT_CHANNEL: u8 = 17;
pub const MAX_CHANNEL: u8 = 26;
pub const DEFAULT_PAN_ID: &str = "FFFF";
pub const DEFAULT_KEY: &str = "00112233445566778899AABBCCDDEEFF";
pub const DEFAULT_LOG_LEVEL: &str = "info";

pub fn resolve_channel(raw: &str) -> u8 {
    match raw.trim().parse::<u8>() {
        Ok(channel) if channel <= MAX_CHANNEL => channel,
        _ => {
            tracing::warn!(
                "Invalid WMS channel \"{}\". Falling back to channel {}.",
                raw,
                DEFAULT_CHANNEL
            );
            DEFAULT_CHANNEL
        }
    }
}

pub fn resolve_pan_id(raw: &str) -> String {
    let pan_id = raw.trim().to_uppercase();

    if is_hex(&pan_id, 4) {
        pan_id
    } else {
        tracing::warn!("Invalid WMS PAN ID \"{}\". Falling back to {}.", raw, DEFAULT_PAN_ID);
        DEFAULT_PAN_ID.to_string()
    }
}

pub fn resolve_key(raw: &str) -> String {
    let key = raw.trim().to_uppercase();

    let key = if is_hex(&key, 32) {
        key
    } else {
        tracing::warn!("WMS key has invalid format. Falling back to default key.");
        DEFAULT_KEY.to_string()
    };

    if key == DEFAULT_KEY {
        tracing::warn!("Using default WMS key. Configure wms_key to harden your setup.");
    }

    key
}

/// Maps the add-on log level vocabulary onto tracing levels.
pub fn resolve_log_level(raw: Option<&str>) -> &'static str {
    match raw.map(|level| level.trim().to_lowercase()).as_deref() {
        Some("trace") => "trace",
        Some("debug") => "debug",
        Some("info") | Some("notice") => "info",
        Some("warning") | Some("warn") => "warn",
        Some("error") | Some("fatal") => "error",
        _ => DEFAULT_LOG_LEVEL,
    }
}

/// Comma separated serial numbers, trimmed, empties dropped, order kept.
pub fn parse_serial_list(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|serial| !serial.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn parse_serial_set(raw: Option<&str>) -> BTreeSet<String> {
    parse_serial_list(raw).into_iter().collect()
}

/// `serial:type` pairs describing the devices a simulated stick reports.
pub fn parse_simulated_devices(raw: Option<&str>) -> Vec<ScannedDevice> {
    parse_serial_list(raw)
        .iter()
        .filter_map(|entry| {
            let parsed = entry.split_once(':').and_then(|(serial, code)| {
                Some(ScannedDevice {
                    snr: serial.trim().parse().ok()?,
                    device_type: DeviceType::from(code.trim().parse::<u16>().ok()?),
                })
            });

            if parsed.is_none() {
                tracing::warn!("Ignoring invalid simulated device \"{}\"", entry);
            }

            parsed
        })
        .collect()
}

fn is_hex(value: &str, len: usize) -> bool {
    value.len() == len && value.chars().all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_channel() {
        assert_eq!(resolve_channel("0"), 0);
        assert_eq!(resolve_channel("26"), 26);
        assert_eq!(resolve_channel(" 11 "), 11);

        for raw in ["27", "99", "-1", "abc", "", "17.5"] {
            assert_eq!(resolve_channel(raw), DEFAULT_CHANNEL, "channel {raw:?}");
        }
    }

    #[test]
    fn test_resolve_pan_id() {
        assert_eq!(resolve_pan_id("abcd"), "ABCD");
        assert_eq!(resolve_pan_id(" 12Ef "), "12EF");

        for raw in ["bad-pan", "ABC", "ABCDE", "GHIJ", ""] {
            assert_eq!(resolve_pan_id(raw), DEFAULT_PAN_ID, "pan id {raw:?}");
        }
    }

    #[test]
    fn test_resolve_key() {
        let key = "0123456789abcdef0123456789abcdef";
        assert_eq!(resolve_key(key), key.to_uppercase());

        for raw in ["bad-key", "", "0123456789ABCDEF", "Z123456789ABCDEF0123456789ABCDEF"] {
            assert_eq!(resolve_key(raw), DEFAULT_KEY, "key {raw:?}");
        }
        assert_eq!(resolve_key(DEFAULT_KEY), DEFAULT_KEY);
    }

    #[test]
    fn test_resolve_log_level() {
        assert_eq!(resolve_log_level(None), "info");
        assert_eq!(resolve_log_level(Some("DEBUG")), "debug");
        assert_eq!(resolve_log_level(Some("notice")), "info");
        assert_eq!(resolve_log_level(Some("warning")), "warn");
        assert_eq!(resolve_log_level(Some("fatal")), "error");
        assert_eq!(resolve_log_level(Some("verbose")), "info");
    }

    #[test]
    fn test_parse_serial_list() {
        assert_eq!(parse_serial_list(Some(" 111, ,222,")), vec!["111", "222"]);
        assert!(parse_serial_list(Some("")).is_empty());
        assert!(parse_serial_list(None).is_empty());
        assert!(parse_serial_set(Some("1,1,2")).len() == 2);
    }

    #[test]
    fn test_parse_simulated_devices() {
        let devices = parse_simulated_devices(Some("12345:21, 999:6, broken, x:25"));

        assert_eq!(
            devices,
            vec![
                ScannedDevice { snr: 12345, device_type: DeviceType::ActuatorUp },
                ScannedDevice { snr: 999, device_type: DeviceType::WeatherStation },
            ]
        );
    }
}
