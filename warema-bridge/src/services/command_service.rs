//! Translation of `warema/<serial>/<command>` messages into stick operations.

use crate::errors::CommandError;
use crate::models::{parse_device_id, topic};
use crate::services::registry::DeviceRegistry;

/// Payloads longer than this are dropped unread.
pub const PAYLOAD_LIMIT: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlindCommand {
    Open,
    Close,
    Stop,
    SetPosition(u8),
    SetTilt(i8),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceCommand {
    pub serial: String,
    pub device_id: u32,
    pub command: BlindCommand,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StickOperation {
    SetPosition {
        device_id: u32,
        position: u8,
        angle: Option<i8>,
    },
    Stop {
        device_id: u32,
    },
}

/// Parses a message received below `warema/`.
///
/// `Ok(None)` means the topic is not a command, e.g. the bridge state or the
/// bridge's own position echoes.
pub fn parse_command(topic: &str, payload: &[u8]) -> Result<Option<DeviceCommand>, CommandError> {
    if topic == topic::BRIDGE_STATE {
        return Ok(None);
    }

    let mut segments = topic.split('/').skip(1);
    let serial = segments.next().unwrap_or_default();
    let verb = segments.next();

    let device_id = parse_device_id(serial).ok_or_else(|| CommandError::InvalidSerial {
        topic: topic.to_string(),
    })?;

    let verb = match verb {
        Some(verb @ ("set" | "set_position" | "set_tilt")) if segments.next().is_none() => verb,
        _ => return Ok(None),
    };

    let message = String::from_utf8_lossy(payload).trim().to_uppercase();
    if message.len() > PAYLOAD_LIMIT {
        return Err(CommandError::PayloadTooLarge {
            topic: topic.to_string(),
            size: message.len(),
        });
    }

    let command = match verb {
        "set" => match message.as_str() {
            "OPEN" => BlindCommand::Open,
            "CLOSE" => BlindCommand::Close,
            "STOP" => BlindCommand::Stop,
            _ => {
                return Err(CommandError::UnknownAction {
                    serial: serial.to_string(),
                    payload: message,
                });
            }
        },
        "set_position" => match parse_in_range(&message, 0, 100) {
            Some(position) => BlindCommand::SetPosition(position as u8),
            None => {
                return Err(CommandError::InvalidPosition {
                    serial: serial.to_string(),
                    payload: message,
                });
            }
        },
        _ => match parse_in_range(&message, -100, 100) {
            Some(angle) => BlindCommand::SetTilt(angle as i8),
            None => {
                return Err(CommandError::InvalidTilt {
                    serial: serial.to_string(),
                    payload: message,
                });
            }
        },
    };

    Ok(Some(DeviceCommand {
        serial: serial.to_string(),
        device_id,
        command,
    }))
}

fn parse_in_range(value: &str, min: i32, max: i32) -> Option<i32> {
    value.parse::<i32>().ok().filter(|value| (min..=max).contains(value))
}

impl DeviceCommand {
    /// Completes partial moves with the last position reported for the device.
    pub fn resolve(&self, registry: &DeviceRegistry) -> Result<StickOperation, CommandError> {
        let device_id = self.device_id;

        Ok(match self.command {
            BlindCommand::Open => StickOperation::SetPosition { device_id, position: 0, angle: None },
            BlindCommand::Close => StickOperation::SetPosition { device_id, position: 100, angle: None },
            BlindCommand::Stop => StickOperation::Stop { device_id },
            BlindCommand::SetPosition(position) => {
                let angle = registry.last_tilt(&self.serial).ok_or_else(|| {
                    CommandError::MissingAngle { serial: self.serial.clone() }
                })?;

                StickOperation::SetPosition { device_id, position, angle: Some(angle) }
            }
            BlindCommand::SetTilt(angle) => {
                let position = registry.last_position(&self.serial).ok_or_else(|| {
                    CommandError::MissingPosition { serial: self.serial.clone() }
                })?;

                StickOperation::SetPosition { device_id, position, angle: Some(angle) }
            }
        })
    }
}
