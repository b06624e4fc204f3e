pub mod command_service;
pub mod mqtt_service;
pub mod publisher;
pub mod registry;

pub use command_service::{BlindCommand, DeviceCommand, StickOperation, parse_command};
pub use mqtt_service::{BusEvent, BusReceiver, BusSender};
pub use publisher::{Publisher, announce};
pub use registry::DeviceRegistry;
