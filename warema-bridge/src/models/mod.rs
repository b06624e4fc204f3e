pub mod device;
pub mod discovery;
pub mod topic;

pub use device::{DeviceClass, DeviceRecord, DeviceType, parse_device_id};
pub use discovery::{CoverDiscovery, Discovery, SensorDiscovery, SensorKind, StationDiscovery};
