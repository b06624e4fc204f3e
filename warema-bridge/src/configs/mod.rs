pub mod resolve;
pub mod settings;

pub use settings::{Devices, Logger, Mqtt, RawSettings, Settings, Wms};
