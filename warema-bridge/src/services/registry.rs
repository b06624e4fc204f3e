use std::collections::{BTreeMap, BTreeSet};

use crate::models::{DeviceRecord, DeviceType};

/// Devices known to the bridge and the last position reported for each.
///
/// Owned by the bridge controller and only touched from its dispatcher.
#[derive(Debug, Default)]
pub struct DeviceRegistry {
    records: BTreeMap<String, DeviceRecord>,
    /// Serials added to the stick, mirrored so they can be removed again.
    stick_registered: BTreeSet<String>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn record_mut(&mut self, serial: &str) -> &mut DeviceRecord {
        self.records
            .entry(serial.to_string())
            .or_insert_with(|| DeviceRecord::new(serial))
    }

    pub fn get(&self, serial: &str) -> Option<&DeviceRecord> {
        self.records.get(serial)
    }

    /// Marks a device as exposed without adding it to the stick.
    pub fn mark_known(&mut self, serial: &str, device_type: DeviceType) {
        let record = self.record_mut(serial);
        record.device_type = Some(device_type);
        record.registered = true;
    }

    /// Marks a device as exposed and added to the stick.
    pub fn mark_registered(&mut self, serial: &str, device_type: DeviceType) {
        self.mark_known(serial, device_type);
        self.stick_registered.insert(serial.to_string());
    }

    pub fn is_registered(&self, serial: &str) -> bool {
        self.records.get(serial).is_some_and(|record| record.registered)
    }

    /// Caches a reported position, truncated and clamped into range.
    pub fn update_position(&mut self, serial: &str, position: f64, tilt: f64) -> (u8, i8) {
        let position = position.trunc().clamp(0.0, 100.0) as u8;
        let tilt = tilt.trunc().clamp(-100.0, 100.0) as i8;

        let record = self.record_mut(serial);
        record.last_position = Some(position);
        record.last_tilt = Some(tilt);

        (position, tilt)
    }

    pub fn last_position(&self, serial: &str) -> Option<u8> {
        self.records.get(serial).and_then(|record| record.last_position)
    }

    pub fn last_tilt(&self, serial: &str) -> Option<i8> {
        self.records.get(serial).and_then(|record| record.last_tilt)
    }

    pub fn stick_registered(&self) -> impl Iterator<Item = &str> {
        self.stick_registered.iter().map(String::as_str)
    }

    /// Forgets every device and cached position, returning the serials that
    /// were added to the stick.
    pub fn reset(&mut self) -> Vec<String> {
        self.records.clear();
        std::mem::take(&mut self.stick_registered).into_iter().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
