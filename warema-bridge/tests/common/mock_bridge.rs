use std::sync::Arc;

use warema_bridge::bridge::Bridge;
use warema_bridge::configs::{RawSettings, Settings};
use warema_bridge::stick::{BlindPosition, StickEvent, StickNotification};
use warema_bridge::tests::{RecordingPublisher, RecordingStick};

pub struct MockBridge {
    pub bridge: Bridge<RecordingStick, RecordingPublisher>,
    pub stick: RecordingStick,
    pub publisher: RecordingPublisher,
}

impl MockBridge {
    pub fn new() -> Self {
        Self::with_raw(RawSettings::default(), RecordingStick::default())
    }

    pub fn with_raw(raw: RawSettings, stick: RecordingStick) -> Self {
        let publisher = RecordingPublisher::default();
        let bridge = Bridge::new(Arc::new(Settings::from_raw(raw)), stick.clone(), publisher.clone());

        Self { bridge, stick, publisher }
    }

    pub fn with_ignored(ignored: &str) -> Self {
        Self::with_raw(
            RawSettings { ignored_devices: Some(ignored.to_string()), ..RawSettings::default() },
            RecordingStick::default(),
        )
    }

    pub fn with_forced(forced: &str) -> Self {
        Self::with_raw(
            RawSettings { force_devices: Some(forced.to_string()), ..RawSettings::default() },
            RecordingStick::default(),
        )
    }

    pub async fn event(&mut self, event: StickEvent) {
        self.bridge.handle_notification(StickNotification::event(event)).await;
    }

    pub async fn position_update(&mut self, snr: u32, position: f64, angle: f64) {
        self.event(StickEvent::BlindPositionUpdate(BlindPosition { snr: Some(snr), position, angle }))
            .await;
    }

    pub async fn message(&mut self, topic: &str, payload: &str) {
        self.bridge.handle_bus_message(topic, payload.as_bytes()).await;
    }

    /// Forgets everything recorded so far.
    pub fn reset_records(&self) {
        self.stick.clear();
        self.publisher.clear();
    }
}
