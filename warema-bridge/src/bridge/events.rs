use std::time::Duration;

use serde_json::Value;

use crate::bridge::Bridge;
use crate::errors::BridgeError;
use crate::models::{DeviceType, SensorDiscovery, SensorKind, topic};
use crate::services::Publisher;
use crate::stick::{BlindPosition, ScannedDevice, Stick, StickEvent, StickNotification, WeatherReading};

pub const POSITION_UPDATE_INTERVAL: Duration = Duration::from_millis(30_000);

impl<S: Stick, P: Publisher> Bridge<S, P> {
    /// Handles one driver callback. An error is logged and does not stop an
    /// accompanying event from being processed.
    pub async fn handle_notification(&mut self, notification: StickNotification) {
        if let Some(e) = notification.error {
            tracing::error!("WMS callback error: {}", e);
        }

        let Some(event) = notification.event else {
            return;
        };

        let kind = event.kind().to_string();
        if let Err(e) = self.handle_event(event).await {
            tracing::warn!("Failed to handle {}: {}", kind, e);
        }
    }

    pub async fn handle_event(&mut self, event: StickEvent) -> Result<(), BridgeError> {
        match event {
            StickEvent::InitCompletion => {
                tracing::info!("Warema init completed");
                self.register_devices().await?;
                self.stick.set_position_update_interval(POSITION_UPDATE_INTERVAL)?;
                Ok(())
            }
            StickEvent::WeatherBroadcast(Some(reading)) => self.handle_weather_broadcast(reading).await,
            StickEvent::WeatherBroadcast(None) => {
                tracing::debug!("Ignoring weather broadcast without reading");
                Ok(())
            }
            StickEvent::BlindPositionUpdate(update) => self.handle_position_update(update).await,
            StickEvent::ScannedDevices(devices) => {
                self.handle_scanned_devices(devices).await;
                Ok(())
            }
            StickEvent::Unrecognized { kind, payload } => {
                tracing::warn!("UNKNOWN MESSAGE: {}", unrecognized_message(&kind, payload));
                Ok(())
            }
        }
    }

    async fn handle_weather_broadcast(&mut self, reading: WeatherReading) -> Result<(), BridgeError> {
        let serial = reading.snr.to_string();

        if self.registry.is_registered(&serial) {
            self.publisher
                .publish(
                    &topic::sensor_state(&serial, SensorKind::Illuminance.as_str()),
                    reading.lumen.to_string(),
                    false,
                )
                .await?;
            return self
                .publisher
                .publish(
                    &topic::sensor_state(&serial, SensorKind::Temperature.as_str()),
                    reading.temp.to_string(),
                    false,
                )
                .await;
        }

        tracing::info!("Discovered weather station {}", serial);

        for kind in SensorKind::ALL {
            let discovery = SensorDiscovery::new(&serial, kind);
            self.publisher
                .publish(&discovery.config_topic(), discovery.to_json()?, true)
                .await?;
        }
        self.publisher
            .publish(&topic::availability(&serial), topic::ONLINE.to_string(), true)
            .await?;
        self.registry.mark_known(&serial, DeviceType::WeatherStation);

        Ok(())
    }

    async fn handle_position_update(&mut self, update: BlindPosition) -> Result<(), BridgeError> {
        let Some(snr) = update.snr else {
            tracing::warn!("Ignoring blind update without serial number");
            return Ok(());
        };

        if !update.position.is_finite() || !update.angle.is_finite() {
            tracing::warn!("Ignoring blind update with invalid values for {}", snr);
            return Ok(());
        }

        let serial = snr.to_string();
        self.publisher
            .publish(&topic::position(&serial), update.position.to_string(), false)
            .await?;
        self.publisher
            .publish(&topic::tilt(&serial), update.angle.to_string(), false)
            .await?;
        self.registry.update_position(&serial, update.position, update.angle);

        Ok(())
    }

    async fn handle_scanned_devices(&mut self, devices: Vec<ScannedDevice>) {
        tracing::info!("Scanned devices.");

        for device in devices {
            let serial = device.snr.to_string();
            if let Err(e) = self.register_device(&serial, device.device_type).await {
                tracing::warn!("Failed to register device {}: {}", serial, e);
            }
        }

        let registered = self.stick.registered_devices();
        tracing::debug!("Registered blind list: {:?}", registered);
    }
}

fn unrecognized_message(kind: &str, payload: Value) -> Value {
    serde_json::json!({ "topic": kind, "payload": payload })
}
