//! The bridge controller.
//!
//! A single dispatcher owns the registry, the stick and the publisher, and
//! handles bus messages and stick notifications strictly one at a time.

use std::sync::Arc;

use crate::configs::Settings;
use crate::errors::{BridgeError, StickError};
use crate::models::{Discovery, DeviceType, parse_device_id, topic};
use crate::services::{BusEvent, BusReceiver, DeviceRegistry, Publisher, announce};
use crate::stick::{ScanOptions, Stick, StickReceiver};

mod commands;
mod events;

pub struct Bridge<S, P> {
    settings: Arc<Settings>,
    registry: DeviceRegistry,
    stick: S,
    publisher: P,
}

impl<S: Stick, P: Publisher> Bridge<S, P> {
    pub fn new(settings: Arc<Settings>, stick: S, publisher: P) -> Self {
        Self {
            settings,
            registry: DeviceRegistry::new(),
            stick,
            publisher,
        }
    }

    pub fn registry(&self) -> &DeviceRegistry {
        &self.registry
    }

    pub fn stick(&self) -> &S {
        &self.stick
    }

    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    /// Exposes one device to Home Assistant and, unless ignored, adds it to
    /// the stick.
    pub async fn register_device(&mut self, serial: &str, device_type: DeviceType) -> Result<(), BridgeError> {
        tracing::debug!("Registering {}", serial);

        let Some(discovery) = Discovery::build(serial, device_type) else {
            return Ok(());
        };

        if self.settings.devices.ignored.contains(serial) {
            tracing::info!("Ignoring and removing device {} (type {})", serial, device_type.code());
        } else {
            let Some(device_id) = parse_device_id(serial) else {
                tracing::warn!("Skipping device with non numeric serial number {}", serial);
                return Ok(());
            };

            tracing::info!("Adding device {} (type {})", serial, device_type.code());

            self.stick.add_device(device_id, serial)?;
            self.registry.mark_registered(serial, device_type);
            self.publisher
                .publish(&topic::availability(serial), topic::ONLINE.to_string(), true)
                .await?;
        }

        self.publisher
            .publish(&discovery.config_topic(), discovery.to_json()?, true)
            .await
    }

    /// Registers the forced devices, or asks the stick for a scan when none
    /// are configured.
    pub async fn register_devices(&mut self) -> Result<(), BridgeError> {
        let settings = Arc::clone(&self.settings);

        if !settings.devices.forced.is_empty() {
            for serial in &settings.devices.forced {
                if let Err(e) = self.register_device(serial, DeviceType::VerticalAwning).await {
                    tracing::warn!("Failed to register forced device {}: {}", serial, e);
                }
            }
            return Ok(());
        }

        tracing::info!("Scanning...");
        self.stick.scan_devices(ScanOptions { auto_assign_blinds: false })?;

        Ok(())
    }

    /// Home Assistant restarted and lost its discovery state: forget every
    /// device and teach them again.
    pub async fn handle_home_assistant_online(&mut self) -> Result<(), BridgeError> {
        tracing::info!("Home Assistant is online. Resetting registrations and re-publishing discovery.");

        for serial in self.registry.reset() {
            let Some(device_id) = parse_device_id(&serial) else {
                continue;
            };

            match self.stick.remove_device(device_id) {
                Ok(()) => {}
                Err(StickError::Unsupported(operation)) => {
                    tracing::debug!("Stick does not support {}, keeping its device list", operation);
                    break;
                }
                Err(e) => tracing::warn!("Failed to remove device {}: {}", serial, e),
            }
        }

        self.register_devices().await
    }

    /// Dispatches bus events and stick notifications until either source
    /// closes.
    pub async fn run(mut self, mut bus: BusReceiver, mut stick_events: StickReceiver) -> Result<(), BridgeError> {
        loop {
            tokio::select! {
                event = bus.recv() => match event {
                    Some(BusEvent::Connected) => {
                        tracing::info!("Reconnected to MQTT");
                        if let Err(e) = announce(&self.publisher).await {
                            tracing::error!("Failed to announce bridge: {}", e);
                        }
                    }
                    Some(BusEvent::Message { topic, payload }) => {
                        self.handle_bus_message(&topic, &payload).await;
                    }
                    None => return Err(BridgeError::ChannelClosed("MQTT")),
                },
                notification = stick_events.recv() => match notification {
                    Some(notification) => self.handle_notification(notification).await,
                    None => return Err(BridgeError::ChannelClosed("Stick")),
                },
            }
        }
    }
}
