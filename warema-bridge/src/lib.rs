use std::sync::Arc;

use tokio::sync::mpsc;

use crate::bridge::Bridge;
use crate::configs::Settings;
use crate::errors::BridgeError;
use crate::services::{BusEvent, announce, mqtt_service};
use crate::stick::SimulatedStick;

pub mod bridge;
pub mod configs;
pub mod errors;
pub mod models;
pub mod services;
pub mod stick;


/// Connects to the broker, opens the stick on the first connection and runs
/// the bridge until one of its inputs closes.
pub async fn run(settings: Arc<Settings>) -> Result<(), BridgeError> {
    let (client, eventloop) = mqtt_service::create_client(&settings.mqtt)?;
    let (bus_sender, mut bus) = mpsc::unbounded_channel();
    let connection = mqtt_service::spawn_event_loop(eventloop, bus_sender);

    loop {
        match bus.recv().await {
            Some(BusEvent::Connected) => break,
            Some(BusEvent::Message { .. }) => continue,
            None => return Err(BridgeError::ChannelClosed("MQTT")),
        }
    }

    tracing::info!("Connected to MQTT (log level: {})", settings.logger.level);
    announce(&client).await?;

    let (stick_sender, stick_events) = mpsc::unbounded_channel();
    let stick = SimulatedStick::start(
        settings.stick_config(),
        settings.devices.simulated.clone(),
        stick_sender,
    )?;

    let result = Bridge::new(settings, stick, client).run(bus, stick_events).await;
    connection.abort();

    result
}
