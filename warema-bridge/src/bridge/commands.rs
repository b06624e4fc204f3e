use crate::bridge::Bridge;
use crate::errors::BridgeError;
use crate::models::topic;
use crate::services::{DeviceCommand, Publisher, StickOperation, parse_command};
use crate::stick::Stick;

impl<S: Stick, P: Publisher> Bridge<S, P> {
    /// Routes one inbound bus message. Invalid commands are logged and
    /// dropped.
    pub async fn handle_bus_message(&mut self, topic: &str, payload: &[u8]) {
        let scope = topic.split('/').next().unwrap_or_default();

        if scope == topic::SCOPE {
            match parse_command(topic, payload) {
                Ok(Some(command)) => {
                    if let Err(e) = self.execute(command) {
                        tracing::warn!("Failed to execute command on {}: {}", topic, e);
                    }
                }
                Ok(None) => {}
                Err(e) => tracing::warn!("{}", e),
            }
            return;
        }

        if topic == topic::HOME_ASSISTANT_STATUS && payload == topic::ONLINE.as_bytes() {
            if let Err(e) = self.handle_home_assistant_online().await {
                tracing::warn!("Failed to re-register devices: {}", e);
            }
        }
    }

    fn execute(&mut self, command: DeviceCommand) -> Result<(), BridgeError> {
        let operation = match command.resolve(&self.registry) {
            Ok(operation) => operation,
            Err(e) => {
                tracing::warn!("{}", e);
                return Ok(());
            }
        };

        tracing::debug!("Executing {:?} for {}", operation, command.serial);

        match operation {
            StickOperation::SetPosition { device_id, position, angle } => {
                self.stick.set_position(device_id, position, angle)?
            }
            StickOperation::Stop { device_id } => self.stick.stop(device_id)?,
        }

        Ok(())
    }
}
