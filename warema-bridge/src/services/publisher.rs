use async_trait::async_trait;
use rumqttc::{AsyncClient, QoS};

use crate::errors::BridgeError;
use crate::models::topic;

/// Outbound side of the bus as seen by the bridge.
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, topic: &str, payload: String, retain: bool) -> Result<(), BridgeError>;

    async fn subscribe(&self, topic: &str) -> Result<(), BridgeError>;
}

#[async_trait]
impl Publisher for AsyncClient {
    async fn publish(&self, topic: &str, payload: String, retain: bool) -> Result<(), BridgeError> {
        AsyncClient::publish(self, topic, QoS::AtMostOnce, retain, payload).await?;

        tracing::trace!("Published to {} (retain: {})", topic, retain);

        Ok(())
    }

    async fn subscribe(&self, topic: &str) -> Result<(), BridgeError> {
        AsyncClient::subscribe(self, topic, QoS::AtMostOnce).await?;

        tracing::debug!("Subscribed to {}", topic);

        Ok(())
    }
}

/// Marks the bridge online and subscribes to its inbound topics.
/// Runs on every (re)connection.
pub async fn announce<P: Publisher + ?Sized>(publisher: &P) -> Result<(), BridgeError> {
    publisher.publish(topic::BRIDGE_STATE, topic::ONLINE.to_string(), true).await?;
    publisher.subscribe(topic::WAREMA_WILDCARD).await?;
    publisher.subscribe(topic::HOME_ASSISTANT_STATUS).await?;

    Ok(())
}
