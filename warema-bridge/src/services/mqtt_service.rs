use std::time::Duration;

use rumqttc::{AsyncClient, Event, EventLoop, LastWill, MqttOptions, Packet, QoS};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::configs::Mqtt;
use crate::errors::BridgeError;
use crate::models::topic;

pub const RECONNECT_PERIOD: Duration = Duration::from_secs(5);
pub const CONNECT_TIMEOUT_SECS: u64 = 30;
pub const KEEP_ALIVE: Duration = Duration::from_secs(30);
pub const REQUEST_CAPACITY: usize = 256;

pub type BusSender = mpsc::UnboundedSender<BusEvent>;
pub type BusReceiver = mpsc::UnboundedReceiver<BusEvent>;

/// What the bridge needs to know from the connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusEvent {
    Connected,
    Message { topic: String, payload: Vec<u8> },
}

pub fn mqtt_options(settings: &Mqtt) -> Result<MqttOptions, BridgeError> {
    let separator = if settings.server.contains('?') { '&' } else { '?' };
    let url = format!("{}{separator}client_id={}", settings.server, settings.client_id);

    let mut options = MqttOptions::parse_url(url)
        .map_err(|e| BridgeError::InvalidServerUrl(format!("{}: {e}", settings.server)))?;

    options.set_keep_alive(KEEP_ALIVE);
    options.set_last_will(LastWill::new(topic::BRIDGE_STATE, topic::OFFLINE, QoS::AtMostOnce, true));

    if let Some(username) = &settings.username {
        options.set_credentials(username, settings.password.clone().unwrap_or_default());
    }

    Ok(options)
}

pub fn create_client(settings: &Mqtt) -> Result<(AsyncClient, EventLoop), BridgeError> {
    let options = mqtt_options(settings)?;
    let (client, mut eventloop) = AsyncClient::new(options, REQUEST_CAPACITY);

    let mut network_options = eventloop.network_options();
    network_options.set_connection_timeout(CONNECT_TIMEOUT_SECS);
    eventloop.set_network_options(network_options);

    Ok((client, eventloop))
}

/// Drives the connection and forwards connections and publishes to the bridge.
///
/// Connection errors are logged and retried after [`RECONNECT_PERIOD`]; the
/// task ends once the bridge drops its receiver.
pub fn spawn_event_loop(mut eventloop: EventLoop, sender: BusSender) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let event = match eventloop.poll().await {
                Ok(Event::Incoming(Packet::ConnAck(_))) => BusEvent::Connected,
                Ok(Event::Incoming(Packet::Publish(publish))) => BusEvent::Message {
                    topic: publish.topic,
                    payload: publish.payload.to_vec(),
                },
                Ok(_) => continue,
                Err(e) => {
                    tracing::error!("MQTT connection error: {}", e);
                    tokio::time::sleep(RECONNECT_PERIOD).await;
                    continue;
                }
            };

            if sender.send(event).is_err() {
                tracing::debug!("MQTT event loop stopped, bridge is gone");
                break;
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mqtt(server: &str) -> Mqtt {
        Mqtt {
            server: server.to_string(),
            client_id: "warema-bridge".to_string(),
            username: None,
            password: None,
        }
    }

    #[test]
    fn test_options_from_url() {
        let options = mqtt_options(&mqtt("mqtt://broker.local:1884")).unwrap();

        assert_eq!(options.broker_address(), ("broker.local".to_string(), 1884));
        assert_eq!(options.client_id(), "warema-bridge");
        assert_eq!(options.keep_alive(), KEEP_ALIVE);
    }

    #[test]
    fn test_last_will_marks_bridge_offline() {
        let options = mqtt_options(&mqtt("mqtt://localhost:1883")).unwrap();
        let will = options.last_will().unwrap();

        assert!(will.retain);
        assert_eq!(will.message.as_ref(), topic::OFFLINE.as_bytes());
    }

    #[test]
    fn test_invalid_server_url() {
        assert!(matches!(
            mqtt_options(&mqtt("not a url")),
            Err(BridgeError::InvalidServerUrl(_))
        ));
    }
}
