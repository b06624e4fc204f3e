use crate::errors::StickError;

#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid MQTT server url: {0}")]
    InvalidServerUrl(String),

    #[error("MQTT client error: {0}")]
    Client(#[from] rumqttc::ClientError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Stick error: {0}")]
    Stick(#[from] StickError),

    #[error("{0} channel closed")]
    ChannelClosed(&'static str),
}
