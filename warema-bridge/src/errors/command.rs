/// Reasons an inbound bus command is dropped before reaching the stick.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("invalid serial number in topic \"{topic}\"")]
    InvalidSerial { topic: String },

    #[error("oversized payload ({size} bytes) on {topic}")]
    PayloadTooLarge { topic: String, size: usize },

    #[error("invalid position payload for {serial}: {payload}")]
    InvalidPosition { serial: String, payload: String },

    #[error("invalid tilt payload for {serial}: {payload}")]
    InvalidTilt { serial: String, payload: String },

    #[error("unknown set action for {serial}: {payload}")]
    UnknownAction { serial: String, payload: String },

    #[error("no known tilt for {serial}, waiting for a position update")]
    MissingAngle { serial: String },

    #[error("no known position for {serial}, waiting for a position update")]
    MissingPosition { serial: String },
}
