#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StickError {
    #[error("Operation not supported by the stick: {0}")]
    Unsupported(&'static str),

    #[error("Unknown device {0}")]
    UnknownDevice(u32),

    #[error("Stick failure: {0}")]
    Failure(String),

    #[error("Stick event channel closed")]
    ChannelClosed,
}
