pub mod bridge;
pub mod command;
pub mod stick;

pub use bridge::BridgeError;
pub use command::CommandError;
pub use stick::StickError;
