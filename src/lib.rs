/// CAN frame value type and id word constants.
pub mod frame;
pub use frame::CanFrame;

pub mod codec;
pub mod error;
pub use error::{Error, Result};

pub mod can_driver;
pub use can_driver::{CanDriver, interface_label, open_interface};

/// Driver over a raw Linux socketcan socket.
pub mod socketcan;
pub use socketcan::SocketCanDriver;

/// Local echo driver for testing without a bus.
pub mod dummy;
pub use dummy::DummyDriver;

pub mod busload;
pub mod can_errors;
