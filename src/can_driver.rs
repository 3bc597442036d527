use async_trait::async_trait;

use crate::dummy::DummyDriver;
use crate::error::{Error, Result};
use crate::frame::CanFrame;
use crate::socketcan::SocketCanDriver;

/// A bidirectional CAN channel.
///
/// `read_frame` blocks until traffic arrives; calling it repeatedly yields
/// the infinite stream of frames seen on the bus. Both operations fail with
/// [`Error::Io`] once the channel has been closed.
#[async_trait]
pub trait CanDriver: Send + Sync {
    async fn send_frame(&mut self, frame: &CanFrame) -> Result<()>;

    async fn read_frame(&mut self) -> Result<CanFrame>;

    /// Release the underlying resource. Idempotent.
    async fn close_channel(&mut self) -> Result<()>;
}

/// Resolve an interface spec to a driver.
///
/// Accepted forms: `socketcan:<ifname>`, a bare `<ifname>` (socketcan
/// shorthand), or `dummy` for the local echo driver.
pub fn open_interface(spec: &str) -> Result<Box<dyn CanDriver>> {
    match spec.split_once(':') {
        Some(("socketcan", ifname)) => Ok(Box::new(SocketCanDriver::open(ifname)?)),
        Some(("dummy", _)) => Ok(Box::new(DummyDriver::new())),
        Some((scheme, _)) => Err(Error::Format(format!(
            "unknown interface scheme '{}'",
            scheme
        ))),
        None if spec == "dummy" => Ok(Box::new(DummyDriver::new())),
        None => Ok(Box::new(SocketCanDriver::open(spec)?)),
    }
}

/// Interface name as shown in tool output, without the scheme prefix.
pub fn interface_label(spec: &str) -> &str {
    match spec.split_once(':') {
        Some((_, name)) if !name.is_empty() => name,
        _ => spec,
    }
}
