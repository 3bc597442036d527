use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

use crate::error::{Error, Result};

/// If set in the composite id word, the frame carries a 29 bit extended id.
pub const EFF_FLAG: u32 = 0x8000_0000;
/// Remote transmission request flag.
pub const RTR_FLAG: u32 = 0x4000_0000;
/// Error frame flag.
pub const ERR_FLAG: u32 = 0x2000_0000;

/// Valid bits of a 29 bit extended id.
pub const EFF_MASK: u32 = 0x1FFF_FFFF;
/// Valid bits of an 11 bit standard id.
pub const SFF_MASK: u32 = 0x0000_07FF;

/// Maximum payload length of a classic CAN frame.
pub const MAX_DLEN: usize = 8;

/// A single classic CAN frame.
///
/// Immutable once built, except for the receive timestamp which is stamped
/// by the driver that delivered the frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanFrame {
    id: u32,
    data: Vec<u8>,
    extended: bool,
    rtr: bool,
    err: bool,
    timestamp: Option<u64>,
}

impl CanFrame {
    /// Create a standard (11 bit id) frame.
    pub fn new(id: u32, data: &[u8]) -> Result<Self> {
        if id > SFF_MASK {
            return Err(Error::Format(format!(
                "standard id {:X} exceeds 11 bits",
                id
            )));
        }
        Self::build(id, data, false)
    }

    /// Create an extended (29 bit id) frame.
    pub fn new_eff(id: u32, data: &[u8]) -> Result<Self> {
        if id > EFF_MASK {
            return Err(Error::Format(format!(
                "extended id {:X} exceeds 29 bits",
                id
            )));
        }
        Self::build(id, data, true)
    }

    fn build(id: u32, data: &[u8], extended: bool) -> Result<Self> {
        if data.len() > MAX_DLEN {
            return Err(Error::Format(format!(
                "payload is {} bytes, at most {} allowed",
                data.len(),
                MAX_DLEN
            )));
        }
        Ok(CanFrame {
            id,
            data: data.to_vec(),
            extended,
            rtr: false,
            err: false,
            timestamp: None,
        })
    }

    /// Construct a frame exactly as it came off the wire, flags included.
    pub(crate) fn from_wire(id: u32, data: Vec<u8>, extended: bool, rtr: bool, err: bool) -> Self {
        CanFrame {
            id,
            data,
            extended,
            rtr,
            err,
            timestamp: None,
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Data length code, equal to the payload length for classic CAN.
    pub fn dlc(&self) -> usize {
        self.data.len()
    }

    pub fn is_extended(&self) -> bool {
        self.extended
    }

    pub fn is_rtr(&self) -> bool {
        self.rtr
    }

    pub fn is_error(&self) -> bool {
        self.err
    }

    /// Receive timestamp in microseconds since the Unix epoch, if stamped.
    pub fn timestamp(&self) -> Option<u64> {
        self.timestamp
    }

    pub fn set_timestamp(&mut self, timestamp: Option<u64>) {
        self.timestamp = timestamp;
    }
}

/// Microseconds since the Unix epoch, as stamped on received frames.
pub fn timestamp_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_micros() as u64)
        .unwrap_or(0)
}
