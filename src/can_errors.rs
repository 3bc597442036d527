//! Socketcan error frame classification.
//!
//! Class bits as defined in linux/can/error.h. The kernel reports bus
//! faults as frames with the error flag set and the class encoded in the
//! id word.

use thiserror::Error;

use crate::frame::CanFrame;

pub const ERR_TX_TIMEOUT: u32 = 0x0001;
pub const ERR_LOSTARB: u32 = 0x0002;
pub const ERR_CTRL: u32 = 0x0004;
pub const ERR_PROT: u32 = 0x0008;
pub const ERR_TRX: u32 = 0x0010;
pub const ERR_ACK: u32 = 0x0020;
pub const ERR_BUSOFF: u32 = 0x0040;
pub const ERR_BUSERROR: u32 = 0x0080;
pub const ERR_RESTARTED: u32 = 0x0100;

/// One fault class carried by an error frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BusError {
    #[error("TX timeout")]
    TxTimeout,
    #[error("lost arbitration")]
    LostArbitration,
    #[error("controller problem")]
    Controller,
    #[error("protocol violation")]
    Protocol,
    #[error("transceiver status")]
    Transceiver,
    #[error("no ACK on transmission")]
    NoAck,
    #[error("bus off")]
    BusOff,
    #[error("bus error")]
    Bus,
    #[error("controller restarted")]
    Restarted,
}

const CLASS_TABLE: [(u32, BusError); 9] = [
    (ERR_TX_TIMEOUT, BusError::TxTimeout),
    (ERR_LOSTARB, BusError::LostArbitration),
    (ERR_CTRL, BusError::Controller),
    (ERR_PROT, BusError::Protocol),
    (ERR_TRX, BusError::Transceiver),
    (ERR_ACK, BusError::NoAck),
    (ERR_BUSOFF, BusError::BusOff),
    (ERR_BUSERROR, BusError::Bus),
    (ERR_RESTARTED, BusError::Restarted),
];

/// Classify an error frame. `None` when the frame is not an error frame.
pub fn decode_error_frame(frame: &CanFrame) -> Option<Vec<BusError>> {
    if !frame.is_error() {
        return None;
    }
    let class = frame.id();
    Some(
        CLASS_TABLE
            .iter()
            .filter(|(bit, _)| class & bit != 0)
            .map(|&(_, kind)| kind)
            .collect(),
    )
}
