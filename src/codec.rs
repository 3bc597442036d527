//! Hex and socketcan wire codecs for CAN frames.

use crate::error::{Error, Result};
use crate::frame::{CanFrame, EFF_FLAG, EFF_MASK, ERR_FLAG, MAX_DLEN, RTR_FLAG, SFF_MASK};

/// Size of a classic CAN frame on the socketcan wire (struct can_frame).
pub const WIRE_LEN: usize = 16;

/// Map each payload byte to two uppercase hex characters.
pub fn encode_hex(payload: &[u8]) -> String {
    payload.iter().map(|b| format!("{:02X}", b)).collect()
}

/// Inverse of [`encode_hex`]. Rejects odd-length input and non-hex characters.
pub fn decode_hex(s: &str) -> Result<Vec<u8>> {
    if s.len() % 2 != 0 {
        return Err(Error::Format(format!(
            "hex payload '{}' has odd length",
            s
        )));
    }
    (0..s.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&s[i..i + 2], 16)
                .map_err(|_| Error::Format(format!("invalid hex payload '{}'", s)))
        })
        .collect()
}

/// Parse a hex identifier, with or without a leading 0x.
pub fn parse_id(s: &str) -> Result<u32> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    u32::from_str_radix(digits, 16)
        .map_err(|_| Error::Format(format!("invalid frame id '{}'", s)))
}

/// Build a frame, picking the id width from the id value.
///
/// Ids above the 11 bit range become extended frames, matching cansend.
pub fn build_frame(id: u32, data: &[u8]) -> Result<CanFrame> {
    if id > SFF_MASK {
        CanFrame::new_eff(id, data)
    } else {
        CanFrame::new(id, data)
    }
}

/// Parse a frame from its command line form: hex id plus hex payload.
pub fn parse_frame(id_str: &str, data_str: &str) -> Result<CanFrame> {
    let id = parse_id(id_str)?;
    let data = decode_hex(data_str)?;
    build_frame(id, &data)
}

/// Encode a frame into the 16 byte socketcan wire layout: native-endian
/// composite id word, dlc, 3 pad bytes, 8 data bytes.
pub fn encode_wire(frame: &CanFrame) -> [u8; WIRE_LEN] {
    let mut id_word = frame.id();
    if frame.is_extended() {
        id_word |= EFF_FLAG;
    }
    if frame.is_rtr() {
        id_word |= RTR_FLAG;
    }
    if frame.is_error() {
        id_word |= ERR_FLAG;
    }

    let mut buf = [0u8; WIRE_LEN];
    buf[0..4].copy_from_slice(&id_word.to_ne_bytes());
    buf[4] = frame.dlc() as u8;
    buf[8..8 + frame.dlc()].copy_from_slice(frame.data());
    buf
}

/// Decode one socketcan wire frame. The buffer must hold a full frame.
pub fn decode_wire(buf: &[u8]) -> Result<CanFrame> {
    if buf.len() < WIRE_LEN {
        return Err(Error::Format(format!(
            "wire frame is {} bytes, expected {}",
            buf.len(),
            WIRE_LEN
        )));
    }

    let id_word = u32::from_ne_bytes([buf[0], buf[1], buf[2], buf[3]]);
    let extended = id_word & EFF_FLAG != 0;
    let rtr = id_word & RTR_FLAG != 0;
    let err = id_word & ERR_FLAG != 0;
    let id = id_word & if extended { EFF_MASK } else { SFF_MASK };

    let dlc = (buf[4] as usize).min(MAX_DLEN);
    let data = buf[8..8 + dlc].to_vec();

    Ok(CanFrame::from_wire(id, data, extended, rtr, err))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_round_trip() {
        let payload = [0xDE, 0xAD, 0xBE, 0xEF, 0x00, 0x7F];
        assert_eq!(encode_hex(&payload), "DEADBEEF007F");
        assert_eq!(decode_hex("DEADBEEF007F").unwrap(), payload);
        // lowercase input decodes too
        assert_eq!(decode_hex("deadbeef007f").unwrap(), payload);
    }

    #[test]
    fn hex_rejects_odd_length() {
        assert!(matches!(decode_hex("ABC"), Err(Error::Format(_))));
    }

    #[test]
    fn hex_rejects_non_hex() {
        assert!(matches!(decode_hex("ZZ"), Err(Error::Format(_))));
    }

    #[test]
    fn empty_payload_is_valid() {
        assert_eq!(decode_hex("").unwrap(), Vec::<u8>::new());
        assert_eq!(encode_hex(&[]), "");
    }

    #[test]
    fn parse_frame_standard() {
        let frame = parse_frame("88", "DEADBEEF").unwrap();
        assert_eq!(frame.id(), 0x88);
        assert_eq!(frame.data(), &[0xDE, 0xAD, 0xBE, 0xEF]);
        assert!(!frame.is_extended());
    }

    #[test]
    fn parse_frame_extended_by_id_width() {
        let frame = parse_frame("1ABCDEFC", "11AA22").unwrap();
        assert_eq!(frame.id(), 0x1ABC_DEFC);
        assert!(frame.is_extended());
    }

    #[test]
    fn parse_frame_accepts_0x_prefix() {
        let frame = parse_frame("0x539", "").unwrap();
        assert_eq!(frame.id(), 1337);
    }

    #[test]
    fn parse_frame_rejects_long_payload() {
        assert!(matches!(
            parse_frame("123", "001122334455667788"),
            Err(Error::Format(_))
        ));
    }

    #[test]
    fn parse_frame_rejects_bad_id() {
        assert!(matches!(parse_frame("12G", "00"), Err(Error::Format(_))));
        assert!(matches!(
            parse_frame("20000000", "00"),
            Err(Error::Format(_))
        ));
    }

    #[test]
    fn wire_round_trip_standard() {
        let frame = CanFrame::new(0x123, &[1, 2, 3, 4]).unwrap();
        let decoded = decode_wire(&encode_wire(&frame)).unwrap();
        assert_eq!(decoded, frame);
    }

    #[test]
    fn wire_round_trip_extended() {
        let frame = CanFrame::new_eff(0x1FFF_FFFF, &[0xFF; 8]).unwrap();
        let decoded = decode_wire(&encode_wire(&frame)).unwrap();
        assert_eq!(decoded.id(), 0x1FFF_FFFF);
        assert!(decoded.is_extended());
        assert_eq!(decoded.data(), &[0xFF; 8]);
    }

    #[test]
    fn wire_masks_standard_id() {
        // Flag bits outside the id width must not leak into the id.
        let frame = CanFrame::new(0x7FF, &[]).unwrap();
        let buf = encode_wire(&frame);
        let decoded = decode_wire(&buf).unwrap();
        assert_eq!(decoded.id(), 0x7FF);
        assert!(!decoded.is_error());
        assert!(!decoded.is_rtr());
    }

    #[test]
    fn wire_rejects_short_buffer() {
        assert!(matches!(decode_wire(&[0u8; 8]), Err(Error::Format(_))));
    }

    #[test]
    fn wire_caps_dlc() {
        let frame = CanFrame::new(1, &[9, 9]).unwrap();
        let mut buf = encode_wire(&frame);
        buf[4] = 15; // corrupt dlc beyond classic CAN
        let decoded = decode_wire(&buf).unwrap();
        assert_eq!(decoded.dlc(), MAX_DLEN);
    }
}
