//! Estimate bus utilisation from observed frames.

use std::mem;
use std::time::{Duration, Instant};

use crate::frame::CanFrame;

/// Wire bits of a classic CAN frame, excluding stuff bits.
///
/// Standard frame overhead is 47 bits (arbitration, control, CRC, ACK,
/// EOF, interframe space); the extended arbitration field adds 20.
pub fn frame_bits(frame: &CanFrame) -> u64 {
    let overhead = if frame.is_extended() { 67 } else { 47 };
    overhead + 8 * frame.dlc() as u64
}

/// Buckets frame bits into a rolling window and reports bits per second.
pub struct BusLoadMeter {
    window_start: Instant,
    bits: u64,
}

impl BusLoadMeter {
    pub fn new() -> Self {
        BusLoadMeter {
            window_start: Instant::now(),
            bits: 0,
        }
    }

    pub fn record(&mut self, frame: &CanFrame) {
        self.bits += frame_bits(frame);
    }

    /// Bits per second over the elapsed window, then restart the window.
    pub fn take_rate(&mut self) -> f64 {
        let now = Instant::now();
        let elapsed = now.duration_since(self.window_start);
        self.window_start = now;
        rate(mem::take(&mut self.bits), elapsed)
    }
}

impl Default for BusLoadMeter {
    fn default() -> Self {
        Self::new()
    }
}

fn rate(bits: u64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs > 0.0 { bits as f64 / secs } else { 0.0 }
}
