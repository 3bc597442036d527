//! Local echo driver, useful for exercising the tools without a bus.

use std::io;

use async_trait::async_trait;
use tokio::sync::mpsc::{self, Receiver, Sender};

use crate::can_driver::CanDriver;
use crate::error::{Error, Result};
use crate::frame::{CanFrame, timestamp_now};

const QUEUE_DEPTH: usize = 100;

/// Echoes every sent frame back on its own receive queue.
pub struct DummyDriver {
    tx: Option<Sender<CanFrame>>,
    rx: Receiver<CanFrame>,
}

impl DummyDriver {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel(QUEUE_DEPTH);
        DummyDriver { tx: Some(tx), rx }
    }
}

impl Default for DummyDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CanDriver for DummyDriver {
    async fn send_frame(&mut self, frame: &CanFrame) -> Result<()> {
        let tx = self.tx.as_ref().ok_or_else(|| {
            Error::Io(io::Error::new(
                io::ErrorKind::NotConnected,
                "dummy channel is closed",
            ))
        })?;
        let mut echo = frame.clone();
        echo.set_timestamp(Some(timestamp_now()));
        // A full queue drops the frame, like a saturated bus.
        let _ = tx.try_send(echo);
        Ok(())
    }

    async fn read_frame(&mut self) -> Result<CanFrame> {
        self.rx.recv().await.ok_or_else(|| {
            Error::Io(io::Error::new(
                io::ErrorKind::NotConnected,
                "dummy channel is closed",
            ))
        })
    }

    async fn close_channel(&mut self) -> Result<()> {
        self.tx.take();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn echoes_frames_in_order() {
        let mut driver = DummyDriver::new();
        let first = CanFrame::new(0x88, &[0xDE, 0xAD]).unwrap();
        let second = CanFrame::new(0x99, &[0xBE, 0xEF]).unwrap();
        driver.send_frame(&first).await.unwrap();
        driver.send_frame(&second).await.unwrap();

        let got = driver.read_frame().await.unwrap();
        assert_eq!(got.id(), 0x88);
        assert_eq!(got.data(), first.data());
        assert!(got.timestamp().is_some());

        let got = driver.read_frame().await.unwrap();
        assert_eq!(got.id(), 0x99);
    }

    #[tokio::test]
    async fn drops_when_queue_is_full() {
        let mut driver = DummyDriver::new();
        let frame = CanFrame::new(1, &[0]).unwrap();
        for _ in 0..QUEUE_DEPTH + 10 {
            driver.send_frame(&frame).await.unwrap();
        }
        for _ in 0..QUEUE_DEPTH {
            driver.read_frame().await.unwrap();
        }
        // The overflow frames were dropped; the queue is empty again.
        driver.close_channel().await.unwrap();
        assert!(driver.read_frame().await.is_err());
    }

    #[tokio::test]
    async fn close_is_idempotent() {
        let mut driver = DummyDriver::new();
        driver.close_channel().await.unwrap();
        driver.close_channel().await.unwrap();
        let frame = CanFrame::new(1, &[]).unwrap();
        assert!(matches!(
            driver.send_frame(&frame).await,
            Err(Error::Io(_))
        ));
    }
}
