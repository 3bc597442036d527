use anyhow::Context;
use clap::Parser;
use std::f64::consts::TAU;
use tokio::signal;
use tokio::time::{self, Duration};

use can_explorer::CanFrame;
use can_explorer::can_driver::open_interface;
use can_explorer::codec::{build_frame, parse_id};

#[derive(Parser, Debug)]
#[command(name = "sinewave")]
#[command(about = "Stream a sine wave over CAN for load testing")]
struct Args {
    /// sine frequency in Hz
    #[arg(short = 'f', long = "freq", default_value_t = 1.0)]
    freq: f64,

    /// frames per second
    #[arg(long = "rate", default_value_t = 10.0)]
    rate: f64,

    /// frame identifier in hex
    #[arg(long = "id", default_value = "539")]
    id: String,

    /// peak amplitude of the generated wave
    #[arg(long = "amplitude", default_value_t = 180.0)]
    amplitude: f64,

    /// CAN interface, e.g. vcan0 or socketcan:vcan0
    interface: String,
}

/// Frame carrying the sine sample as a little-endian f64 payload.
fn sample_frame(id: u32, value: f64) -> can_explorer::Result<CanFrame> {
    build_frame(id, &value.to_le_bytes())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();
    anyhow::ensure!(args.rate > 0.0, "frame rate must be positive");

    let id = parse_id(&args.id).context("invalid frame id")?;
    let mut channel = open_interface(&args.interface)?;

    let dt = 1.0 / args.rate;
    let mut ticker = time::interval(Duration::from_secs_f64(dt));
    let mut t = 0.0f64;

    loop {
        tokio::select! {
            _ = signal::ctrl_c() => {
                break;
            }
            _ = ticker.tick() => {
                let value = args.amplitude * (TAU * args.freq * t).sin();
                let frame = sample_frame(id, value)?;
                channel.send_frame(&frame).await.context("failed to send frame")?;
                t += dt;
            }
        }
    }

    channel.close_channel().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_is_the_wave_sample() {
        let value = 180.0 * (TAU * 1.0 * 0.025).sin();
        let frame = sample_frame(0x539, value).unwrap();
        assert_eq!(frame.id(), 0x539);
        assert_eq!(frame.dlc(), 8);
        let decoded = f64::from_le_bytes(frame.data().try_into().unwrap());
        assert_eq!(decoded, value);
    }

    #[test]
    fn wide_ids_become_extended() {
        let frame = sample_frame(0x1_0000, 0.0).unwrap();
        assert!(frame.is_extended());
    }
}
