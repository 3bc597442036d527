use anyhow::Context;
use clap::Parser;
use tokio::signal;
use tokio::time::{self, Duration};

use can_explorer::busload::BusLoadMeter;
use can_explorer::can_driver::{interface_label, open_interface};

#[derive(Parser, Debug)]
#[command(name = "canbusload")]
#[command(about = "Estimate CAN bus utilisation from observed traffic")]
struct Args {
    /// nominal bus bitrate, enables a percentage column
    #[arg(short = 'b', long = "bitrate")]
    bitrate: Option<u32>,

    /// CAN interface, e.g. vcan0 or socketcan:vcan0
    interface: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut channel = open_interface(&args.interface)?;
    let ifname = interface_label(&args.interface).to_string();

    let mut meter = BusLoadMeter::new();
    let mut ticker = time::interval(Duration::from_secs(1));
    // the first tick completes immediately
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = signal::ctrl_c() => {
                break;
            }
            frame = channel.read_frame() => {
                let frame = frame.context("failed to read frame")?;
                meter.record(&frame);
            }
            _ = ticker.tick() => {
                let bps = meter.take_rate();
                match args.bitrate {
                    Some(nominal) => println!(
                        "{}  {:>8.0} bits/s  {:>5.1}%",
                        ifname,
                        bps,
                        100.0 * bps / nominal as f64
                    ),
                    None => println!("{}  {:>8.0} bits/s", ifname, bps),
                }
            }
        }
    }

    channel.close_channel().await?;
    Ok(())
}
