use clap::{ArgAction, Parser};
use std::process;
use std::time::Instant;
use tokio::sync::mpsc;

use can_explorer::can_driver::{interface_label, open_interface};
use can_explorer::can_errors::decode_error_frame;
use can_explorer::frame::{CanFrame, timestamp_now};

#[derive(Debug, Parser)]
#[command(name = "candump")]
#[command(about = "Dump CAN traffic from one or more socketcan interfaces")]
pub struct Args {
    /// timestamp type: a (absolute), d (delta), z (zero)
    #[arg(short = 't', value_name = "type")]
    pub timestamp: Option<char>,

    /// decode error frames in human readable form
    #[arg(short = 'e', action = ArgAction::SetTrue)]
    pub show_error_frames: bool,

    /// terminate after reception of <count> CAN frames
    #[arg(short = 'n', value_name = "count")]
    pub count: Option<u64>,

    /// print one JSON object per frame instead of the column format
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// CAN interfaces, e.g. vcan0 or socketcan:can1
    #[arg(required = true, value_name = "IF", num_args = 1..)]
    pub interfaces: Vec<String>,
}

/// Controls timestamp mode (from `-t` flag).
#[derive(Debug, Clone, Copy)]
pub enum TimestampMode {
    None,     // -t not specified
    Absolute, // -t a
    Delta,    // -t d
    Zero,     // -t z
}

impl TimestampMode {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'a' => Some(Self::Absolute),
            'd' => Some(Self::Delta),
            'z' => Some(Self::Zero),
            _ => None,
        }
    }
}

/// Holds state needed for timestamp calculations.
pub struct TimestampCtx {
    mode: TimestampMode,
    start_instant: Instant,
    last_instant: Option<Instant>,
}

impl TimestampCtx {
    pub fn new(mode: TimestampMode) -> Self {
        TimestampCtx {
            mode,
            start_instant: Instant::now(),
            last_instant: None,
        }
    }

    /// Return timestamp in microseconds, depending on mode.
    pub fn get_timestamp(&mut self, frame: &CanFrame) -> Option<u64> {
        match self.mode {
            TimestampMode::None => None,
            TimestampMode::Absolute => {
                // prefer the driver's receive timestamp
                Some(frame.timestamp().unwrap_or_else(timestamp_now))
            }
            TimestampMode::Delta => {
                let now = Instant::now();
                let ts = if let Some(last) = self.last_instant {
                    now.duration_since(last).as_micros() as u64
                } else {
                    0
                };
                self.last_instant = Some(now);
                Some(ts)
            }
            TimestampMode::Zero => {
                let now = Instant::now();
                Some(now.duration_since(self.start_instant).as_micros() as u64)
            }
        }
    }
}

fn print_frame(args: &Args, ts_ctx: &mut TimestampCtx, ifname: &str, frame: &CanFrame) {
    if args.json {
        println!(
            "{}",
            serde_json::json!({ "interface": ifname, "frame": frame })
        );
        return;
    }

    // If no -t option was given, the timestamp prefix is empty.
    let ts_str = ts_ctx.get_timestamp(frame).map_or(String::new(), |t| {
        format!("({}.{:06}) ", t / 1_000_000, t % 1_000_000)
    });

    if args.show_error_frames {
        if let Some(kinds) = decode_error_frame(frame) {
            let text = kinds
                .iter()
                .map(|k| k.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            println!("{}{}  ERRORFRAME  {}", ts_str, ifname, text);
            return;
        }
    }

    let id = match frame.is_extended() {
        true => format!("{:08X}", frame.id()),
        false => format!("{:03X}", frame.id()),
    };

    println!(
        "{}{}  {:>8}   [{}]  {}",
        ts_str,
        ifname,
        id,
        frame.dlc(),
        frame
            .data()
            .iter()
            .map(|b| format!("{:02X}", b))
            .collect::<Vec<_>>()
            .join(" "),
    );
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let args = Args::parse();

    let mode = match args.timestamp {
        Some(c) => match TimestampMode::from_char(c) {
            Some(m) => m,
            None => {
                eprintln!("candump: unknown timestamp type '{}'", c);
                process::exit(1);
            }
        },
        None => TimestampMode::None,
    };
    let mut ts_ctx = TimestampCtx::new(mode);

    // One reader task per interface, funneled into a single print loop.
    let (tx, mut rx) = mpsc::channel::<(String, CanFrame)>(100);
    for spec in &args.interfaces {
        let mut driver = match open_interface(spec) {
            Ok(d) => d,
            Err(e) => {
                eprintln!("candump: {}", e);
                process::exit(1);
            }
        };
        let ifname = interface_label(spec).to_string();
        let tx = tx.clone();
        tokio::spawn(async move {
            loop {
                match driver.read_frame().await {
                    Ok(frame) => {
                        if tx.send((ifname.clone(), frame)).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        eprintln!("candump: {}: {}", ifname, e);
                        break;
                    }
                }
            }
        });
    }
    drop(tx);

    let mut received = 0u64;
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                process::exit(130);
            }
            item = rx.recv() => {
                let Some((ifname, frame)) = item else {
                    // every reader task has died
                    process::exit(1);
                };
                print_frame(&args, &mut ts_ctx, &ifname, &frame);
                received += 1;
                if args.count.is_some_and(|n| received >= n) {
                    break;
                }
            }
        }
    }
}
