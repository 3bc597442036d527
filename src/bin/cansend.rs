use clap::Parser;
use std::process;

use can_explorer::Result;
use can_explorer::can_driver::open_interface;
use can_explorer::codec::parse_frame;

#[derive(Parser)]
#[command(name = "cansend")]
#[command(about = "Send a single CAN frame")]
struct Args {
    /// CAN interface, e.g. vcan0 or socketcan:vcan0
    interface: String,

    /// frame identifier in hex, e.g. 88 or 1ABCDEFC
    id: String,

    /// payload as hex text, e.g. DEADBEEF
    data: String,
}

async fn run(args: &Args) -> Result<()> {
    let frame = parse_frame(&args.id, &args.data)?;
    let mut channel = open_interface(&args.interface)?;
    channel.send_frame(&frame).await?;
    channel.close_channel().await?;
    Ok(())
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let args = Args::parse();

    if let Err(e) = run(&args).await {
        eprintln!("cansend: {}", e);
        process::exit(1);
    }
}
