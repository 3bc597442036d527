//! Drives the dummy channel through the public API, the same way the
//! tools do.

use can_explorer::Error;
use can_explorer::can_driver::open_interface;
use can_explorer::codec::{encode_hex, parse_frame};

#[tokio::test]
async fn send_and_dump_one_frame() {
    let mut channel = open_interface("dummy").unwrap();

    let frame = parse_frame("88", "DEADBEEF").unwrap();
    channel.send_frame(&frame).await.unwrap();

    let got = channel.read_frame().await.unwrap();
    assert_eq!(got.id(), 0x88);
    assert_eq!(encode_hex(got.data()), "DEADBEEF");
    assert!(!got.is_extended());
    assert!(got.timestamp().is_some());

    channel.close_channel().await.unwrap();
}

#[tokio::test]
async fn closed_channel_fails_with_io() {
    let mut channel = open_interface("dummy").unwrap();
    channel.close_channel().await.unwrap();
    // closing again is a no-op
    channel.close_channel().await.unwrap();

    assert!(matches!(channel.read_frame().await, Err(Error::Io(_))));
}

#[tokio::test]
async fn missing_socketcan_interface_is_unavailable() {
    match open_interface("socketcan:nosuchcan0") {
        Err(Error::ChannelUnavailable { iface, .. }) => assert_eq!(iface, "nosuchcan0"),
        other => panic!("expected ChannelUnavailable, got {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
async fn bare_interface_name_is_socketcan() {
    // same failure as above proves the bare form routes to socketcan
    assert!(matches!(
        open_interface("nosuchcan0"),
        Err(Error::ChannelUnavailable { .. })
    ));
}
