//! Handshake and lifecycle flows through the public API.

use uartlink::{Channel, LinkConfig, init_channel};

use crate::mock_serial::{EventLog, LoggedEvent, MockConsole, MockSerial};

const HANDSHAKE_WIRE: &[u8] = b"\"\"\"\x04\"\"\"";

fn fresh_channel(
    wait_for_start_frame: bool,
) -> (Channel<MockSerial, MockConsole, EventLog>, MockSerial, EventLog) {
    let serial = MockSerial::unlimited();
    let log = EventLog::default();
    let config = LinkConfig {
        wait_for_start_frame,
        ..LinkConfig::default()
    };
    let channel = init_channel(&config, serial.clone(), MockConsole::default(), log.clone())
        .expect("setup")
        .expect("line enabled");
    (channel, serial, log)
}

#[test]
fn end_to_end_handshake_then_corrupt_frame() {
    // A fresh channel that requires the start handshake receives the
    // handshake followed by a data frame whose declared checksum is
    // wrong: one open event, one queued reply, zero received frames.
    let (mut channel, serial, log) = fresh_channel(true);

    serial.push_rx(HANDSHAKE_WIRE);
    serial.push_rx(b"\"\"\"{\"id\":1}00000000\"\"\"");
    channel.dispatch();

    assert_eq!(log.events(), [LoggedEvent::Opened]);
    assert_eq!(serial.take_tx(), HANDSHAKE_WIRE);
    assert!(log.received_frames().is_empty());
}

#[test]
fn repeated_handshakes_open_once() {
    let (mut channel, serial, log) = fresh_channel(true);

    for _ in 0..4 {
        serial.push_rx(HANDSHAKE_WIRE);
        channel.dispatch();
    }

    assert_eq!(log.count(&LoggedEvent::Opened), 1);
    // Every handshake still got its reply.
    assert_eq!(serial.take_tx(), HANDSHAKE_WIRE.repeat(4));
}

#[test]
fn handshake_works_without_start_frame_requirement() {
    let (mut channel, serial, log) = fresh_channel(false);

    serial.push_rx(HANDSHAKE_WIRE);
    channel.dispatch();

    assert!(channel.is_connected());
    assert_eq!(log.events(), [LoggedEvent::Opened]);
}

#[test]
fn data_before_handshake_is_resynced_away() {
    let (mut channel, serial, log) = fresh_channel(true);

    // A complete, valid frame arriving before any handshake: the frame
    // itself still extracts (it is complete within one dispatch), but
    // trailing garbage with no delimiter is trimmed to a potential
    // partial delimiter while the channel waits for the start frame.
    serial.push_rx(b"noise with no delimiter at all....");
    channel.dispatch();
    serial.push_rx(HANDSHAKE_WIRE);
    channel.dispatch();

    assert!(channel.is_connected());
    assert_eq!(log.count(&LoggedEvent::Opened), 1);
}

#[test]
fn close_then_reconnect_raises_events_again() {
    let (mut channel, serial, log) = fresh_channel(true);

    serial.push_rx(HANDSHAKE_WIRE);
    channel.dispatch();
    channel.close();
    assert_eq!(
        log.events(),
        [LoggedEvent::Opened, LoggedEvent::Closed]
    );
    assert!(!channel.is_connected());

    channel.connect();
    serial.push_rx(HANDSHAKE_WIRE);
    channel.dispatch();
    assert!(channel.is_connected());
    assert_eq!(log.count(&LoggedEvent::Opened), 2);
}

#[test]
fn disabled_line_builds_no_channel() {
    let config = LinkConfig {
        uart_no: -1,
        ..LinkConfig::default()
    };
    let result = init_channel(
        &config,
        MockSerial::default(),
        MockConsole::default(),
        EventLog::default(),
    );
    assert!(matches!(result, Ok(None)));
}
