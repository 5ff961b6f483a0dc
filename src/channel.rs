//! Channel state machine multiplexing console output and framed RPC
//! over one serial line.
//!
//! The host tool expects the following sequence:
//!
//! ```text
//!        HOST                DEVICE
//!        ──▶  0x04"""        (host repeats, waiting for readiness)
//!        ◀──  0x04"""        (device replies: ready)
//!        ──▶  """{request}crc"""
//!                            console output is suspended here
//!        ◀──  """{response}crc"""
//!                            console output resumes here
//! ```
//!
//! Console suspension must outlive the handshake reply: the request
//! handler may itself log, so the console stays quiet until the frame
//! queued by user code, not the auto-generated reply, has fully left
//! the send queue. [`SendState`] keeps the two kinds of in-flight
//! frame apart.

use log::{error, info};

use crate::buffer::ByteQueue;
use crate::error::SendError;
use crate::frame::{self, Extracted, FRAME_DELIMITER};
use crate::ports::{ChannelEvent, ConsoleControl, EventSink, SerialIo};

/// Stack chunk used to drain driver input into the receive queue.
const READ_CHUNK: usize = 128;

// ---------------------------------------------------------------------------
// Link and send state
// ---------------------------------------------------------------------------

/// Connection state of the link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LinkState {
    /// Before connect (or after close).
    Disconnected,
    /// Waiting for the peer's first handshake. While `resync` is set,
    /// buffered input beyond a potential partial delimiter at the tail
    /// is pre-handshake garbage and gets trimmed away.
    Connecting { resync: bool },
    Connected,
}

/// What the send queue currently carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SendState {
    Idle,
    /// An auto-generated handshake reply; completion raises no event.
    HandshakeReply,
    /// A frame queued by user code; completion raises
    /// [`ChannelEvent::FrameSent`].
    UserFrame,
}

// ---------------------------------------------------------------------------
// Channel
// ---------------------------------------------------------------------------

/// An RPC channel bound to one serial line.
///
/// Owns the receive and send queues and the serial, console, and event
/// collaborators. All entry points (`dispatch`, `connect`, `send`,
/// `close`) run on a single logical thread of control and never block.
/// Dropping the channel releases both queues; call [`Self::close`]
/// first so the peer layer sees the closed event.
pub struct Channel<S, C, E> {
    line: u8,
    wait_for_start_frame: bool,
    max_frame_size: usize,
    link: LinkState,
    send_state: SendState,
    console_suspended: bool,
    recv_queue: ByteQueue,
    send_queue: ByteQueue,
    serial: S,
    console: C,
    events: E,
}

impl<S, C, E> Channel<S, C, E>
where
    S: SerialIo,
    C: ConsoleControl,
    E: EventSink,
{
    pub fn new(
        line: u8,
        wait_for_start_frame: bool,
        max_frame_size: usize,
        serial: S,
        console: C,
        events: E,
    ) -> Self {
        info!("UART{line} RPC channel created");
        Self {
            line,
            wait_for_start_frame,
            max_frame_size,
            link: LinkState::Disconnected,
            send_state: SendState::Idle,
            console_suspended: false,
            recv_queue: ByteQueue::new(),
            send_queue: ByteQueue::new(),
            serial,
            console,
            events,
        }
    }

    /// Serial line this channel is bound to.
    pub fn line(&self) -> u8 {
        self.line
    }

    pub fn is_connected(&self) -> bool {
        matches!(self.link, LinkState::Connected)
    }

    /// Whether a frame is still draining to the driver.
    pub fn is_sending(&self) -> bool {
        !matches!(self.send_state, SendState::Idle)
    }

    /// Transport kind tag.
    pub fn kind(&self) -> &'static str {
        "UART"
    }

    /// Human-readable channel identity.
    pub fn describe(&self) -> String {
        format!("UART{}", self.line)
    }

    pub fn serial(&self) -> &S {
        &self.serial
    }

    pub fn serial_mut(&mut self) -> &mut S {
        &mut self.serial
    }

    pub fn events(&self) -> &E {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut E {
        &mut self.events
    }

    /// Begin listening for the peer. No-op once connected.
    pub fn connect(&mut self) {
        if self.is_connected() {
            return;
        }
        self.link = LinkState::Connecting {
            resync: self.wait_for_start_frame,
        };
        self.serial.set_rx_enabled(true);
    }

    /// Queue `payload` for transmission as a data frame.
    ///
    /// Refused while disconnected or while a previous frame is still in
    /// flight; the caller retries after the frame-sent event. On
    /// success, console output sharing this line is suspended so log
    /// bytes cannot interleave with the binary frame, and the driver is
    /// asked to run dispatch from task context.
    pub fn send(&mut self, payload: &[u8]) -> Result<(), SendError> {
        if !self.is_connected() {
            return Err(SendError::NotConnected);
        }
        if self.is_sending() {
            return Err(SendError::Busy);
        }
        frame::encode_frame(payload, &mut self.send_queue);
        self.send_state = SendState::UserFrame;

        if self.console.claims_line(self.line) {
            self.console.suspend();
            self.console_suspended = true;
        } else {
            self.console_suspended = false;
        }

        self.serial.request_dispatch(false);
        Ok(())
    }

    /// Tear the link down.
    ///
    /// Abandons any in-flight send without flushing, resumes a
    /// suspended console, and raises [`ChannelEvent::Closed`]. Safe to
    /// call repeatedly; each call re-raises the closed event.
    pub fn close(&mut self) {
        self.serial.set_rx_enabled(false);
        self.link = LinkState::Disconnected;
        self.send_state = SendState::Idle;
        if self.console_suspended {
            self.console_suspended = false;
            self.console.resume();
        }
        self.events.on_channel_event(ChannelEvent::Closed);
    }

    /// The single I/O entry point.
    ///
    /// The driver invokes this whenever bytes are readable or transmit
    /// space opened up. Work per call is bounded by what the driver can
    /// move right now; the call never blocks and may be re-armed as
    /// often as the driver likes.
    pub fn dispatch(&mut self) {
        self.pump_rx();
        self.pump_tx();
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn pump_rx(&mut self) {
        let mut rx_pending = self.serial.rx_available();
        if rx_pending == 0 {
            return;
        }
        let mut chunk = [0u8; READ_CHUNK];
        while rx_pending > 0 {
            let n = self.serial.read(&mut chunk);
            if n == 0 {
                break;
            }
            self.recv_queue.append(&chunk[..n]);
            rx_pending = rx_pending.saturating_sub(n);
        }

        self.drain_frames();

        if self.recv_queue.len() > self.max_frame_size + 2 * FRAME_DELIMITER.len() {
            error!(
                "UART{}: incoming frame too big, dropping {} buffered bytes",
                self.line,
                self.recv_queue.len()
            );
            self.recv_queue.clear();
        }
        if let LinkState::Connecting { resync: true } = self.link {
            // Keep only a potential partial delimiter at the tail;
            // everything ahead of it predates the handshake.
            if self.recv_queue.len() > FRAME_DELIMITER.len() {
                let excess = self.recv_queue.len() - FRAME_DELIMITER.len();
                self.recv_queue.consume_prefix(excess);
            }
        }
        self.recv_queue.shrink_to_fit();
    }

    fn drain_frames(&mut self) {
        loop {
            let Some(step) = frame::next_frame(self.recv_queue.as_slice()) else {
                break;
            };
            let consumed = step.consumed;
            match step.frame {
                Extracted::Handshake => {
                    let first = !matches!(self.link, LinkState::Connected);
                    self.link = LinkState::Connected;
                    if first {
                        self.events.on_channel_event(ChannelEvent::Opened);
                    }
                    // Reply regardless; the peer repeats the handshake
                    // until it sees one.
                    frame::encode_handshake(&mut self.send_queue);
                    if matches!(self.send_state, SendState::Idle) {
                        self.send_state = SendState::HandshakeReply;
                    }
                }
                Extracted::Message(message) => {
                    self.events
                        .on_channel_event(ChannelEvent::FrameReceived(message));
                }
                Extracted::Skip => {}
            }
            self.recv_queue.consume_prefix(consumed);
        }
    }

    fn pump_tx(&mut self) {
        if !self.is_sending() {
            return;
        }
        let tx_space = self.serial.tx_available();
        if tx_space == 0 {
            return;
        }
        let want = self.send_queue.len().min(tx_space);
        let written = self.serial.write(&self.send_queue.as_slice()[..want]);
        self.send_queue.consume_prefix(written);

        if self.send_queue.is_empty() {
            let finished = core::mem::replace(&mut self.send_state, SendState::Idle);
            if self.console_suspended {
                self.console_suspended = false;
                self.serial.flush();
                self.console.resume();
            }
            if matches!(finished, SendState::UserFrame) {
                self.events.on_channel_event(ChannelEvent::FrameSent);
            }
            self.send_queue.shrink_to_fit();
        }
    }
}
