//! Port traits, the boundary between the channel core and the platform.
//!
//! ```text
//!   UART driver adapter ──▶ SerialIo ──▶ Channel (core)
//!   Channel (core) ──▶ ConsoleControl / EventSink ──▶ platform
//! ```
//!
//! Driven adapters implement these traits. The channel consumes them
//! via generics, so the core never touches a concrete UART driver and
//! is fully testable with recording doubles.

use crate::config::FlowControl;

// ---------------------------------------------------------------------------
// Serial driver port
// ---------------------------------------------------------------------------

/// Static line parameters applied once at setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineSettings {
    pub baud_rate: u32,
    pub flow_control: FlowControl,
}

/// Non-blocking byte-level serial driver port.
///
/// Every call returns immediately: reads and writes move at most the
/// bytes the driver can take right now and report the actual count.
/// The driver invokes the channel's dispatch entry point whenever bytes
/// become readable or transmit space opens up; it guarantees dispatch
/// is never re-entered concurrently for the same line.
pub trait SerialIo {
    type Error: core::fmt::Debug;

    /// Apply static line configuration. Called exactly once at setup;
    /// failure is fatal to channel creation.
    fn configure(&mut self, settings: &LineSettings) -> Result<(), Self::Error>;

    /// Bytes currently buffered for reading.
    fn rx_available(&self) -> usize;

    /// Read up to `buf.len()` bytes. Returns the count actually read,
    /// 0 when nothing is pending.
    fn read(&mut self, buf: &mut [u8]) -> usize;

    /// Free space in the driver's transmit buffer.
    fn tx_available(&self) -> usize;

    /// Write as much of `data` as the driver accepts right now and
    /// return the count taken.
    fn write(&mut self, data: &[u8]) -> usize;

    /// Push buffered output onto the wire.
    fn flush(&mut self);

    fn set_rx_enabled(&mut self, enabled: bool);

    /// Ask the driver to invoke the dispatch entry point soon, from
    /// task context. `from_isr` tells the driver which scheduling path
    /// the request comes from.
    fn request_dispatch(&mut self, from_isr: bool);
}

// ---------------------------------------------------------------------------
// Console suspension port
// ---------------------------------------------------------------------------

/// Console/log output suspension port.
///
/// Human-readable logging can share the serial line with the framed RPC
/// stream. Implementations must stop emitting console bytes between
/// `suspend` and `resume` so log output cannot interleave with an
/// in-flight binary frame.
pub trait ConsoleControl {
    /// Whether console output (stdout or stderr) currently goes to `line`.
    fn claims_line(&self, line: u8) -> bool;

    fn suspend(&mut self);

    fn resume(&mut self);
}

/// A console port for lines that never carry console output.
pub struct NullConsole;

impl ConsoleControl for NullConsole {
    fn claims_line(&self, _line: u8) -> bool {
        false
    }

    fn suspend(&mut self) {}

    fn resume(&mut self) {}
}

// ---------------------------------------------------------------------------
// Lifecycle events
// ---------------------------------------------------------------------------

/// Lifecycle events raised synchronously by the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelEvent<'a> {
    /// First handshake observed since connect; the link is ready.
    Opened,
    /// The channel was torn down.
    Closed,
    /// A message arrived. The span is only valid for the duration of
    /// the call; copy it to retain it.
    FrameReceived(&'a [u8]),
    /// The frame queued by `send` has fully left the send queue.
    FrameSent,
}

/// Receiver for [`ChannelEvent`]s.
///
/// Handlers run inside dispatch/send/close and must not block.
pub trait EventSink {
    fn on_channel_event(&mut self, event: ChannelEvent<'_>);
}
