//! Framed, checksum-verified RPC transport over a UART serial line.
//!
//! One physical line carries two streams: interactive human-readable
//! console output and a binary framed RPC stream. Frames are bounded by
//! the 3-byte `"""` delimiter and verified with a trailing CRC-32; a
//! single-control-byte handshake establishes readiness before data
//! flows. While a frame is being transmitted, console output on the
//! same line is suspended so the two streams cannot interleave.
//!
//! ```text
//! ┌──────────┐     ┌─────────┐     ┌─────────────────────────┐
//! │ SerialIo │────▶│  Codec  │────▶│ Channel (state machine) │──▶ EventSink
//! │ (port)   │     │ (frame) │     │ handshake · send gate   │
//! └──────────┘     └─────────┘     └─────────────────────────┘
//! ```
//!
//! The core is platform-neutral: the serial driver, console suspension,
//! and the RPC layer above are all reached through the port traits in
//! [`ports`], so the whole state machine runs unmodified under test
//! with recording doubles.

#![deny(unused_must_use)]

pub mod buffer;
pub mod channel;
pub mod config;
pub mod error;
pub mod frame;
pub mod ports;
pub mod setup;

pub use buffer::ByteQueue;
pub use channel::Channel;
pub use config::{FlowControl, LinkConfig};
pub use error::{SendError, SetupError};
pub use ports::{ChannelEvent, ConsoleControl, EventSink, LineSettings, NullConsole, SerialIo};
pub use setup::init_channel;
