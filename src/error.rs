//! Error types for the channel transport.
//!
//! Small `Copy`-able enums with explicit `Display` impls, so rejection
//! paths stay allocation-free and callers can match on every variant.

use core::fmt;

// ---------------------------------------------------------------------------
// Send rejection
// ---------------------------------------------------------------------------

/// Reasons a `send` call is refused.
///
/// These are normal negative results, not faults: the caller is
/// expected to check and retry once the channel state changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendError {
    /// No handshake has completed since connect.
    NotConnected,
    /// A previous frame is still draining; retry after the frame-sent
    /// event.
    Busy,
}

impl fmt::Display for SendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConnected => write!(f, "channel not connected"),
            Self::Busy => write!(f, "a send is already in flight"),
        }
    }
}

// ---------------------------------------------------------------------------
// Setup failure
// ---------------------------------------------------------------------------

/// Failures while bringing the transport up. Fatal: no channel is
/// created and setup reports the failure upward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupError<E> {
    /// A configuration field failed range validation.
    InvalidConfig(&'static str),
    /// The serial driver rejected the line settings.
    Configure(E),
}

impl<E: fmt::Debug> fmt::Display for SetupError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
            Self::Configure(e) => write!(f, "line configuration failed: {e:?}"),
        }
    }
}
