//! Link configuration parameters.
//!
//! Read once at transport setup and treated as immutable by the
//! channel. Values normally come from the system configuration store;
//! the serde derives keep the struct loadable from JSON or postcard
//! blobs.

use serde::{Deserialize, Serialize};

/// Flow control applied to both directions of the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowControl {
    #[default]
    None,
    /// RTS/CTS hardware flow control.
    Hardware,
    /// XON/XOFF software flow control.
    Software,
}

/// RPC-over-UART link configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkConfig {
    /// Serial line carrying the RPC stream. Negative disables the
    /// transport entirely.
    pub uart_no: i32,
    /// Line speed in bits per second.
    pub baud_rate: u32,
    /// Flow control for both rx and tx.
    pub flow_control: FlowControl,
    /// Whether the peer must send a start handshake before data frames
    /// are expected.
    pub wait_for_start_frame: bool,
    /// Largest accepted incoming frame, in bytes. Buffered input beyond
    /// this (plus delimiter overhead) is discarded wholesale.
    pub max_frame_size: usize,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            uart_no: 0,
            baud_rate: 115_200,
            flow_control: FlowControl::None,
            wait_for_start_frame: true,
            max_frame_size: 4096,
        }
    }
}
