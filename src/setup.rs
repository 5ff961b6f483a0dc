//! Transport wiring: validate configuration, bring the line up, build
//! and connect the channel.
//!
//! The line may already be configured for debug output at boot, so the
//! existing traffic is flushed before the RPC settings are applied. A
//! driver rejection is fatal: setup reports the failure upward and no
//! channel is created.

use log::error;

use crate::channel::Channel;
use crate::config::LinkConfig;
use crate::error::SetupError;
use crate::ports::{ConsoleControl, EventSink, LineSettings, SerialIo};

/// Build and connect an RPC channel over the configured line.
///
/// Returns `Ok(None)` when `uart_no` is negative, which is how the
/// configuration disables RPC-over-UART entirely.
pub fn init_channel<S, C, E>(
    config: &LinkConfig,
    mut serial: S,
    console: C,
    events: E,
) -> Result<Option<Channel<S, C, E>>, SetupError<S::Error>>
where
    S: SerialIo,
    C: ConsoleControl,
    E: EventSink,
{
    if config.uart_no < 0 {
        return Ok(None);
    }
    let line = u8::try_from(config.uart_no)
        .map_err(|_| SetupError::InvalidConfig("uart_no out of range"))?;
    if config.baud_rate == 0 {
        return Err(SetupError::InvalidConfig("baud_rate must be non-zero"));
    }
    if config.max_frame_size == 0 {
        return Err(SetupError::InvalidConfig("max_frame_size must be non-zero"));
    }

    serial.flush();
    let settings = LineSettings {
        baud_rate: config.baud_rate,
        flow_control: config.flow_control,
    };
    if let Err(e) = serial.configure(&settings) {
        error!("UART{line} init failed");
        return Err(SetupError::Configure(e));
    }

    let mut channel = Channel::new(
        line,
        config.wait_for_start_frame,
        config.max_frame_size,
        serial,
        console,
        events,
    );
    channel.connect();
    Ok(Some(channel))
}
