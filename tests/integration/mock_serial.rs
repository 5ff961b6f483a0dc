//! Recording doubles for the serial, console, and event-sink ports.
//!
//! Every double shares its state through an `Rc<RefCell<..>>` handle so
//! tests can feed input and assert on output after the channel has
//! taken ownership of the port.

use std::cell::RefCell;
use std::rc::Rc;

use uartlink::ports::{ChannelEvent, ConsoleControl, EventSink, LineSettings, SerialIo};

// ── Serial double ─────────────────────────────────────────────

#[derive(Default)]
pub struct SerialState {
    pub rx: Vec<u8>,
    pub tx: Vec<u8>,
    pub tx_budget: usize,
    pub rx_enabled: bool,
    pub flushes: usize,
    pub dispatch_requests: usize,
}

/// A scripted serial line: tests push bytes into `rx` and the channel's
/// writes land in `tx`, limited per call by `tx_budget`.
#[derive(Clone, Default)]
pub struct MockSerial(pub Rc<RefCell<SerialState>>);

#[allow(dead_code)]
impl MockSerial {
    /// A line with unlimited transmit space.
    pub fn unlimited() -> Self {
        let s = Self::default();
        s.0.borrow_mut().tx_budget = usize::MAX;
        s
    }

    pub fn push_rx(&self, bytes: &[u8]) {
        self.0.borrow_mut().rx.extend_from_slice(bytes);
    }

    pub fn set_tx_budget(&self, budget: usize) {
        self.0.borrow_mut().tx_budget = budget;
    }

    /// Everything written so far, draining the capture.
    pub fn take_tx(&self) -> Vec<u8> {
        std::mem::take(&mut self.0.borrow_mut().tx)
    }
}

impl SerialIo for MockSerial {
    type Error = &'static str;

    fn configure(&mut self, _settings: &LineSettings) -> Result<(), &'static str> {
        Ok(())
    }

    fn rx_available(&self) -> usize {
        self.0.borrow().rx.len()
    }

    fn read(&mut self, buf: &mut [u8]) -> usize {
        let mut s = self.0.borrow_mut();
        let n = s.rx.len().min(buf.len());
        buf[..n].copy_from_slice(&s.rx[..n]);
        s.rx.drain(..n);
        n
    }

    fn tx_available(&self) -> usize {
        self.0.borrow().tx_budget
    }

    fn write(&mut self, data: &[u8]) -> usize {
        let mut s = self.0.borrow_mut();
        let n = s.tx_budget.min(data.len());
        s.tx.extend_from_slice(&data[..n]);
        if s.tx_budget != usize::MAX {
            s.tx_budget -= n;
        }
        n
    }

    fn flush(&mut self) {
        self.0.borrow_mut().flushes += 1;
    }

    fn set_rx_enabled(&mut self, enabled: bool) {
        self.0.borrow_mut().rx_enabled = enabled;
    }

    fn request_dispatch(&mut self, _from_isr: bool) {
        self.0.borrow_mut().dispatch_requests += 1;
    }
}

// ── Console double ────────────────────────────────────────────

#[derive(Default)]
pub struct ConsoleState {
    pub claims: bool,
    pub suspends: usize,
    pub resumes: usize,
}

#[derive(Clone, Default)]
pub struct MockConsole(pub Rc<RefCell<ConsoleState>>);

#[allow(dead_code)]
impl MockConsole {
    /// A console that shares the channel's line.
    pub fn claiming() -> Self {
        let c = Self::default();
        c.0.borrow_mut().claims = true;
        c
    }
}

impl ConsoleControl for MockConsole {
    fn claims_line(&self, _line: u8) -> bool {
        self.0.borrow().claims
    }

    fn suspend(&mut self) {
        self.0.borrow_mut().suspends += 1;
    }

    fn resume(&mut self) {
        self.0.borrow_mut().resumes += 1;
    }
}

// ── Event log ─────────────────────────────────────────────────

/// Owned copy of a channel event, for later assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoggedEvent {
    Opened,
    Closed,
    FrameReceived(Vec<u8>),
    FrameSent,
}

#[derive(Clone, Default)]
pub struct EventLog(pub Rc<RefCell<Vec<LoggedEvent>>>);

#[allow(dead_code)]
impl EventLog {
    pub fn events(&self) -> Vec<LoggedEvent> {
        self.0.borrow().clone()
    }

    pub fn count(&self, wanted: &LoggedEvent) -> usize {
        self.0.borrow().iter().filter(|e| *e == wanted).count()
    }

    pub fn received_frames(&self) -> Vec<Vec<u8>> {
        self.0
            .borrow()
            .iter()
            .filter_map(|e| match e {
                LoggedEvent::FrameReceived(m) => Some(m.clone()),
                _ => None,
            })
            .collect()
    }
}

impl EventSink for EventLog {
    fn on_channel_event(&mut self, event: ChannelEvent<'_>) {
        self.0.borrow_mut().push(match event {
            ChannelEvent::Opened => LoggedEvent::Opened,
            ChannelEvent::Closed => LoggedEvent::Closed,
            ChannelEvent::FrameReceived(m) => LoggedEvent::FrameReceived(m.to_vec()),
            ChannelEvent::FrameSent => LoggedEvent::FrameSent,
        });
    }
}
