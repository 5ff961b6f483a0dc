//! Fuzz target: `frame::next_frame`
//!
//! Drives arbitrary byte streams through the frame extractor and
//! asserts that it never panics, always makes forward progress, and
//! never yields a message span outside the consumed region.
//!
//! cargo fuzz run fuzz_frame_extract

#![no_main]

use libfuzzer_sys::fuzz_target;
use uartlink::ByteQueue;
use uartlink::frame::{self, Extracted};

fuzz_target!(|data: &[u8]| {
    let mut q = ByteQueue::new();
    q.append(data);

    let mut consumed_total = 0usize;
    while let Some(step) = frame::next_frame(q.as_slice()) {
        assert!(step.consumed > 0, "extractor must make progress");
        if let Extracted::Message(m) = step.frame {
            assert!(!m.is_empty(), "empty messages are never delivered");
            assert!(m.len() <= step.consumed, "message exceeds consumed span");
        }
        consumed_total += step.consumed;
        assert!(consumed_total <= data.len(), "consumed more than was fed");
        let consumed = step.consumed;
        q.consume_prefix(consumed);
    }
});
