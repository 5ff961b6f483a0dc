//! Frame codec for the `"""`-delimited wire format.
//!
//! Wire format, bit-exact:
//!
//! ```text
//! ┌───────┬─────────────────────┬──────────────┬───────┐
//! │ """   │ message bytes       │ crc32 hex (8)│ """   │   data frame
//! └───────┴─────────────────────┴──────────────┴───────┘
//! ┌───────┬──────┬───────┐
//! │ """   │ 0x04 │ """   │                                 handshake
//! └───────┴──────┴───────┘
//! ```
//!
//! The checksum trailer is optional on receive: old peers send bare
//! messages, so anything that does not look like an 8-hex-digit CRC is
//! tolerated and the message passes through unchecked. The boundary
//! between message and trailer is found by scanning backward for the
//! closing `}` of the message envelope; there is no explicit length
//! field on the wire.

use log::warn;

use crate::buffer::ByteQueue;

/// Marker bounding every frame on the wire.
pub const FRAME_DELIMITER: &[u8] = b"\"\"\"";

/// Control byte carried by a handshake frame.
pub const HANDSHAKE_BYTE: u8 = 0x04;

/// Length of the hex-encoded CRC-32 trailer on outgoing data frames.
const CRC_HEX_LEN: usize = 8;

/// CRC-32 (IEEE polynomial, seed 0) over `data`.
pub fn checksum(data: &[u8]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// Classification of one extracted frame payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extracted<'a> {
    /// The single-control-byte readiness frame.
    Handshake,
    /// A message that passed (or legitimately skipped) the checksum.
    Message(&'a [u8]),
    /// Empty or corrupted frame; nothing to deliver.
    Skip,
}

/// One step of extraction: the classification plus how many bytes of
/// the window it consumed (payload and closing delimiter).
#[derive(Debug, Clone, Copy)]
pub struct Step<'a> {
    pub frame: Extracted<'a>,
    pub consumed: usize,
}

/// Extract the next frame from the raw receive window.
///
/// Returns `None` when no delimiter occurs in `window` (the frame is
/// still incomplete). Otherwise `consumed` is always at least the
/// delimiter length, so repeated calls make progress on any input.
pub fn next_frame(window: &[u8]) -> Option<Step<'_>> {
    let end = find_delimiter(window)?;
    let consumed = end + FRAME_DELIMITER.len();
    if end == 0 {
        // Back-to-back delimiters close an empty frame.
        return Some(Step {
            frame: Extracted::Skip,
            consumed,
        });
    }

    let payload = &window[..end];
    if payload == [HANDSHAKE_BYTE] {
        return Some(Step {
            frame: Extracted::Handshake,
            consumed,
        });
    }

    let (message, meta) = split_metadata(payload);
    if meta.len() >= CRC_HEX_LEN {
        // Trailer that does not parse as hex comes from a peer that
        // never appends a checksum; only a parsed value is enforced.
        if let Some(expected) = parse_crc_hex(&meta[..CRC_HEX_LEN]) {
            let actual = checksum(message);
            if actual != expected {
                warn!(
                    "corrupted frame ({} bytes): declared crc {expected:08x}, computed {actual:08x}",
                    message.len()
                );
                return Some(Step {
                    frame: Extracted::Skip,
                    consumed,
                });
            }
        }
    }

    if message.is_empty() {
        return Some(Step {
            frame: Extracted::Skip,
            consumed,
        });
    }
    Some(Step {
        frame: Extracted::Message(message),
        consumed,
    })
}

fn find_delimiter(window: &[u8]) -> Option<usize> {
    window
        .windows(FRAME_DELIMITER.len())
        .position(|w| w == FRAME_DELIMITER)
}

/// Split a payload into message and trailing metadata.
///
/// Scans backward until the byte ahead of the metadata region is the
/// closing `}` of the message envelope. A payload with no `}` at all is
/// treated as pure metadata. The peer frames with this exact heuristic
/// today, so it is preserved as-is; an explicit length-prefixed trailer
/// would be more robust but is a wire format change.
fn split_metadata(payload: &[u8]) -> (&[u8], &[u8]) {
    let mut split = payload.len();
    while split > 0 && payload[split - 1] != b'}' {
        split -= 1;
    }
    payload.split_at(split)
}

fn parse_crc_hex(digits: &[u8]) -> Option<u32> {
    let text = core::str::from_utf8(digits).ok()?;
    u32::from_str_radix(text, 16).ok()
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Append a delimited data frame carrying `payload` to `out`.
///
/// The trailer is always present on outgoing frames; only receive is
/// lenient about it.
pub fn encode_frame(payload: &[u8], out: &mut ByteQueue) {
    out.append(FRAME_DELIMITER);
    out.append(payload);
    out.append(format!("{:08x}", checksum(payload)).as_bytes());
    out.append(FRAME_DELIMITER);
}

/// Append the 5-byte readiness frame to `out`.
///
/// No checksum trailer: the peer recognises the frame by its single
/// control byte.
pub fn encode_handshake(out: &mut ByteQueue) {
    out.append(FRAME_DELIMITER);
    out.append(&[HANDSHAKE_BYTE]);
    out.append(FRAME_DELIMITER);
}
