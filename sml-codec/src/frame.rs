//! SML transport frame extraction
//!
//! An SML transmission is framed as
//!
//! ```text
//! 1B 1B 1B 1B 01 01 01 01 <package> 1B 1B 1B 1B 1A <fill count> <crc lo> <crc hi>
//! ```
//!
//! The framing bytes are not escaped inside the package, so a package that
//! happens to contain the end prefix is cut short at that point.

use crate::crc;
use bytes::{Buf, BytesMut};

/// Escape sequence plus version 1 marker opening a transmission
pub const START_MARKER: [u8; 8] = [0x1B, 0x1B, 0x1B, 0x1B, 0x01, 0x01, 0x01, 0x01];

/// Escape sequence plus end marker closing a transmission
pub const END_PREFIX: [u8; 5] = [0x1B, 0x1B, 0x1B, 0x1B, 0x1A];

/// Fill count byte plus two CRC bytes following the end prefix
pub const END_TRAILER_LENGTH: usize = 3;

/// One complete transmission cut out of the receive buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmlFrame {
    package: Vec<u8>,
    raw: Vec<u8>,
}

impl SmlFrame {
    /// Bytes strictly between the start marker and the end prefix
    pub fn package(&self) -> &[u8] {
        &self.package
    }

    pub fn into_package(self) -> Vec<u8> {
        self.package
    }

    /// Whole frame from the start marker through the CRC bytes
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// Number of padding bytes the sender declared in the trailer
    pub fn fill_count(&self) -> u8 {
        self.raw[self.raw.len() - END_TRAILER_LENGTH]
    }

    /// CRC transmitted in the trailer
    pub fn transmitted_crc(&self) -> u16 {
        crc::trailing_crc(&self.raw).unwrap_or_default()
    }

    /// Check the transmitted CRC against the frame contents
    pub fn verify_crc(&self) -> bool {
        crc::verify(&self.raw)
    }
}

/// Outcome of scanning the receive buffer once
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameScan {
    /// A complete frame was removed from the buffer
    Complete(SmlFrame),
    /// A start marker is present but the frame has not fully arrived; buffer untouched
    Incomplete,
    /// No start marker anywhere; the given number of bytes were discarded
    Noise(usize),
}

fn find(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    haystack
        .get(from..)?
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|i| i + from)
}

/// Scan `buffer` for the first complete frame and consume it
///
/// Bytes in front of the frame are dropped together with it, bytes after
/// the trailer stay in the buffer for the next call.
pub fn scan(buffer: &mut BytesMut) -> FrameScan {
    let Some(start) = find(buffer, &START_MARKER, 0) else {
        let discarded = buffer.len();
        if discarded > 0 {
            log::debug!("No SML start marker in {} buffered bytes, discarding", discarded);
        }
        buffer.clear();
        return FrameScan::Noise(discarded);
    };
    let package_start = start + START_MARKER.len();

    // The end prefix only counts once its trailer has arrived as well
    let search_limit = buffer.len().saturating_sub(END_TRAILER_LENGTH);
    let Some(end) = find(&buffer[..search_limit], &END_PREFIX, package_start) else {
        return FrameScan::Incomplete;
    };
    let frame_end = end + END_PREFIX.len() + END_TRAILER_LENGTH;

    if start > 0 {
        log::debug!("Skipping {} bytes in front of SML start marker", start);
    }
    buffer.advance(start);
    let raw = buffer.split_to(frame_end - start).to_vec();
    let package = raw[START_MARKER.len()..end - start].to_vec();
    log::trace!("Extracted SML package of {} bytes", package.len());

    FrameScan::Complete(SmlFrame { package, raw })
}

/// Extract the next package from `buffer`
///
/// Returns `None` when no complete frame is available yet. An empty
/// package (end prefix directly after the start marker) is returned as
/// `Some` of an empty vector, and its framing bytes are consumed.
pub fn extract_package(buffer: &mut BytesMut) -> Option<Vec<u8>> {
    match scan(buffer) {
        FrameScan::Complete(frame) => Some(frame.into_package()),
        FrameScan::Incomplete | FrameScan::Noise(_) => None,
    }
}
