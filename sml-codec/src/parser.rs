//! Push/poll facade over framing, decoding and extraction

use crate::crc;
use crate::extract;
use crate::frame::{self, FrameScan, SmlFrame};
use crate::node;
use crate::statistics::ParserStatistics;
use bytes::BytesMut;
use sml_core::{DecodeStep, Reading, SmlError, SmlResult};

/// Default upper bound for buffered, not yet framed bytes
pub const DEFAULT_MAX_BUFFER_SIZE: usize = 64 * 1024;

/// Parser configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserSettings {
    /// Reject frames whose trailer CRC does not match
    pub verify_crc: bool,
    /// Buffered bytes allowed before the buffer is reset
    pub max_buffer_size: usize,
}

impl ParserSettings {
    pub fn new() -> Self {
        Self {
            verify_crc: false,
            max_buffer_size: DEFAULT_MAX_BUFFER_SIZE,
        }
    }

    pub fn with_verify_crc(mut self, verify_crc: bool) -> Self {
        self.verify_crc = verify_crc;
        self
    }

    pub fn with_max_buffer_size(mut self, max_buffer_size: usize) -> Self {
        self.max_buffer_size = max_buffer_size;
        self
    }
}

impl Default for ParserSettings {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode one package (the bytes between the frame markers) into a reading
pub fn decode_package(package: &[u8]) -> SmlResult<Reading> {
    let nodes = node::decode(package).map_err(|e| e.in_step(DecodeStep::DecodeNodes))?;
    extract::extract(&nodes).map_err(|e| e.in_step(DecodeStep::ExtractReading))
}

/// Stateful SML parser owning the receive buffer
///
/// The transport pushes raw chunks in, the caller polls
/// [`try_decode_next`](Self::try_decode_next) after each push. A failed
/// package is dropped as a whole; the next poll continues behind it.
#[derive(Debug, Default)]
pub struct SmlParser {
    buffer: BytesMut,
    settings: ParserSettings,
    statistics: ParserStatistics,
}

impl SmlParser {
    pub fn new() -> Self {
        Self::with_settings(ParserSettings::default())
    }

    pub fn with_settings(settings: ParserSettings) -> Self {
        Self {
            buffer: BytesMut::with_capacity(4096),
            settings,
            statistics: ParserStatistics::new(),
        }
    }

    /// Append received bytes to the buffer
    ///
    /// When the buffer would grow past `max_buffer_size` it is reset, and of
    /// the new chunk only the last `max_buffer_size` bytes are kept.
    pub fn push(&mut self, bytes: &[u8]) {
        let max = self.settings.max_buffer_size;
        if self.buffer.len() + bytes.len() <= max {
            self.buffer.extend_from_slice(bytes);
            return;
        }

        log::warn!(
            "SML receive buffer exceeds {} bytes without a complete frame, resetting",
            max
        );
        self.buffer.clear();
        self.statistics.buffer_overflows += 1;
        self.buffer.extend_from_slice(&bytes[bytes.len().saturating_sub(max)..]);
    }

    /// Decode the next complete package in the buffer
    ///
    /// Returns `Ok(None)` when no complete frame is buffered. Empty packages
    /// are consumed and skipped. A package that fails to decode is consumed
    /// and reported as an error.
    pub fn try_decode_next(&mut self) -> SmlResult<Option<Reading>> {
        loop {
            let frame = match frame::scan(&mut self.buffer) {
                FrameScan::Complete(frame) => frame,
                FrameScan::Incomplete => return Ok(None),
                FrameScan::Noise(discarded) => {
                    self.statistics.noise_bytes_discarded += discarded as u64;
                    return Ok(None);
                }
            };
            self.statistics.frames_extracted += 1;

            if frame.package().is_empty() {
                log::debug!("Skipping empty SML package");
                self.statistics.empty_packages += 1;
                continue;
            }

            return match self.decode_frame(&frame) {
                Ok(reading) => {
                    self.statistics.readings_decoded += 1;
                    Ok(Some(reading))
                }
                Err(e) => {
                    self.statistics.packages_rejected += 1;
                    if matches!(e.root_cause(), SmlError::CrcMismatch { .. }) {
                        self.statistics.crc_errors += 1;
                    }
                    log::warn!("Discarding SML package of {} bytes: {}", frame.package().len(), e);
                    Err(e)
                }
            };
        }
    }

    /// Run CRC check (if enabled), node decoding and extraction on one frame
    pub fn decode_frame(&self, frame: &SmlFrame) -> SmlResult<Reading> {
        if self.settings.verify_crc && !frame.verify_crc() {
            let raw = frame.raw();
            let err = SmlError::CrcMismatch {
                expected: frame.transmitted_crc(),
                actual: crc::compute(raw, 0, raw.len() - 2),
            };
            return Err(err.in_step(DecodeStep::VerifyCrc));
        }
        decode_package(frame.package())
    }

    /// Bytes currently buffered
    pub fn buffered(&self) -> &[u8] {
        &self.buffer
    }

    /// Drop everything buffered
    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    pub fn settings(&self) -> &ParserSettings {
        &self.settings
    }

    pub fn statistics(&self) -> &ParserStatistics {
        &self.statistics
    }
}
