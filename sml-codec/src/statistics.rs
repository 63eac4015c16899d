//! Parser statistics collection

/// Counters maintained by [`SmlParser`](crate::parser::SmlParser)
///
/// Statistics are updated on every decode cycle and can be queried at any
/// time to judge the quality of the serial link.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParserStatistics {
    /// Complete frames cut out of the receive buffer
    pub frames_extracted: u64,
    /// Frames whose package was empty
    pub empty_packages: u64,
    /// Packages turned into a reading
    pub readings_decoded: u64,
    /// Packages dropped because a decode step failed
    pub packages_rejected: u64,
    /// Packages dropped because of a CRC mismatch (also counted as rejected)
    pub crc_errors: u64,
    /// Bytes thrown away because no start marker preceded them
    pub noise_bytes_discarded: u64,
    /// Times the receive buffer hit its size limit and was reset
    pub buffer_overflows: u64,
}

impl ParserStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset all counters to zero
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Percentage of extracted non-empty packages that were rejected
    ///
    /// Returns 0.0 if no package has been seen yet.
    pub fn error_rate(&self) -> f64 {
        let total = self.frames_extracted.saturating_sub(self.empty_packages);
        if total == 0 {
            0.0
        } else {
            (self.packages_rejected as f64 / total as f64) * 100.0
        }
    }
}
