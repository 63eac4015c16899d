//! CRC-16/X.25 checksum used by the SML transport layer

const INITIAL_CRC: u16 = 0xFFFF;
const KEY: u16 = 0x8408; // Bit-reversed 1021

/// Precomputed CRC table
static CRC_TABLE: once_cell::sync::Lazy<[u16; 256]> = once_cell::sync::Lazy::new(|| {
    let mut table = [0u16; 256];
    for b in 0..=0xFF {
        let mut v = b as u16;
        for _ in 0..8 {
            if (v & 1) == 1 {
                v = (v >> 1) ^ KEY;
            } else {
                v >>= 1;
            }
        }
        table[b as usize] = v;
    }
    table
});

/// Incremental CRC-16/X.25 calculator
#[derive(Debug, Clone)]
pub struct CrcCalc {
    register: u16,
}

impl CrcCalc {
    pub fn new() -> Self {
        Self {
            register: INITIAL_CRC,
        }
    }

    /// Reset the register to its initial state
    pub fn reset(&mut self) {
        self.register = INITIAL_CRC;
    }

    /// Update the register with a single byte
    pub fn update(&mut self, data: u8) {
        self.register =
            (self.register >> 8) ^ CRC_TABLE[((self.register ^ data as u16) & 0xFF) as usize];
    }

    /// Update the register with multiple bytes
    pub fn update_bytes(&mut self, data: &[u8]) {
        for &byte in data {
            self.update(byte);
        }
    }

    /// Final checksum (register XOR 0xFFFF)
    pub fn value(&self) -> u16 {
        self.register ^ 0xFFFF
    }

    /// Final checksum as transmitted (little-endian)
    pub fn value_bytes(&self) -> [u8; 2] {
        self.value().to_le_bytes()
    }
}

impl Default for CrcCalc {
    fn default() -> Self {
        Self::new()
    }
}

/// Compute the CRC over `length` bytes of `data` starting at `offset`
///
/// The range is clamped to the end of `data`.
pub fn compute(data: &[u8], offset: usize, length: usize) -> u16 {
    let end = offset.saturating_add(length).min(data.len());
    let mut calc = CrcCalc::new();
    calc.update_bytes(data.get(offset..end).unwrap_or_default());
    calc.value()
}

/// Checksum carried in the last two bytes of `buffer` (little-endian)
pub fn trailing_crc(buffer: &[u8]) -> Option<u16> {
    match buffer {
        [.., lo, hi] => Some(u16::from_le_bytes([*lo, *hi])),
        _ => None,
    }
}

/// Check that the last two bytes of `buffer` hold the CRC of everything before them
pub fn verify(buffer: &[u8]) -> bool {
    match trailing_crc(buffer) {
        Some(expected) => compute(buffer, 0, buffer.len() - 2) == expected,
        None => false,
    }
}
