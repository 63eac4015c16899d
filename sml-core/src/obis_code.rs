use crate::error::{SmlError, SmlResult};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// SML type-length byte of a 6-byte octet string (type 0, total length 7)
pub const OBIS_ELEMENT_HEADER: u8 = 0x07;

static REDUCED_FORMAT: Lazy<Result<Regex, regex::Error>> = Lazy::new(|| {
    Regex::new(r"^(\d{1,3})-(\d{1,3}):(\d{1,3})\.(\d{1,3})\.(\d{1,3})(?:\*(\d{1,3}))?$")
});

/// OBIS (Object Identification System) code for identifying metering quantities
///
/// OBIS codes are 6-byte identifiers. Inside an SML value list they are
/// transmitted as a 7-byte octet string element: the type-length byte
/// `0x07` followed by the six code bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObisCode {
    bytes: [u8; 6],
}

impl ObisCode {
    /// Create a new OBIS code from individual bytes
    ///
    /// # Arguments
    ///
    /// * `a` - First byte (A value, medium)
    /// * `b` - Second byte (B value, channel)
    /// * `c` - Third byte (C value, quantity)
    /// * `d` - Fourth byte (D value, processing)
    /// * `e` - Fifth byte (E value, tariff)
    /// * `f` - Sixth byte (F value, storage)
    pub const fn new(a: u8, b: u8, c: u8, d: u8, e: u8, f: u8) -> Self {
        Self {
            bytes: [a, b, c, d, e, f],
        }
    }

    /// Parse an OBIS code from string format
    ///
    /// Supports formats like:
    /// - "1.0.1.8.0.255"
    /// - "1-0:1.8.0*255"
    /// - "1-0:1.8.0" (F defaults to 255)
    ///
    /// # Returns
    ///
    /// Returns `Ok(ObisCode)` if parsing succeeds, `Err(SmlError)` otherwise
    pub fn from_string(s: &str) -> SmlResult<Self> {
        if let Ok(code) = Self::parse_dot_format(s) {
            return Ok(code);
        }

        if let Ok(code) = Self::parse_reduced_format(s) {
            return Ok(code);
        }

        Err(SmlError::InvalidData(format!("Invalid OBIS code format: {}", s)))
    }

    fn parse_dot_format(s: &str) -> SmlResult<Self> {
        let parts: Vec<&str> = s.split('.').collect();
        if parts.len() != 6 {
            return Err(SmlError::InvalidData(
                "Expected 6 dot-separated values".to_string(),
            ));
        }

        let mut bytes = [0u8; 6];
        for (i, part) in parts.iter().enumerate() {
            bytes[i] = parse_group(part)?;
        }

        Ok(Self { bytes })
    }

    fn parse_reduced_format(s: &str) -> SmlResult<Self> {
        let regex = REDUCED_FORMAT
            .as_ref()
            .map_err(|e| SmlError::InvalidData(format!("OBIS pattern unavailable: {}", e)))?;
        let caps = regex
            .captures(s)
            .ok_or_else(|| SmlError::InvalidData(format!("Not an A-B:C.D.E*F code: {}", s)))?;

        let mut bytes = [0u8; 6];
        for (i, byte) in bytes.iter_mut().take(5).enumerate() {
            *byte = parse_group(&caps[i + 1])?;
        }
        bytes[5] = match caps.get(6) {
            Some(f) => parse_group(f.as_str())?,
            None => 0xFF,
        };

        Ok(Self { bytes })
    }

    /// Build an OBIS code from a 7-byte SML identifier element
    pub fn from_element_bytes(data: &[u8]) -> SmlResult<Self> {
        match data {
            [OBIS_ELEMENT_HEADER, a, b, c, d, e, f] => Ok(Self::new(*a, *b, *c, *d, *e, *f)),
            _ => Err(SmlError::InvalidData(format!(
                "OBIS element must be 0x07 followed by 6 bytes, got {} bytes",
                data.len()
            ))),
        }
    }

    /// The 7 raw bytes of this code as it appears in an SML value list
    pub fn to_element_bytes(&self) -> [u8; 7] {
        let mut element = [OBIS_ELEMENT_HEADER; 7];
        element[1..].copy_from_slice(&self.bytes);
        element
    }

    /// Get the OBIS code as a byte array
    pub fn as_bytes(&self) -> &[u8; 6] {
        &self.bytes
    }

    pub fn a(&self) -> u8 {
        self.bytes[0]
    }

    pub fn b(&self) -> u8 {
        self.bytes[1]
    }

    pub fn c(&self) -> u8 {
        self.bytes[2]
    }

    pub fn d(&self) -> u8 {
        self.bytes[3]
    }

    pub fn e(&self) -> u8 {
        self.bytes[4]
    }

    pub fn f(&self) -> u8 {
        self.bytes[5]
    }
}

fn parse_group(part: &str) -> SmlResult<u8> {
    part.parse::<u8>()
        .map_err(|_| SmlError::InvalidData(format!("Invalid byte value: {}", part)))
}

impl fmt::Display for ObisCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}:{}.{}.{}*{}",
            self.bytes[0], self.bytes[1], self.bytes[2],
            self.bytes[3], self.bytes[4], self.bytes[5]
        )
    }
}
