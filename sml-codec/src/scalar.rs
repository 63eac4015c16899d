//! Interpretation of scalar element bytes

use sml_core::{SmlError, SmlResult};

const TYPE_SIGNED: u8 = 0x05;
const TYPE_UNSIGNED: u8 = 0x06;

/// Decode an integer element
///
/// The header byte gives signedness (`5` signed, `6` unsigned) and the total
/// length, which selects the width: 2 bytes for 8-bit, 3 or 4 for 16-bit,
/// 5 or 6 for 32-bit. Payloads wider than the selected width keep their
/// least significant bytes.
pub fn decode_integer(element: &[u8]) -> SmlResult<i64> {
    let (&header, payload) = element
        .split_first()
        .ok_or_else(|| SmlError::UnsupportedScalarEncoding("Empty element".to_string()))?;
    let kind = header >> 4;
    let length = (header & 0x0F) as usize;

    if element.len() != length {
        return Err(SmlError::LengthMismatch(format!(
            "Integer header 0x{:02X} declares {} bytes, element has {}",
            header,
            length,
            element.len()
        )));
    }

    let raw = payload
        .iter()
        .fold(0u64, |acc, &byte| (acc << 8) | byte as u64);

    let value = match (kind, length) {
        (TYPE_SIGNED, 2) => raw as i8 as i64,
        (TYPE_SIGNED, 3..=4) => raw as i16 as i64,
        (TYPE_SIGNED, 5..=6) => raw as i32 as i64,
        (TYPE_UNSIGNED, 2) => raw as u8 as i64,
        (TYPE_UNSIGNED, 3..=4) => raw as u16 as i64,
        (TYPE_UNSIGNED, 5..=6) => raw as u32 as i64,
        _ => {
            return Err(SmlError::UnsupportedScalarEncoding(format!(
                "Cannot decode integer with header 0x{:02X}",
                header
            )));
        }
    };
    Ok(value)
}

/// Render every byte of the element, header included, as uppercase hex
pub fn decode_hex_string(element: &[u8]) -> String {
    hex::encode_upper(element)
}
