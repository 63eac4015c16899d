//! SML - Rust implementation of the Smart Message Language meter protocol
//!
//! This library decodes the binary SML transmissions that electricity
//! meters push over their optical interface into flat readings.
//!
//! # Architecture
//!
//! This library is organized as a workspace with multiple crates:
//!
//! - `sml-core`: Error type, OBIS codes, reading record
//! - `sml-codec`: Framing, CRC-16/X.25, node tree decoding, reading extraction
//! - `sml-transport`: Transport layer (Serial)
//! - `sml-client`: Meter reader combining transport and codec
//!
//! # Usage
//!
//! ```
//! use sml::SmlParser;
//!
//! let mut parser = SmlParser::new();
//! parser.push(&[0x1B, 0x1B, 0x1B, 0x1B, 0x01, 0x01, 0x01, 0x01]);
//! assert!(parser.try_decode_next().unwrap().is_none());
//! ```

// Re-export core types
pub use sml_core::{DecodeStep, ObisCode, Reading, SmlError, SmlResult};

// Re-export the codec entry points
pub use sml_codec::{
    crc, decode_package, extract_package, FrameScan, Node, ParserSettings, ParserStatistics,
    SmlFrame, SmlParser,
};

pub mod codec {
    pub use sml_codec::*;
}

pub mod transport {
    pub use sml_transport::*;
}

pub mod client {
    pub use sml_client::*;
}
