//! Transport layer module for SML meters
//!
//! SML meters push their transmissions unsolicited, so a transport here is a
//! read-mostly byte stream. This crate provides the stream traits and a
//! serial port implementation for optical read heads.

pub mod serial;
pub mod stream;

pub use sml_core::error;
pub use sml_core::{SmlError, SmlResult};
pub use serial::{SerialSettings, SerialTransport, SML_DEFAULT_BAUD_RATE};
pub use stream::{StreamAccessor, TransportLayer};
