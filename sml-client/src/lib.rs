//! SML meter client
//!
//! This crate connects a transport to the SML codec: bytes read from the
//! meter are pushed into an [`SmlParser`](sml_codec::SmlParser) and complete
//! readings are handed to the caller.

pub mod reader;

pub use reader::{MeterReader, DEFAULT_READ_CHUNK_SIZE};
