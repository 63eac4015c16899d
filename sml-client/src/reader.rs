//! Meter reader driving transport reads and package decoding
//!
//! # Usage Example
//!
//! ```rust,no_run
//! use sml_client::MeterReader;
//! use sml_codec::ParserSettings;
//! use sml_transport::{SerialSettings, SerialTransport};
//!
//! # async fn run() -> sml_core::SmlResult<()> {
//! let transport = SerialTransport::new(SerialSettings::sml_default("/dev/ttyUSB0".to_string()));
//! let mut reader = MeterReader::new(transport, ParserSettings::default());
//! reader.open().await?;
//! let reading = reader.next_reading().await?;
//! println!("{:?}", reading);
//! # Ok(())
//! # }
//! ```

use sml_codec::{ParserSettings, ParserStatistics, SmlParser};
use sml_core::{Reading, SmlError, SmlResult};
use sml_transport::TransportLayer;

/// Bytes requested from the transport per read
pub const DEFAULT_READ_CHUNK_SIZE: usize = 512;

/// Reads SML transmissions from a transport and yields readings
#[derive(Debug)]
pub struct MeterReader<T: TransportLayer> {
    transport: T,
    parser: SmlParser,
    chunk_size: usize,
}

impl<T: TransportLayer> MeterReader<T> {
    pub fn new(transport: T, settings: ParserSettings) -> Self {
        Self {
            transport,
            parser: SmlParser::with_settings(settings),
            chunk_size: DEFAULT_READ_CHUNK_SIZE,
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Open the underlying transport
    pub async fn open(&mut self) -> SmlResult<()> {
        self.transport.open().await
    }

    /// Close the underlying transport
    pub async fn close(&mut self) -> SmlResult<()> {
        self.transport.close().await
    }

    /// Wait for the next successfully decoded reading
    ///
    /// Packages that fail to decode are logged and skipped. End of stream
    /// is reported as a connection error.
    pub async fn next_reading(&mut self) -> SmlResult<Reading> {
        let mut buf = vec![0u8; self.chunk_size];
        loop {
            loop {
                match self.parser.try_decode_next() {
                    Ok(Some(reading)) => return Ok(reading),
                    Ok(None) => break,
                    Err(e) => log::warn!("Skipping SML package: {}", e),
                }
            }

            let n = self.transport.read(&mut buf).await?;
            if n == 0 {
                return Err(SmlError::Connection(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    "Transport closed while waiting for SML data",
                )));
            }
            log::trace!("Data received: {}", hex::encode_upper(&buf[..n]));
            self.parser.push(&buf[..n]);
        }
    }

    pub fn statistics(&self) -> &ParserStatistics {
        self.parser.statistics()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }
}
