//! Serial port transport implementation

use crate::stream::{StreamAccessor, TransportLayer};
use async_trait::async_trait;
use sml_core::{SmlError, SmlResult};
use std::fmt;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio_serial::SerialStream;

/// Baud rate of SML optical read heads
pub const SML_DEFAULT_BAUD_RATE: u32 = 9600;

/// Wrapper for SerialStream that implements Debug
struct DebugSerialStream(SerialStream);

impl fmt::Debug for DebugSerialStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerialStream").finish()
    }
}

/// Serial port transport layer settings
#[derive(Debug, Clone)]
pub struct SerialSettings {
    pub port_name: String,
    pub baud_rate: u32,
    pub data_bits: tokio_serial::DataBits,
    pub stop_bits: tokio_serial::StopBits,
    pub parity: tokio_serial::Parity,
    pub flow_control: tokio_serial::FlowControl,
    pub timeout: Option<Duration>,
}

impl SerialSettings {
    /// Create new serial settings, 8N1 without flow control
    pub fn new(port_name: String, baud_rate: u32) -> Self {
        Self {
            port_name,
            baud_rate,
            data_bits: tokio_serial::DataBits::Eight,
            stop_bits: tokio_serial::StopBits::One,
            parity: tokio_serial::Parity::None,
            flow_control: tokio_serial::FlowControl::None,
            timeout: Some(Duration::from_secs(30)),
        }
    }

    /// Settings of a typical SML optical head: 9600 baud, 8N1
    pub fn sml_default(port_name: String) -> Self {
        Self::new(port_name, SML_DEFAULT_BAUD_RATE)
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Serial port transport layer implementation
#[derive(Debug)]
pub struct SerialTransport {
    stream: Option<DebugSerialStream>,
    settings: SerialSettings,
    closed: bool,
}

impl SerialTransport {
    /// Create a new serial transport layer
    pub fn new(settings: SerialSettings) -> Self {
        Self {
            stream: None,
            settings,
            closed: true,
        }
    }

    pub fn settings(&self) -> &SerialSettings {
        &self.settings
    }
}

fn not_connected() -> SmlError {
    SmlError::Connection(std::io::Error::new(
        std::io::ErrorKind::NotConnected,
        "Serial stream not connected",
    ))
}

#[async_trait]
impl TransportLayer for SerialTransport {
    async fn open(&mut self) -> SmlResult<()> {
        if !self.closed {
            return Err(SmlError::Connection(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Connection has already been opened",
            )));
        }

        let builder = tokio_serial::new(&self.settings.port_name, self.settings.baud_rate)
            .data_bits(self.settings.data_bits)
            .stop_bits(self.settings.stop_bits)
            .parity(self.settings.parity)
            .flow_control(self.settings.flow_control);

        let stream = SerialStream::open(&builder).map_err(|e| {
            SmlError::Connection(std::io::Error::other(format!(
                "Failed to open serial port {}: {}",
                self.settings.port_name, e
            )))
        })?;
        log::debug!(
            "Opened serial port {} at {} baud",
            self.settings.port_name,
            self.settings.baud_rate
        );

        self.stream = Some(DebugSerialStream(stream));
        self.closed = false;
        Ok(())
    }
}

#[async_trait]
impl StreamAccessor for SerialTransport {
    async fn set_timeout(&mut self, timeout: Option<Duration>) -> SmlResult<()> {
        self.settings.timeout = timeout;
        Ok(())
    }

    async fn read(&mut self, buf: &mut [u8]) -> SmlResult<usize> {
        let stream = &mut self.stream.as_mut().ok_or_else(not_connected)?.0;

        let result = if let Some(timeout) = self.settings.timeout {
            tokio::time::timeout(timeout, stream.read(buf))
                .await
                .map_err(|_| SmlError::Timeout)?
                .map_err(SmlError::Connection)
        } else {
            stream.read(buf).await.map_err(SmlError::Connection)
        };

        match result {
            Ok(0) => {
                self.closed = true;
                Ok(0)
            }
            Ok(n) => Ok(n),
            Err(e) => {
                self.closed = true;
                Err(e)
            }
        }
    }

    fn is_closed(&self) -> bool {
        self.closed
    }

    async fn close(&mut self) -> SmlResult<()> {
        self.stream = None;
        self.closed = true;
        Ok(())
    }
}
