use std::fmt;
use thiserror::Error;

/// Step of the package pipeline that rejected a package
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeStep {
    VerifyCrc,
    DecodeNodes,
    ExtractReading,
}

impl fmt::Display for DecodeStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DecodeStep::VerifyCrc => "CRC verification",
            DecodeStep::DecodeNodes => "node decoding",
            DecodeStep::ExtractReading => "reading extraction",
        };
        f.write_str(name)
    }
}

/// Main error type for SML operations
#[derive(Error, Debug)]
pub enum SmlError {
    #[error("Connection error: {0}")]
    Connection(#[from] std::io::Error),

    #[error("Timeout")]
    Timeout,

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Structural violation: {0}")]
    StructuralViolation(String),

    #[error("Length mismatch: {0}")]
    LengthMismatch(String),

    #[error("Unsupported scalar encoding: {0}")]
    UnsupportedScalarEncoding(String),

    #[error("CRC mismatch: computed 0x{actual:04X}, frame carries 0x{expected:04X}")]
    CrcMismatch { expected: u16, actual: u16 },

    #[error("SML package rejected during {step}: {source}")]
    Package {
        step: DecodeStep,
        #[source]
        source: Box<SmlError>,
    },
}

impl SmlError {
    /// Wrap an error with the pipeline step it came from
    pub fn in_step(self, step: DecodeStep) -> Self {
        SmlError::Package {
            step,
            source: Box::new(self),
        }
    }

    /// Innermost error, skipping any `Package` context
    pub fn root_cause(&self) -> &SmlError {
        match self {
            SmlError::Package { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

/// Result type alias for SML operations
pub type SmlResult<T> = Result<T, SmlError>;
