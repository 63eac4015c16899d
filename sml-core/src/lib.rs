//! Core types and utilities for the SML (Smart Message Language) protocol
//!
//! This crate provides the error type, OBIS codes and the reading record
//! shared by the codec, transport and client crates.

pub mod error;
pub mod obis_code;
pub mod reading;

pub use error::{DecodeStep, SmlError, SmlResult};
pub use obis_code::ObisCode;
pub use reading::Reading;
