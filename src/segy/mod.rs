//! Minimal big-endian SEG-Y (rev 0 / rev 1) trace source.
//!
//! Only what the plotter needs is decoded: the textual header, the sample
//! geometry from the binary header, a handful of trace header words and the
//! samples themselves.

pub mod ebcdic;
pub mod reader;
pub mod writer;

use std::io;
use thiserror::Error;

pub use reader::{BinaryHeader, SegyDataset, read_from, read_path};

pub const TEXT_HEADER_LEN: usize = 3200;
pub const BINARY_HEADER_LEN: usize = 400;
pub const TRACE_HEADER_LEN: usize = 240;

#[derive(Error, Debug)]
pub enum SegyError {
    #[error("I/O error reading SEG-Y: {0}")]
    Io(#[from] io::Error),

    #[error("file ends inside the {0} header")]
    MissingHeader(&'static str),

    #[error("unsupported SEG-Y sample format code {0}")]
    UnsupportedFormat(i16),

    #[error("variable-length extended textual headers are not supported")]
    VariableExtendedHeaders,

    #[error("trace {trace_index} is truncated: expected {expected} bytes, got {found}")]
    Truncated {
        trace_index: usize,
        expected: usize,
        found: usize,
    },

    #[error("trace {trace_index} has {samples} samples, more than SEG-Y can describe")]
    TooManySamples { trace_index: usize, samples: usize },
}

/// Data sample format code (binary header bytes 3225-3226).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SampleFormat {
    IbmFloat,
    Int32,
    Int16,
    IeeeFloat,
    Int8,
}

impl SampleFormat {
    pub fn from_code(code: i16) -> Result<Self, SegyError> {
        match code {
            1 => Ok(Self::IbmFloat),
            2 => Ok(Self::Int32),
            3 => Ok(Self::Int16),
            5 => Ok(Self::IeeeFloat),
            8 => Ok(Self::Int8),
            other => Err(SegyError::UnsupportedFormat(other)),
        }
    }

    pub fn code(self) -> i16 {
        match self {
            Self::IbmFloat => 1,
            Self::Int32 => 2,
            Self::Int16 => 3,
            Self::IeeeFloat => 5,
            Self::Int8 => 8,
        }
    }

    pub fn bytes_per_sample(self) -> usize {
        match self {
            Self::IbmFloat | Self::Int32 | Self::IeeeFloat => 4,
            Self::Int16 => 2,
            Self::Int8 => 1,
        }
    }
}
