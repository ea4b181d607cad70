//! Error types for WOFF wrapping.

use std::{io, result};

use read_fonts::{ReadError, types::Tag};

/// Errors that can occur while encoding or decoding WOFF 1.0 data.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to parse font: {0}")]
    Parse(#[from] ReadError),

    #[error("not a WOFF file (signature {0:#010x})")]
    BadSignature(u32),

    #[error("WOFF data truncated: expected {expected} bytes, found {actual}")]
    Truncated { expected: usize, actual: usize },

    #[error("table '{0}' lies outside the WOFF data")]
    TableOutOfBounds(Tag),

    #[error("table '{0}' has a compressed length larger than its original length")]
    BadCompressedLength(Tag),

    #[error("table '{tag}' inflated to {actual} bytes, expected {expected}")]
    LengthMismatch { tag: Tag, expected: u32, actual: usize },

    #[error("table '{tag}' would grow the decoded font past {limit} bytes")]
    TooLarge { tag: Tag, limit: usize },

    #[error("zlib stream error: {0}")]
    Zlib(#[from] io::Error),
}

pub type Result<T> = result::Result<T, Error>;
