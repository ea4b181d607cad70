use std::result;

/// Errors raised while reading or writing Type 1 fonts.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("not a Type 1 font")]
    NotType1,

    #[error("unexpected byte {found:#04x} at offset {offset}, expected PFB segment marker")]
    BadSegmentMarker { offset: usize, found: u8 },

    #[error("unknown PFB segment type {0}")]
    BadSegmentType(u8),

    #[error("font data truncated at offset {0}")]
    Truncated(usize),

    #[error("no eexec section found")]
    MissingEexec,

    #[error("can't find end of eexec part")]
    MissingEexecEnd,

    #[error("invalid hex digit {0:?} in eexec section")]
    BadHex(char),

    #[error("odd number of hex digits in eexec section")]
    OddHexLength,
}

pub type Result<T> = result::Result<T, Error>;
