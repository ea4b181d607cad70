//! Target formats and input sniffing.

use std::{
    fmt::{self, Display, Formatter},
    path::Path,
    str::FromStr,
};

use fontconv_font_type1::{Framing, Type1Font};

use crate::error::{ConvertError, Result};

/// Format to convert into, named by output file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetFormat {
    Ttf,
    Otf,
    Woff,
    Woff2,
    Pfa,
    Pfb,
}

impl TargetFormat {
    pub const ALL: [Self; 6] = [Self::Ttf, Self::Otf, Self::Woff, Self::Woff2, Self::Pfa, Self::Pfb];

    /// Case-insensitive lookup of a file extension (without the dot).
    pub fn from_extension(ext: &str) -> Result<Self> {
        let ext = ext.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|format| format.extension() == ext)
            .ok_or(ConvertError::UnsupportedFormat(ext))
    }

    /// Target implied by the text after the last `.` of the file name.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(|name| name.rsplit_once('.'))
            .map_or("", |(_, ext)| ext);
        Self::from_extension(ext)
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Ttf => "ttf",
            Self::Otf => "otf",
            Self::Woff => "woff",
            Self::Woff2 => "woff2",
            Self::Pfa => "pfa",
            Self::Pfb => "pfb",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Ttf => "font/ttf",
            Self::Otf => "font/otf",
            Self::Woff => "font/woff",
            Self::Woff2 => "font/woff2",
            Self::Pfa | Self::Pfb => "application/x-font-type1",
        }
    }

    pub fn is_type1(self) -> bool {
        self.type1_framing().is_some()
    }

    pub(crate) fn type1_framing(self) -> Option<Framing> {
        match self {
            Self::Pfa => Some(Framing::Pfa),
            Self::Pfb => Some(Framing::Pfb),
            _ => None,
        }
    }
}

impl Display for TargetFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for TargetFormat {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_extension(s.trim_start_matches('.'))
    }
}

/// What the input bytes look like.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceFormat {
    TrueType,
    Cff,
    Woff,
    Woff2,
    Collection,
    Pfb,
    Pfa,
    Unknown,
}

impl SourceFormat {
    pub fn detect(data: &[u8]) -> Self {
        match data.get(..4) {
            Some(b"\x00\x01\x00\x00") | Some(b"true") => Self::TrueType,
            Some(b"OTTO") => Self::Cff,
            Some(b"wOFF") => Self::Woff,
            Some(b"wOF2") => Self::Woff2,
            Some(b"ttcf") => Self::Collection,
            _ => match Type1Font::sniff(data) {
                Some(Framing::Pfb) => Self::Pfb,
                Some(Framing::Pfa) => Self::Pfa,
                None => Self::Unknown,
            },
        }
    }

    pub fn is_type1(self) -> bool {
        matches!(self, Self::Pfa | Self::Pfb)
    }
}

impl Display for SourceFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::TrueType => "TrueType",
            Self::Cff => "OpenType (CFF)",
            Self::Woff => "WOFF",
            Self::Woff2 => "WOFF2",
            Self::Collection => "font collection",
            Self::Pfb => "Type 1 (PFB)",
            Self::Pfa => "Type 1 (PFA)",
            Self::Unknown => "unrecognized",
        })
    }
}
