//! PostScript Type 1 fonts in PFA and PFB framing.
//!
//! A Type 1 program is a cleartext PostScript header followed by an
//! eexec-encrypted section and a trailer of zeros plus `cleartomark`.
//! PFB stores the encrypted section as binary inside length-prefixed
//! segments; PFA stores it as hex text. This crate moves a font between the
//! two without interpreting the PostScript.
//!
//! ```no_run
//! use fontconv_font_type1::Type1Font;
//!
//! let pfb = std::fs::read("font.pfb").unwrap();
//! let font = Type1Font::parse(&pfb).unwrap();
//! std::fs::write("font.pfa", font.to_pfa()).unwrap();
//! ```

pub mod eexec;
mod error;

use log::debug;

pub use error::{Error, Result};

use crate::eexec::{EEXEC_KEY, decrypt};

const PFB_MARKER: u8 = 0x80;
const PFB_ASCII: u8 = 1;
const PFB_BINARY: u8 = 2;
const PFB_EOF: u8 = 3;

const EEXEC: &[u8] = b"currentfile eexec";
const CLOSEFILE: &[u8] = b"currentfile closefile";
/// Zeros in the trailer that ends an eexec section; whitespace may separate them.
const ZERO_RUN: usize = 512;

/// Bytes of ciphertext written per PFA line (80 hex digits).
const PFA_LINE_BYTES: usize = 40;

/// Which framing a Type 1 font is stored in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    /// Printer Font ASCII: encrypted part as hex text.
    Pfa,
    /// Printer Font Binary: length-prefixed segments.
    Pfb,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    Ascii,
    Binary,
}

/// A run of cleartext or eexec ciphertext.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub kind: SegmentKind,
    pub data: Vec<u8>,
}

/// A Type 1 font split into cleartext and encrypted segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Type1Font {
    segments: Vec<Segment>,
}

impl Type1Font {
    /// Parse a PFB (leading `0x80`) or PFA font.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.first() == Some(&PFB_MARKER) { Self::from_pfb(data) } else { Self::from_pfa(data) }
    }

    /// Framing of the given data, judged by its first bytes.
    pub fn sniff(data: &[u8]) -> Option<Framing> {
        match data {
            [PFB_MARKER, PFB_ASCII, ..] => Some(Framing::Pfb),
            [b'%', b'!', ..] => Some(Framing::Pfa),
            _ => None,
        }
    }

    pub fn from_pfb(data: &[u8]) -> Result<Self> {
        let mut font = Self { segments: Vec::new() };
        let mut pos = 0;

        while pos < data.len() {
            let (marker, kind) = match data.get(pos..pos + 2) {
                Some(&[marker, kind]) => (marker, kind),
                _ => return Err(Error::Truncated(pos)),
            };
            if marker != PFB_MARKER {
                return Err(Error::BadSegmentMarker { offset: pos, found: marker });
            }

            let kind = match kind {
                PFB_ASCII => SegmentKind::Ascii,
                PFB_BINARY => SegmentKind::Binary,
                PFB_EOF => break,
                other => return Err(Error::BadSegmentType(other)),
            };

            let len_bytes = data.get(pos + 2..pos + 6).ok_or(Error::Truncated(pos + 2))?;
            let len = u32::from_le_bytes([len_bytes[0], len_bytes[1], len_bytes[2], len_bytes[3]])
                as usize;
            let start = pos + 6;
            let body = data.get(start..start + len).ok_or(Error::Truncated(start))?;
            font.push(kind, body);
            pos = start + len;
        }

        font.check_header()?;
        Ok(font)
    }

    pub fn from_pfa(data: &[u8]) -> Result<Self> {
        if !data.starts_with(b"%!") {
            return Err(Error::NotType1);
        }

        let mut font = Self { segments: Vec::new() };
        let mut rest = data;

        while let Some(found) = find(rest, EEXEC) {
            let keyword_end = found + EEXEC.len();
            let hex_start = keyword_end + leading_whitespace(&rest[keyword_end..]);
            let zeros = find_zero_run(&rest[keyword_end..])
                .map(|i| keyword_end + i)
                .ok_or(Error::MissingEexecEnd)?;

            let (begin, cipher) = if hex_start < zeros && is_hex(&rest[hex_start..zeros]) {
                (hex_start, dehex(&rest[hex_start..zeros])?)
            } else {
                // binary eexec data directly after a single separator byte
                let begin = (keyword_end + 1).min(zeros);
                (begin, rest[begin..zeros].to_vec())
            };

            let plain = decrypt(&cipher, EEXEC_KEY);
            let local_end = find(&plain, CLOSEFILE).ok_or(Error::MissingEexecEnd)?;
            let cut = (local_end + CLOSEFILE.len() + 1).min(cipher.len());
            debug!("eexec section: {} encrypted bytes", cut);

            font.push(SegmentKind::Ascii, &rest[..begin]);
            font.push(SegmentKind::Binary, &cipher[..cut]);
            rest = &rest[zeros..];
        }

        if !font.segments.iter().any(|s| s.kind == SegmentKind::Binary) {
            return Err(Error::MissingEexec);
        }
        font.push(SegmentKind::Ascii, rest);
        Ok(font)
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Serialize in the requested framing.
    pub fn write(&self, framing: Framing) -> Vec<u8> {
        match framing {
            Framing::Pfa => self.to_pfa(),
            Framing::Pfb => self.to_pfb(),
        }
    }

    pub fn to_pfb(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for segment in &self.segments {
            let kind = match segment.kind {
                SegmentKind::Ascii => PFB_ASCII,
                SegmentKind::Binary => PFB_BINARY,
            };
            out.extend_from_slice(&[PFB_MARKER, kind]);
            out.extend_from_slice(&(segment.data.len() as u32).to_le_bytes());
            out.extend_from_slice(&segment.data);
        }
        out.extend_from_slice(&[PFB_MARKER, PFB_EOF]);
        out
    }

    /// Hex-encode the encrypted segments, 80 digits per `\r`-terminated line.
    pub fn to_pfa(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for segment in &self.segments {
            match segment.kind {
                SegmentKind::Ascii => out.extend_from_slice(&segment.data),
                SegmentKind::Binary => {
                    for line in segment.data.chunks(PFA_LINE_BYTES) {
                        for byte in line {
                            out.extend_from_slice(format!("{byte:02x}").as_bytes());
                        }
                        out.push(b'\r');
                    }
                }
            }
        }
        out
    }

    /// The `/FontName` declared in the cleartext header.
    pub fn font_name(&self) -> Option<String> {
        let header = self.segments.iter().find(|s| s.kind == SegmentKind::Ascii)?;
        let start = find(&header.data, b"/FontName")? + b"/FontName".len();
        let after = &header.data[start..];
        let after = &after[leading_whitespace(after)..];
        let name = after.strip_prefix(b"/")?;
        let len = name
            .iter()
            .position(|b| b.is_ascii_whitespace() || b"/[]{}()<>%".contains(b))
            .unwrap_or(name.len());
        (len > 0).then(|| String::from_utf8_lossy(&name[..len]).into_owned())
    }

    fn push(&mut self, kind: SegmentKind, data: &[u8]) {
        if data.is_empty() {
            return;
        }
        match self.segments.last_mut() {
            Some(last) if last.kind == kind => last.data.extend_from_slice(data),
            _ => self.segments.push(Segment { kind, data: data.to_vec() }),
        }
    }

    fn check_header(&self) -> Result<()> {
        match self.segments.first() {
            Some(Segment { kind: SegmentKind::Ascii, data }) if data.starts_with(b"%!") => Ok(()),
            _ => Err(Error::NotType1),
        }
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Start of the first run of [`ZERO_RUN`] zeros, ignoring whitespace inside it.
///
/// A run only starts at the beginning of a whitespace-separated word, so
/// trailing `0` digits of the ciphertext are never taken for the trailer.
fn find_zero_run(data: &[u8]) -> Option<usize> {
    let mut run = 0;
    let mut start = 0;
    let mut after_space = true;
    for (i, &b) in data.iter().enumerate() {
        if b == b'0' && (run > 0 || after_space) {
            if run == 0 {
                start = i;
            }
            run += 1;
            if run == ZERO_RUN {
                return Some(start);
            }
        } else if !b.is_ascii_whitespace() {
            run = 0;
        }
        after_space = b.is_ascii_whitespace();
    }
    None
}

fn leading_whitespace(data: &[u8]) -> usize {
    data.iter().take_while(|b| b.is_ascii_whitespace()).count()
}

fn is_hex(data: &[u8]) -> bool {
    data.len() >= 4 && data[..4].iter().all(u8::is_ascii_hexdigit)
}

fn dehex(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(data.len() / 2);
    let mut high = None;
    for &b in data {
        if b.is_ascii_whitespace() {
            continue;
        }
        let nibble = (b as char).to_digit(16).ok_or(Error::BadHex(b as char))? as u8;
        match high.take() {
            None => high = Some(nibble),
            Some(h) => out.push(h << 4 | nibble),
        }
    }
    if high.is_some() {
        return Err(Error::OddHexLength);
    }
    Ok(out)
}
