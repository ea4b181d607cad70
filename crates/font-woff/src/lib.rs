//! WOFF 1.0 wrapping for sfnt fonts.
//!
//! The sfnt tables themselves are never touched: each one is zlib-compressed
//! (when that makes it smaller) and placed behind a WOFF header and table
//! directory. Decoding reverses that and hands the tables to
//! [`write_fonts::FontBuilder`] to produce a regular sfnt again.
//!
//! ```no_run
//! let ttf = std::fs::read("input.ttf").unwrap();
//! let woff = fontconv_font_woff::encode(&ttf).unwrap();
//! let back = fontconv_font_woff::decode(&woff).unwrap();
//! ```

mod error;

use std::io::{Read, Write};

use flate2::{Compression, read::ZlibDecoder, write::ZlibEncoder};
use fontconv_font_ops::set_sfnt_version;
use log::debug;
use read_fonts::{FontData, FontRef, TableProvider, types::Tag};
use write_fonts::FontBuilder;

pub use error::{Error, Result};

/// `wOFF`
pub const WOFF_SIGNATURE: u32 = 0x774F_4646;

const HEADER_SIZE: usize = 44;
const DIRECTORY_ENTRY_SIZE: usize = 20;
const SFNT_HEADER_SIZE: usize = 12;
const SFNT_RECORD_SIZE: usize = 16;

/// Upper bound on the decoded sfnt, checked before anything is inflated.
pub const MAX_SFNT_SIZE: usize = 128 * 1024 * 1024;

/// One table as it will be laid out in the WOFF file.
struct Entry {
    tag: Tag,
    checksum: u32,
    orig_length: u32,
    data: Vec<u8>,
}

/// Wrap an sfnt (TrueType or CFF flavored) as WOFF 1.0.
///
/// The WOFF major/minor version is taken from `head.fontRevision`. No
/// extended metadata or private data block is written.
pub fn encode(sfnt: &[u8]) -> Result<Vec<u8>> {
    let font = FontRef::new(sfnt)?;
    let flavor = font.table_directory.sfnt_version();
    let (major, minor) = version_from_head(&font);

    let mut records: Vec<_> = font.table_directory.table_records().iter().collect();
    records.sort_by_key(|record| record.tag());

    let mut entries = Vec::with_capacity(records.len());
    for record in records {
        let tag = record.tag();
        let Some(table) = font.table_data(tag) else {
            return Err(Error::TableOutOfBounds(tag));
        };
        let original = table.as_bytes();
        let compressed = deflate(original)?;
        let data = if compressed.len() < original.len() { compressed } else { original.to_vec() };
        debug!("{tag}: {} -> {} bytes", original.len(), data.len());
        entries.push(Entry {
            tag,
            checksum: record.checksum(),
            orig_length: original.len() as u32,
            data,
        });
    }

    let total_sfnt_size = SFNT_HEADER_SIZE
        + SFNT_RECORD_SIZE * entries.len()
        + entries.iter().map(|e| align4(e.orig_length as usize)).sum::<usize>();

    let directory_end = HEADER_SIZE + DIRECTORY_ENTRY_SIZE * entries.len();
    let mut offsets = Vec::with_capacity(entries.len());
    let mut cursor = directory_end;
    for entry in &entries {
        offsets.push(cursor);
        cursor += align4(entry.data.len());
    }
    let total_length = cursor;

    let mut out = Vec::with_capacity(total_length);
    out.extend_from_slice(&WOFF_SIGNATURE.to_be_bytes());
    out.extend_from_slice(&flavor.to_be_bytes());
    out.extend_from_slice(&(total_length as u32).to_be_bytes());
    out.extend_from_slice(&(entries.len() as u16).to_be_bytes());
    out.extend_from_slice(&0u16.to_be_bytes());
    out.extend_from_slice(&(total_sfnt_size as u32).to_be_bytes());
    out.extend_from_slice(&major.to_be_bytes());
    out.extend_from_slice(&minor.to_be_bytes());
    // metaOffset, metaLength, metaOrigLength, privOffset, privLength
    out.extend_from_slice(&[0u8; 20]);

    for (entry, offset) in entries.iter().zip(&offsets) {
        out.extend_from_slice(&entry.tag.to_be_bytes());
        out.extend_from_slice(&(*offset as u32).to_be_bytes());
        out.extend_from_slice(&(entry.data.len() as u32).to_be_bytes());
        out.extend_from_slice(&entry.orig_length.to_be_bytes());
        out.extend_from_slice(&entry.checksum.to_be_bytes());
    }

    for entry in &entries {
        out.extend_from_slice(&entry.data);
        out.resize(align4(out.len()), 0);
    }

    debug_assert_eq!(out.len(), total_length);
    Ok(out)
}

/// Unwrap WOFF 1.0 data back into a plain sfnt.
///
/// The sfnt keeps the WOFF flavor as its version. Extended metadata and
/// private data blocks are ignored.
pub fn decode(woff: &[u8]) -> Result<Vec<u8>> {
    if woff.len() < HEADER_SIZE {
        return Err(Error::Truncated { expected: HEADER_SIZE, actual: woff.len() });
    }

    let data = FontData::new(woff);
    let signature: u32 = data.read_at(0)?;
    if signature != WOFF_SIGNATURE {
        return Err(Error::BadSignature(signature));
    }

    let flavor: u32 = data.read_at(4)?;
    let declared_length = data.read_at::<u32>(8)? as usize;
    if woff.len() < declared_length {
        return Err(Error::Truncated { expected: declared_length, actual: woff.len() });
    }

    let num_tables = data.read_at::<u16>(12)? as usize;
    let directory_end = HEADER_SIZE + DIRECTORY_ENTRY_SIZE * num_tables;
    if woff.len() < directory_end {
        return Err(Error::Truncated { expected: directory_end, actual: woff.len() });
    }

    let mut builder = FontBuilder::new();
    let mut decoded_size = 0usize;
    for index in 0..num_tables {
        let base = HEADER_SIZE + DIRECTORY_ENTRY_SIZE * index;
        let tag: Tag = data.read_at(base)?;
        let offset = data.read_at::<u32>(base + 4)? as usize;
        let comp_length = data.read_at::<u32>(base + 8)? as usize;
        let orig_length: u32 = data.read_at(base + 12)?;

        let stored = offset
            .checked_add(comp_length)
            .and_then(|end| woff.get(offset..end))
            .ok_or(Error::TableOutOfBounds(tag))?;

        decoded_size = decoded_size.saturating_add(orig_length as usize);
        if decoded_size > MAX_SFNT_SIZE {
            return Err(Error::TooLarge { tag, limit: MAX_SFNT_SIZE });
        }

        let table = match comp_length.cmp(&(orig_length as usize)) {
            std::cmp::Ordering::Equal => stored.to_vec(),
            std::cmp::Ordering::Less => inflate(stored, tag, orig_length)?,
            std::cmp::Ordering::Greater => return Err(Error::BadCompressedLength(tag)),
        };
        builder.add_raw(tag, table);
    }

    let mut sfnt = builder.build();
    set_sfnt_version(&mut sfnt, flavor);
    Ok(sfnt)
}

fn version_from_head(font: &FontRef) -> (u16, u16) {
    match font.head() {
        Ok(head) => {
            let bits = head.font_revision().to_bits() as u32;
            ((bits >> 16) as u16, (bits & 0xFFFF) as u16)
        }
        Err(_) => (0, 0),
    }
}

fn deflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

fn inflate(data: &[u8], tag: Tag, expected: u32) -> Result<Vec<u8>> {
    // one byte past `expected` is enough to tell the stream is too long
    let mut out = Vec::with_capacity(expected as usize);
    ZlibDecoder::new(data).take(u64::from(expected) + 1).read_to_end(&mut out)?;
    if out.len() != expected as usize {
        return Err(Error::LengthMismatch { tag, expected, actual: out.len() });
    }
    Ok(out)
}

fn align4(len: usize) -> usize {
    (len + 3) & !3
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_u32(data: &[u8], offset: usize) -> u32 {
        u32::from_be_bytes(data[offset..offset + 4].try_into().unwrap())
    }

    fn read_u16(data: &[u8], offset: usize) -> u16 {
        u16::from_be_bytes(data[offset..offset + 2].try_into().unwrap())
    }

    #[test]
    fn test_encode_header() {
        let sfnt = font_test_data::CMAP12_FONT1;
        let font = FontRef::new(sfnt).unwrap();
        let woff = encode(sfnt).unwrap();

        assert_eq!(read_u32(&woff, 0), WOFF_SIGNATURE);
        assert_eq!(read_u32(&woff, 4), font.table_directory.sfnt_version());
        assert_eq!(read_u32(&woff, 8) as usize, woff.len());
        assert_eq!(read_u16(&woff, 12) as usize, font.table_directory.table_records().len());
        assert_eq!(woff.len() % 4, 0);
    }

    #[test]
    fn test_directory_is_sorted_and_never_grows() {
        let woff = encode(font_test_data::CMAP12_FONT1).unwrap();
        let num_tables = read_u16(&woff, 12) as usize;

        let mut previous = [0u8; 4];
        for index in 0..num_tables {
            let base = HEADER_SIZE + DIRECTORY_ENTRY_SIZE * index;
            let tag: [u8; 4] = woff[base..base + 4].try_into().unwrap();
            assert!(tag > previous, "directory not sorted at entry {index}");
            previous = tag;

            let offset = read_u32(&woff, base + 4) as usize;
            let comp_length = read_u32(&woff, base + 8);
            let orig_length = read_u32(&woff, base + 12);
            assert_eq!(offset % 4, 0);
            assert!(comp_length <= orig_length);
        }
    }

    #[test]
    fn test_decode_restores_tables() {
        let sfnt = font_test_data::CMAP12_FONT1;
        let decoded = decode(&encode(sfnt).unwrap()).unwrap();

        let original = FontRef::new(sfnt).unwrap();
        let restored = FontRef::new(&decoded).unwrap();
        for record in original.table_directory.table_records() {
            let tag = record.tag();
            assert_eq!(
                original.table_data(tag).map(|d| d.as_bytes().to_vec()),
                restored.table_data(tag).map(|d| d.as_bytes().to_vec()),
                "table {tag} differs"
            );
        }
    }

    /// A WOFF holding one table stored as `stored`, declared as `orig_length` bytes.
    fn single_table_woff(orig_length: u32, stored: &[u8]) -> Vec<u8> {
        let offset = HEADER_SIZE + DIRECTORY_ENTRY_SIZE;
        let total = offset + align4(stored.len());

        let mut woff = Vec::new();
        woff.extend_from_slice(&WOFF_SIGNATURE.to_be_bytes());
        woff.extend_from_slice(&0x0001_0000u32.to_be_bytes());
        woff.extend_from_slice(&(total as u32).to_be_bytes());
        woff.extend_from_slice(&1u16.to_be_bytes());
        woff.resize(HEADER_SIZE, 0);
        woff.extend_from_slice(b"zzzz");
        woff.extend_from_slice(&(offset as u32).to_be_bytes());
        woff.extend_from_slice(&(stored.len() as u32).to_be_bytes());
        woff.extend_from_slice(&orig_length.to_be_bytes());
        woff.extend_from_slice(&0u32.to_be_bytes());
        woff.extend_from_slice(stored);
        woff.resize(total, 0);
        woff
    }

    #[test]
    fn test_cff_flavor_round_trip() {
        let sfnt = font_test_data::NOTO_SANS_JP_CFF;
        let woff = encode(sfnt).unwrap();
        assert_eq!(&woff[4..8], b"OTTO");

        let decoded = decode(&woff).unwrap();
        assert_eq!(&decoded[..4], b"OTTO");
        assert!(FontRef::new(&decoded).unwrap().table_data(Tag::new(b"CFF ")).is_some());
    }

    #[test]
    fn test_inflate_stops_past_declared_length() {
        let bomb = deflate(&vec![0u8; 256 * 1024]).unwrap();
        assert!(bomb.len() < 1000);
        let woff = single_table_woff(1000, &bomb);

        let err = decode(&woff).unwrap_err();
        assert!(matches!(err, Error::LengthMismatch { expected: 1000, actual: 1001, .. }));
    }

    #[test]
    fn test_rejects_oversized_declared_length() {
        let woff = single_table_woff(MAX_SFNT_SIZE as u32 + 1, b"tiny");

        let err = decode(&woff).unwrap_err();
        assert!(matches!(err, Error::TooLarge { limit: MAX_SFNT_SIZE, .. }));
    }

    #[test]
    fn test_decode_rejects_sfnt() {
        let err = decode(font_test_data::CMAP12_FONT1).unwrap_err();
        assert!(matches!(err, Error::BadSignature(_)));
    }

    #[test]
    fn test_decode_rejects_truncated() {
        let woff = encode(font_test_data::CMAP12_FONT1).unwrap();
        let err = decode(&woff[..woff.len() - 8]).unwrap_err();
        assert!(matches!(err, Error::Truncated { .. }));

        let err = decode(&woff[..10]).unwrap_err();
        assert!(matches!(err, Error::Truncated { expected: HEADER_SIZE, actual: 10 }));
    }

    #[test]
    fn test_decode_rejects_oversized_compressed_length() {
        let mut woff = encode(font_test_data::CMAP12_FONT1).unwrap();
        let base = HEADER_SIZE;
        let orig_length = read_u32(&woff, base + 12);
        woff[base + 8..base + 12].copy_from_slice(&(orig_length + 1).to_be_bytes());
        assert!(decode(&woff).is_err());
    }
}
