//! Generic sfnt rewriting utilities.

use anyhow::{Context, Result};
use read_fonts::{FontRef, types::Tag};
use write_fonts::FontBuilder;

/// Offset of `checkSumAdjustment` inside `head`.
const HEAD_CHECKSUM_ADJUSTMENT: usize = 8;

/// Rewrite font data by applying a transformation function.
///
/// Copies all tables from the source font, then calls `f` to modify or add tables.
/// The function receives a reference to the source font and a mutable builder
/// that already contains all original tables. The output keeps the source's
/// sfnt version, so CFF fonts stay `OTTO`.
pub fn rewrite_font(
    data: &[u8],
    f: impl FnOnce(&FontRef, &mut FontBuilder) -> Result<()>,
) -> Result<Vec<u8>> {
    let font = FontRef::new(data).context("Failed to parse font")?;
    let mut builder = FontBuilder::new();

    for record in font.table_directory.table_records() {
        let tag = record.tag();
        if let Some(table_data) = font.table_data(tag) {
            builder.add_raw(tag, table_data);
        }
    }

    f(&font, &mut builder)?;
    let mut output = builder.build();
    set_sfnt_version(&mut output, font.table_directory.sfnt_version());
    Ok(output)
}

/// Overwrite the sfnt version of a built font and fix up `head.checkSumAdjustment`.
///
/// `FontBuilder` always writes the TrueType version; this restores the real one.
pub fn set_sfnt_version(font: &mut [u8], version: u32) {
    let Some(current) = read_u32(font, 0) else {
        return;
    };
    if current == version {
        return;
    }
    font[..4].copy_from_slice(&version.to_be_bytes());

    // The whole-font checksum includes the version word, so the adjustment
    // moves by the same amount in the opposite direction.
    let num_tables = font.get(4..6).map_or(0, |b| u16::from_be_bytes([b[0], b[1]]) as usize);
    for index in 0..num_tables {
        let record = 12 + 16 * index;
        if font.get(record..record + 4) != Some(b"head".as_slice()) {
            continue;
        }
        let Some(offset) = read_u32(font, record + 8) else {
            return;
        };
        let field = offset as usize + HEAD_CHECKSUM_ADJUSTMENT;
        if let Some(adjustment) = read_u32(font, field) {
            let adjustment = adjustment.wrapping_add(current).wrapping_sub(version);
            font[field..field + 4].copy_from_slice(&adjustment.to_be_bytes());
        }
        return;
    }
}

fn read_u32(data: &[u8], offset: usize) -> Option<u32> {
    let bytes = data.get(offset..offset.checked_add(4)?)?;
    Some(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

/// Re-save an sfnt unchanged.
///
/// The table directory is rebuilt, so table order, padding and checksums
/// come out normalized even when the input was sloppy about them.
pub fn resave(data: &[u8]) -> Result<Vec<u8>> {
    rewrite_font(data, |_, _| Ok(()))
}

/// Tags of every table in the font, in directory order.
pub fn table_tags(data: &[u8]) -> Result<Vec<Tag>> {
    let font = FontRef::new(data).context("Failed to parse font")?;
    Ok(font.table_directory.table_records().iter().map(|record| record.tag()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resave_keeps_tables() {
        let data = font_test_data::CMAP12_FONT1;
        let resaved = resave(data).unwrap();

        let mut before = table_tags(data).unwrap();
        let mut after = table_tags(&resaved).unwrap();
        before.sort();
        after.sort();
        assert_eq!(before, after);
    }

    #[test]
    fn test_resave_rejects_garbage() {
        assert!(resave(b"definitely not a font").is_err());
    }

    /// Sum of the font as big-endian u32 words, which is 0xB1B0AFBA for a valid font.
    fn font_checksum(data: &[u8]) -> u32 {
        data.chunks(4)
            .map(|chunk| {
                let mut word = [0u8; 4];
                word[..chunk.len()].copy_from_slice(chunk);
                u32::from_be_bytes(word)
            })
            .fold(0, u32::wrapping_add)
    }

    #[test]
    fn test_resave_keeps_cff_sfnt_version() {
        let data = font_test_data::NOTO_SANS_JP_CFF;
        assert_eq!(&data[..4], b"OTTO");

        let resaved = resave(data).unwrap();
        assert_eq!(&resaved[..4], b"OTTO");
        assert!(table_tags(&resaved).unwrap().contains(&Tag::new(b"CFF ")));
        assert_eq!(font_checksum(&resaved), 0xB1B0_AFBA);
    }

    #[test]
    fn test_resave_truetype_checksum() {
        let resaved = resave(font_test_data::CMAP12_FONT1).unwrap();
        assert_eq!(&resaved[..4], &[0, 1, 0, 0]);
        assert_eq!(font_checksum(&resaved), 0xB1B0_AFBA);
    }

    #[test]
    fn test_set_sfnt_version_ignores_short_data() {
        let mut data = [0u8; 2];
        set_sfnt_version(&mut data, 0x4F54_544F);
        assert_eq!(data, [0, 0]);
    }

    #[test]
    fn test_rewrite_font_can_drop_nothing_and_add_raw() {
        let tag = Tag::new(b"TEST");
        let data = rewrite_font(font_test_data::CMAP12_FONT1, |_, builder| {
            builder.add_raw(tag, b"hello".as_slice());
            Ok(())
        })
        .unwrap();
        assert!(table_tags(&data).unwrap().contains(&tag));
    }
}
