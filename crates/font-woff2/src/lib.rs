//! WOFF2 conversion with optional problematic glyph handling.
//!
//! Plain conversion hands the sfnt straight to the `ttf2woff2` encoder,
//! and [`decode_woff2`] goes the other way through `wuff`. Some glyphs
//! (like U+F8FF, the Apple logo) make browsers' OTS validation reject the
//! decompressed font, so [`convert_to_woff2_safe`] first subsets them away.
//!
//! # Example
//!
//! ```no_run
//! use fontconv_font_woff2::convert_to_woff2;
//!
//! let ttf_data = std::fs::read("input.ttf").unwrap();
//! let woff2 = convert_to_woff2(&ttf_data).unwrap();
//! ```

use std::collections::BTreeSet;

use anyhow::{Context, Result, anyhow, bail};
use hb_subset::{Blob, FontFace, SubsetInput, Tag};
use log::info;
use read_fonts::{FontRef, TableProvider};
use ttf2woff2::BrotliQuality;

/// `wOF2`
pub const WOFF2_SIGNATURE: &[u8; 4] = b"wOF2";

/// Codepoints known to cause WOFF2 OTS validation errors.
///
/// U+F8FF (Apple logo) references `.notdef` as a composite component,
/// which Chrome's OTS parser rejects during WOFF2 decompression.
pub const PROBLEMATIC_CODEPOINTS: &[u32] = &[0xF8FF];

/// Layout features to retain during subsetting.
const LAYOUT_FEATURES: &[&[u8; 4]] = &[
    b"aalt", b"ccmp", b"dlig", b"fwid", b"hwid", b"jp78", b"jp83", b"jp90", b"liga", b"locl",
    b"nlck", b"pwid", b"vert", b"vjmo", b"vrt2", b"halt", b"vhal", b"kern", b"mark", b"mkmk",
    b"calt", b"rvrn", b"ss01", b"ss02", b"ss03", b"ss04", b"ss05", b"ss06", b"ss07", b"ss08",
    b"ss09", b"ss10", b"ss11", b"ss12", b"ss20", b"dnom", b"numr", b"frac", b"ordn", b"sups",
    b"subs", b"sinf", b"case", b"zero", b"smcp", b"c2sc", b"onum", b"lnum", b"pnum", b"tnum",
];

/// Encode an sfnt as WOFF2 with the default Brotli quality.
pub fn convert_to_woff2(data: &[u8]) -> Result<Vec<u8>> {
    ttf2woff2::encode(data, BrotliQuality::default())
        .map_err(|e| anyhow!("WOFF2 encoding failed: {e:?}"))
}

/// Decode WOFF2 data back into a plain sfnt.
pub fn decode_woff2(data: &[u8]) -> Result<Vec<u8>> {
    if !data.starts_with(WOFF2_SIGNATURE) {
        bail!("Not a WOFF2 file");
    }
    wuff::decompress_woff2(data).map_err(|e| anyhow!("WOFF2 decoding failed: {e:?}"))
}

/// Drop [`PROBLEMATIC_CODEPOINTS`] (when the font maps any), then encode as WOFF2.
pub fn convert_to_woff2_safe(data: &[u8]) -> Result<Vec<u8>> {
    let codepoints = mapped_codepoints(data)?;
    if !codepoints.iter().any(|cp| PROBLEMATIC_CODEPOINTS.contains(cp)) {
        return convert_to_woff2(data);
    }

    info!("Removing problematic codepoints before WOFF2 encoding");
    let subset = subset_for_woff2(data)?;
    convert_to_woff2(&subset)
}

/// Subsets font data excluding problematic codepoints for WOFF2 conversion.
///
/// Reads the font's cmap table to get all mapped codepoints, then creates
/// a subset that excludes [`PROBLEMATIC_CODEPOINTS`]. The resulting sfnt
/// can be safely converted to WOFF2.
pub fn subset_for_woff2(data: &[u8]) -> Result<Vec<u8>> {
    let codepoints = mapped_codepoints(data)?;

    if codepoints.is_empty() {
        bail!("No valid codepoints found in font");
    }

    let mut input = SubsetInput::new()?;

    {
        let mut feature_set = input.layout_feature_tag_set();
        for tag in LAYOUT_FEATURES {
            feature_set.insert(Tag::new(*tag));
        }
    }

    {
        let mut unicode_set = input.unicode_set();
        for cp in codepoints.iter().filter(|cp| !PROBLEMATIC_CODEPOINTS.contains(cp)) {
            if let Some(c) = char::from_u32(*cp) {
                unicode_set.insert(c);
            }
        }
    }

    let font_face = FontFace::new(Blob::from_bytes(data)?)?;
    let subset_font = input.subset_font(&font_face)?;
    Ok(subset_font.underlying_blob().to_vec())
}

/// Every codepoint mapped to a real glyph by any cmap subtable.
fn mapped_codepoints(data: &[u8]) -> Result<BTreeSet<u32>> {
    let font = FontRef::new(data).context("Failed to parse font")?;
    let cmap = font.cmap().context("Failed to read cmap table")?;

    let mut codepoints = BTreeSet::new();
    for record in cmap.encoding_records() {
        if let Ok(subtable) = record.subtable(cmap.offset_data()) {
            codepoints.extend(
                subtable.iter().filter(|(_, gid)| gid.to_u32() != 0).map(|(cp, _)| cp),
            );
        }
    }
    Ok(codepoints)
}
