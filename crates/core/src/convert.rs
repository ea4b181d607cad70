//! The conversion dispatcher.
//!
//! | target        | strategy                                   |
//! |---------------|--------------------------------------------|
//! | `ttf`, `otf`  | re-save the sfnt                           |
//! | `woff`        | re-save, then wrap as WOFF 1.0             |
//! | `woff2`       | re-save, then encode as WOFF2              |
//! | `pfa`, `pfb`  | re-frame a Type 1 font                     |
//!
//! The extension never changes outlines: a CFF font written as `.ttf`
//! keeps its CFF table.

use std::{borrow::Cow, path::Path};

use fontconv_font_ops::resave;
use fontconv_font_type1::Type1Font;
use fontconv_font_woff2::{convert_to_woff2, convert_to_woff2_safe, decode_woff2};
use log::info;

use crate::{
    error::{ConvertError, Result},
    format::{SourceFormat, TargetFormat},
    io::FontFile,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Subset away codepoints that break OTS before WOFF2 encoding.
    pub strip_problematic_glyphs: bool,
}

/// Summary of a finished [`convert_file`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conversion {
    pub source: SourceFormat,
    pub target: TargetFormat,
    pub input_len: usize,
    pub output_len: usize,
}

/// Convert font bytes into `target`.
pub fn convert(data: &[u8], target: TargetFormat, options: &ConvertOptions) -> Result<Vec<u8>> {
    let source = SourceFormat::detect(data);

    match target {
        TargetFormat::Ttf | TargetFormat::Otf => {
            let sfnt = load_sfnt(data, source, target)?;
            resave(&sfnt).map_err(ConvertError::Sfnt)
        }
        TargetFormat::Woff => {
            let sfnt = load_sfnt(data, source, target)?;
            let sfnt = resave(&sfnt).map_err(ConvertError::Sfnt)?;
            Ok(fontconv_font_woff::encode(&sfnt)?)
        }
        TargetFormat::Woff2 => {
            let sfnt = load_sfnt(data, source, target)?;
            let sfnt = resave(&sfnt).map_err(ConvertError::Sfnt)?;
            let encoded = if options.strip_problematic_glyphs {
                convert_to_woff2_safe(&sfnt)
            } else {
                convert_to_woff2(&sfnt)
            };
            encoded.map_err(ConvertError::Woff2)
        }
        TargetFormat::Pfa | TargetFormat::Pfb => {
            let Some(framing) = target.type1_framing().filter(|_| source.is_type1()) else {
                return Err(ConvertError::UnsupportedSource { input: source, target });
            };
            let font = Type1Font::parse(data)?;
            if let Some(name) = font.font_name() {
                info!("Type 1 font {name}: writing {target}");
            }
            Ok(font.write(framing))
        }
    }
}

/// Convert `input` into `output`, the target being implied by `output`'s extension.
///
/// The target is resolved before anything is read, and nothing is written
/// unless conversion succeeds.
pub fn convert_file(input: &Path, output: &Path, options: &ConvertOptions) -> Result<Conversion> {
    let target = TargetFormat::from_path(output)?;

    let data = FontFile::new(input).read()?;
    let source = SourceFormat::detect(&data);
    let converted = convert(&data, target, options)?;

    let output_file = FontFile::new(output);
    output_file.ensure_parent_dir()?;
    output_file.write(&converted)?;

    info!(
        "Converted {} ({source}, {} bytes) -> {} ({target}, {} bytes)",
        input.display(),
        data.len(),
        output.display(),
        converted.len()
    );

    Ok(Conversion { source, target, input_len: data.len(), output_len: converted.len() })
}

/// Borrow the input when it already is an sfnt, unwrap it when it is WOFF or WOFF2.
fn load_sfnt(data: &[u8], source: SourceFormat, target: TargetFormat) -> Result<Cow<'_, [u8]>> {
    match source {
        SourceFormat::TrueType | SourceFormat::Cff => Ok(Cow::Borrowed(data)),
        SourceFormat::Woff => Ok(Cow::Owned(fontconv_font_woff::decode(data)?)),
        SourceFormat::Woff2 => Ok(Cow::Owned(decode_woff2(data).map_err(ConvertError::Woff2)?)),
        other => Err(ConvertError::UnsupportedSource { input: other, target }),
    }
}
