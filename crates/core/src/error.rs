use std::{io, path::PathBuf, result};

use crate::format::{SourceFormat, TargetFormat};

#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("unsupported target format: {0}")]
    UnsupportedFormat(String),

    #[error("cannot convert {input} input to {target}")]
    UnsupportedSource { input: SourceFormat, target: TargetFormat },

    #[error("failed to process font: {0:#}")]
    Sfnt(anyhow::Error),

    #[error(transparent)]
    Woff(#[from] fontconv_font_woff::Error),

    #[error("WOFF2 processing failed: {0:#}")]
    Woff2(anyhow::Error),

    #[error(transparent)]
    Type1(#[from] fontconv_font_type1::Error),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type Result<T> = result::Result<T, ConvertError>;
