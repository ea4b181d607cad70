//! fontconv core - pick a conversion strategy from the target extension and run it.

pub mod convert;
pub mod error;
pub mod format;
pub mod io;

pub use convert::{Conversion, ConvertOptions, convert, convert_file};
pub use error::{ConvertError, Result};
pub use format::{SourceFormat, TargetFormat};
