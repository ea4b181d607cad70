//! Server defaults and runtime configuration.

use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::PathBuf,
};

use fontconv_core::ConvertOptions;

/// Address the server binds to when none is given.
pub const DEFAULT_BIND: SocketAddr = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 8000);

/// Largest accepted request body.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

/// File name of the archive returned by the batch endpoint.
pub const BATCH_ARCHIVE_NAME: &str = "converted_fonts.zip";

/// Message returned by `GET /`.
pub const BANNER: &str = "Font Converter API is running.";

/// Subcommand the converter executable is invoked with.
pub const CONVERT_SUBCOMMAND: &str = "convert";

/// Converter executable looked up on `PATH` when none is configured.
pub const DEFAULT_CONVERTER: &str = "fontconv";

/// Where conversions run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    /// On tokio's blocking pool inside the server process.
    InProcess,
    /// As `<program> convert <input> <output>` in a child process.
    Subprocess { program: PathBuf },
}

impl Default for Backend {
    fn default() -> Self {
        Self::Subprocess { program: PathBuf::from(DEFAULT_CONVERTER) }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub max_upload_bytes: usize,
    pub backend: Backend,
    pub options: ConvertOptions,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            backend: Backend::default(),
            options: ConvertOptions::default(),
        }
    }
}
