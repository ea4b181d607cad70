use std::io;

use axum::{
    Json,
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use fontconv_core::ConvertError;
use log::{error, warn};
use serde::Serialize;
use zip::result::ZipError;

/// Everything a handler can fail with, rendered as `{"error": ...}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("missing form field '{0}'")]
    MissingField(&'static str),

    #[error("no files found")]
    NoFiles,

    #[error(transparent)]
    UnsupportedFormat(ConvertError),

    #[error("invalid upload: {0}")]
    Multipart(#[from] MultipartError),

    #[error("Font conversion failed")]
    Conversion { detail: String },

    #[error("{file}: {detail}")]
    BatchItem { file: String, detail: String },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("failed to build archive: {0}")]
    Archive(#[from] ZipError),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingField(_) | Self::NoFiles | Self::UnsupportedFormat(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Multipart(e) => e.status(),
            Self::Conversion { .. } | Self::BatchItem { .. } | Self::Io(_) | Self::Archive(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = match &self {
            Self::Conversion { detail } => Some(detail.clone()),
            _ => None,
        };

        if status.is_server_error() {
            error!("{self}{}", detail.as_deref().map(|d| format!(": {d}")).unwrap_or_default());
        } else {
            warn!("Rejected request: {self}");
        }

        (status, Json(ErrorBody { error: self.to_string(), detail })).into_response()
    }
}
