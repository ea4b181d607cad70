//! Request handlers.

use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::{Multipart, State},
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use fontconv_core::{ConvertOptions, TargetFormat};
use log::info;
use serde::Serialize;
use tempfile::Builder;
use tokio::fs;

use crate::{
    archive::build_zip,
    config::{BANNER, BATCH_ARCHIVE_NAME, Backend},
    error::ApiError,
    naming::{EntryNames, attachment, input_file_name, output_file_name},
};

#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<Backend>,
    pub options: ConvertOptions,
}

/// One uploaded file.
struct Upload {
    file_name: Option<String>,
    data: Bytes,
}

impl Upload {
    fn display_name(&self) -> &str {
        self.file_name.as_deref().unwrap_or("upload")
    }
}

#[derive(Serialize)]
pub struct Banner {
    message: &'static str,
}

pub async fn root() -> Json<Banner> {
    Json(Banner { message: BANNER })
}

/// `POST /convert`: fields `file` and `target_format`, responds with the converted font.
pub async fn convert(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let mut upload = None;
    let mut target_format = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("file") => {
                let file_name = field.file_name().map(str::to_owned);
                upload = Some(Upload { file_name, data: field.bytes().await? });
            }
            Some("target_format") => target_format = Some(field.text().await?),
            _ => {}
        }
    }

    let upload = upload.ok_or(ApiError::MissingField("file"))?;
    let target = parse_target(target_format, "target_format")?;
    info!("Converting {} ({} bytes) to {target}", upload.display_name(), upload.data.len());

    let converted = run_conversion(&state, &upload, target).await?;
    let file_name = output_file_name(upload.file_name.as_deref(), target);

    let headers = [
        (CONTENT_TYPE, target.mime_type().to_owned()),
        (CONTENT_DISPOSITION, attachment(&file_name)),
    ];
    Ok((headers, converted).into_response())
}

/// `POST /api/convert`: fields `files` (repeated) and `format`, responds with a ZIP.
pub async fn convert_batch(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let mut uploads = Vec::new();
    let mut format = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("files") => {
                let file_name = field.file_name().map(str::to_owned);
                uploads.push(Upload { file_name, data: field.bytes().await? });
            }
            Some("format") => format = Some(field.text().await?),
            _ => {}
        }
    }

    if uploads.is_empty() {
        return Err(ApiError::NoFiles);
    }
    let target = parse_target(format, "format")?;
    info!("Batch converting {} files to {target}", uploads.len());

    let mut names = EntryNames::default();
    let mut entries = Vec::with_capacity(uploads.len());
    for upload in &uploads {
        let converted = run_conversion(&state, upload, target).await.map_err(|e| match e {
            ApiError::Conversion { detail } => {
                ApiError::BatchItem { file: upload.display_name().to_owned(), detail }
            }
            other => other,
        })?;
        entries.push((names.claim(upload.file_name.as_deref(), target), converted));
    }

    let archive = build_zip(&entries)?;
    let headers = [
        (CONTENT_TYPE, "application/zip".to_owned()),
        (CONTENT_DISPOSITION, attachment(BATCH_ARCHIVE_NAME)),
    ];
    Ok((headers, archive).into_response())
}

fn parse_target(value: Option<String>, field: &'static str) -> Result<TargetFormat, ApiError> {
    let value = value.ok_or(ApiError::MissingField(field))?;
    value.trim().parse().map_err(ApiError::UnsupportedFormat)
}

/// Write the upload to a private temporary directory, convert it, read the result back.
///
/// The directory and both files are removed when this returns, on every path.
async fn run_conversion(
    state: &AppState,
    upload: &Upload,
    target: TargetFormat,
) -> Result<Vec<u8>, ApiError> {
    let workspace = Builder::new().prefix("fontconv-").tempdir()?;
    let input = workspace.path().join(input_file_name(upload.file_name.as_deref()));
    let output = workspace.path().join(format!("output.{target}"));

    fs::write(&input, &upload.data).await?;
    state.backend.convert(&input, &output, state.options).await?;
    Ok(fs::read(&output).await?)
}
