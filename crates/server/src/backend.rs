//! Running one conversion, in process or as a child process.

use std::path::Path;

use fontconv_core::{ConvertOptions, convert_file};
use log::debug;
use tokio::{process::Command, task::spawn_blocking};

use crate::{
    config::{Backend, CONVERT_SUBCOMMAND},
    error::ApiError,
};

/// Flag understood by the `convert` subcommand.
const STRIP_FLAG: &str = "--strip-problematic-glyphs";

impl Backend {
    /// Convert `input` into `output`; the target comes from `output`'s extension.
    pub async fn convert(
        &self,
        input: &Path,
        output: &Path,
        options: ConvertOptions,
    ) -> Result<(), ApiError> {
        match self {
            Self::InProcess => convert_in_process(input, output, options).await,
            Self::Subprocess { program } => {
                convert_in_subprocess(program, input, output, options).await
            }
        }
    }
}

async fn convert_in_process(
    input: &Path,
    output: &Path,
    options: ConvertOptions,
) -> Result<(), ApiError> {
    let (input, output) = (input.to_path_buf(), output.to_path_buf());
    let joined = spawn_blocking(move || convert_file(&input, &output, &options)).await;
    match joined {
        Ok(Ok(conversion)) => {
            debug!("{conversion:?}");
            Ok(())
        }
        Ok(Err(e)) => Err(ApiError::Conversion { detail: e.to_string() }),
        Err(e) => Err(ApiError::Conversion { detail: format!("conversion task failed: {e}") }),
    }
}

async fn convert_in_subprocess(
    program: &Path,
    input: &Path,
    output: &Path,
    options: ConvertOptions,
) -> Result<(), ApiError> {
    let mut command = Command::new(program);
    command
        .arg(CONVERT_SUBCOMMAND)
        .arg(input)
        .arg(output)
        .env("RUST_LOG", "warn")
        .kill_on_drop(true);
    if options.strip_problematic_glyphs {
        command.arg(STRIP_FLAG);
    }

    debug!("Running {command:?}");
    let result = command.output().await.map_err(|e| ApiError::Conversion {
        detail: format!("failed to start {}: {e}", program.display()),
    })?;

    if result.status.success() {
        return Ok(());
    }

    let stderr = String::from_utf8_lossy(&result.stderr).trim().to_owned();
    let detail = if stderr.is_empty() {
        format!("converter exited with {}", result.status)
    } else {
        stderr
    };
    Err(ApiError::Conversion { detail })
}
