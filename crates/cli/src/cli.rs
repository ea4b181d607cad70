//! CLI definitions and command dispatch.

use std::{env::current_exe, net::SocketAddr, path::PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fontconv_core::{ConvertOptions, TargetFormat, convert_file};
use fontconv_server::{
    Backend, ServerConfig,
    config::{DEFAULT_BIND, DEFAULT_MAX_UPLOAD_BYTES},
    run,
};
use tokio::runtime;

use crate::{batch::convert_batch, io::expand_inputs};

#[derive(Parser)]
#[command(name = "fontconv")]
#[command(about = "Convert fonts between TTF, OTF, WOFF, WOFF2 and Type 1 (PFA/PFB)")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, clap::Args)]
pub struct ConvertArgs {
    /// Remove glyphs that make browsers reject WOFF2 output (U+F8FF)
    #[arg(long)]
    pub strip_problematic_glyphs: bool,
}

impl ConvertArgs {
    pub fn options(&self) -> ConvertOptions {
        ConvertOptions { strip_problematic_glyphs: self.strip_problematic_glyphs }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert one font; the output extension selects the target format
    Convert {
        input: PathBuf,
        output: PathBuf,
        #[command(flatten)]
        args: ConvertArgs,
    },
    /// Convert many fonts in parallel
    Batch {
        #[arg(short, long, value_parser = parse_target)]
        format: TargetFormat,
        #[arg(long, default_value = "dist")]
        output_dir: PathBuf,
        /// Font files or glob patterns
        #[arg(required = true)]
        inputs: Vec<String>,
        #[command(flatten)]
        args: ConvertArgs,
    },
    /// Run the HTTP conversion API
    Serve {
        #[arg(long, env = "FONTCONV_BIND", default_value_t = DEFAULT_BIND)]
        bind: SocketAddr,
        #[arg(long, env = "FONTCONV_MAX_UPLOAD_BYTES", default_value_t = DEFAULT_MAX_UPLOAD_BYTES)]
        max_upload_bytes: usize,
        /// Convert inside the server process instead of spawning `fontconv convert`
        #[arg(long, env = "FONTCONV_IN_PROCESS")]
        in_process: bool,
        #[command(flatten)]
        args: ConvertArgs,
    },
}

impl Commands {
    pub fn run(self) -> Result<()> {
        match self {
            Commands::Convert { input, output, args } => {
                convert_file(&input, &output, &args.options())
                    .with_context(|| format!("Failed to convert {}", input.display()))?;
            }
            Commands::Batch { format, output_dir, inputs, args } => {
                let inputs = expand_inputs(&inputs)?;
                convert_batch(&inputs, &output_dir, format, &args.options())?
                    .ok_or_bail("Batch conversion")?;
            }
            Commands::Serve { bind, max_upload_bytes, in_process, args } => {
                let backend = if in_process {
                    Backend::InProcess
                } else {
                    let program = current_exe().context("Failed to locate fontconv executable")?;
                    Backend::Subprocess { program }
                };
                let config =
                    ServerConfig { bind, max_upload_bytes, backend, options: args.options() };

                runtime::Builder::new_multi_thread()
                    .enable_all()
                    .build()
                    .context("Failed to start async runtime")?
                    .block_on(run(config))?;
            }
        }
        Ok(())
    }
}

fn parse_target(value: &str) -> Result<TargetFormat, String> {
    value.parse().map_err(|e: fontconv_core::ConvertError| e.to_string())
}
