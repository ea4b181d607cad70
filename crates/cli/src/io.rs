//! Input discovery.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use glob::glob;
use log::warn;

/// Expand command-line inputs: plain paths pass through, glob patterns are matched.
pub fn expand_inputs(inputs: &[String]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();

    for input in inputs {
        if !is_pattern(input) {
            paths.push(PathBuf::from(input));
            continue;
        }

        let matched: Vec<PathBuf> = glob(input)
            .with_context(|| format!("Failed to glob pattern: {input}"))?
            .filter_map(Result::ok)
            .filter(|path| path.is_file())
            .collect();
        if matched.is_empty() {
            warn!("No files match {input}");
        }
        paths.extend(matched);
    }

    if paths.is_empty() {
        bail!("No input fonts found");
    }
    Ok(paths)
}

fn is_pattern(input: &str) -> bool {
    input.contains(['*', '?', '['])
}
