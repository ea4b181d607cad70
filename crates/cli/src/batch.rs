//! Parallel batch conversion.

use std::{
    collections::HashSet,
    ffi::OsString,
    fs::create_dir_all,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use fontconv_core::{ConvertOptions, TargetFormat, convert_file};
use log::warn;
use rayon::prelude::*;

/// Result of a parallel batch operation.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct BatchResult {
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchResult {
    pub fn ok_or_bail(&self, operation: &str) -> Result<()> {
        if self.failed > 0 {
            bail!("{operation} failed: {} succeeded, {} failed", self.succeeded, self.failed);
        }
        Ok(())
    }
}

/// Pair each input with `<output_dir>/<stem>.<ext>`, suffixing `-2`, `-3`, ... on clashes.
///
/// Every planned output is distinct, including when a suffixed name matches
/// another input's own stem.
pub fn plan_outputs(
    inputs: &[PathBuf],
    output_dir: &Path,
    target: TargetFormat,
) -> Vec<(PathBuf, PathBuf)> {
    let mut taken: HashSet<OsString> = HashSet::new();

    inputs
        .iter()
        .map(|input| {
            let stem = input.file_stem().map_or_else(|| OsString::from("font"), OsString::from);
            let name = (1..)
                .map(|n| {
                    let mut name = stem.clone();
                    if n > 1 {
                        name.push(format!("-{n}"));
                    }
                    name.push(".");
                    name.push(target.extension());
                    name
                })
                .find(|name| taken.insert(name.clone()))
                .unwrap_or_default();
            (input.clone(), output_dir.join(name))
        })
        .collect()
}

/// Convert every input into `output_dir` in parallel, reporting failures as they happen.
pub fn convert_batch(
    inputs: &[PathBuf],
    output_dir: &Path,
    target: TargetFormat,
    options: &ConvertOptions,
) -> Result<BatchResult> {
    create_dir_all(output_dir)
        .with_context(|| format!("Failed to create directory: {}", output_dir.display()))?;

    let jobs = plan_outputs(inputs, output_dir, target);
    let results: Vec<_> = jobs
        .par_iter()
        .map(|(input, output)| {
            convert_file(input, output, options)
                .with_context(|| format!("Failed to convert {}", input.display()))
        })
        .collect();

    let mut result = BatchResult::default();
    for r in &results {
        if let Err(e) = r {
            warn!("{e:#}");
            result.failed += 1;
        } else {
            result.succeeded += 1;
        }
    }

    println!("Convert to {target}: {} succeeded, {} failed", result.succeeded, result.failed);
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_outputs_disambiguates_stems() {
        let inputs = [
            PathBuf::from("a/Regular.ttf"),
            PathBuf::from("b/Regular.otf"),
            PathBuf::from("Bold.woff"),
        ];
        let plan = plan_outputs(&inputs, Path::new("dist"), TargetFormat::Woff2);
        let outputs: Vec<_> = plan.into_iter().map(|(_, output)| output).collect();

        assert_eq!(
            outputs,
            [
                PathBuf::from("dist/Regular.woff2"),
                PathBuf::from("dist/Regular-2.woff2"),
                PathBuf::from("dist/Bold.woff2"),
            ]
        );
    }

    #[test]
    fn test_plan_outputs_skips_names_taken_by_other_inputs() {
        let inputs = [PathBuf::from("A.ttf"), PathBuf::from("A.otf"), PathBuf::from("A-2.ttf")];
        let plan = plan_outputs(&inputs, Path::new("dist"), TargetFormat::Woff);
        let outputs: Vec<_> = plan.into_iter().map(|(_, output)| output).collect();

        assert_eq!(
            outputs,
            [
                PathBuf::from("dist/A.woff"),
                PathBuf::from("dist/A-2.woff"),
                PathBuf::from("dist/A-2-2.woff"),
            ]
        );
    }

    #[test]
    fn test_batch_result() {
        let result = BatchResult { succeeded: 2, failed: 1 };
        assert!(result.ok_or_bail("Convert").is_err());
        assert!(BatchResult { succeeded: 1, failed: 0 }.ok_or_bail("Convert").is_ok());
    }
}
