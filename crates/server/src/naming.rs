//! File names derived from client-supplied upload names.

use std::collections::HashSet;

use fontconv_core::TargetFormat;

const FALLBACK_STEM: &str = "font";

/// Upload name without directories or extension; never empty.
pub fn file_stem(upload_name: Option<&str>) -> String {
    let name = upload_name.unwrap_or_default();
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let stem = match base.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => base,
    };
    let stem: String = stem.chars().filter(|c| !c.is_control()).collect();
    let stem = stem.trim();
    if stem.is_empty() { FALLBACK_STEM.to_owned() } else { stem.to_owned() }
}

/// Restrict to characters that are safe in headers and file systems.
pub fn ascii_safe(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') { c } else { '_' })
        .collect()
}

/// Name of the temporary input file.
pub fn input_file_name(upload_name: Option<&str>) -> String {
    format!("input_{}", ascii_safe(&file_stem(upload_name)))
}

/// Value for `Content-Disposition` when returning a converted upload.
pub fn attachment(file_name: &str) -> String {
    format!("attachment; filename=\"{file_name}\"")
}

/// Download name for a single converted upload.
pub fn output_file_name(upload_name: Option<&str>, target: TargetFormat) -> String {
    format!("{}.{target}", ascii_safe(&file_stem(upload_name)))
}

/// Hands out archive entry names, suffixing `-2`, `-3`, ... until the name is unused.
#[derive(Debug, Default)]
pub struct EntryNames {
    issued: HashSet<String>,
}

impl EntryNames {
    pub fn claim(&mut self, upload_name: Option<&str>, target: TargetFormat) -> String {
        let stem = file_stem(upload_name);
        let mut n = 1;
        loop {
            let name = match n {
                1 => format!("{stem}.{target}"),
                n => format!("{stem}-{n}.{target}"),
            };
            if self.issued.insert(name.clone()) {
                return name;
            }
            n += 1;
        }
    }
}
