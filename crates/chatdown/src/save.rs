//! Writing the exported Markdown to disk.

use std::fs;
use std::path::{Path, PathBuf};

use crate::{ExportError, Result};

/// `"<title>.md"`, or `"<fallback>.md"` without a title.
///
/// Path separators and characters most filesystems reject are replaced
/// with `_`.
pub fn file_name(title: Option<&str>, fallback: &str) -> String {
    let stem = title.map(str::trim).filter(|t| !t.is_empty()).unwrap_or(fallback);
    let stem: String = stem
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    format!("{stem}.md")
}

/// Write `markdown` plus a trailing newline to `dir/file_name`.
///
/// Empty input is refused with [`ExportError::NoData`].
pub fn save_markdown(dir: &Path, file_name: &str, markdown: &str) -> Result<PathBuf> {
    if markdown.is_empty() {
        log::error!("no data to save");
        return Err(ExportError::NoData);
    }

    let path = dir.join(file_name);
    fs::write(&path, format!("{markdown}\n"))?;
    log::info!("saved {}", path.display());
    Ok(path)
}
