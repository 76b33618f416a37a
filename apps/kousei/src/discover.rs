//! Target discovery: a single Markdown file, or every `**/*.md` under a directory.

use crate::error::{Error, Result};
use glob::glob;
use std::path::{Path, PathBuf};

/// Collect Markdown files for `target`, sorted by path.
///
/// Unreadable glob entries are logged and skipped so one bad directory does
/// not hide the rest of the manuscript tree.
pub fn collect_markdown(target: &Path) -> Result<Vec<PathBuf>> {
    if target.is_file() {
        return Ok(vec![target.to_path_buf()]);
    }
    if !target.is_dir() {
        return Err(Error::TargetNotFound(target.to_path_buf()));
    }
    let base = glob::Pattern::escape(&target.to_string_lossy());
    let pattern = format!("{}/**/*.md", base.trim_end_matches('/'));
    let mut files: Vec<PathBuf> = Vec::new();
    for entry in glob(&pattern)? {
        match entry {
            Ok(p) if p.is_file() => files.push(p),
            Ok(_) => {}
            Err(e) => tracing::warn!(path = %e.path().display(), "skipping unreadable entry: {}", e.error()),
        }
    }
    files.sort();
    tracing::debug!(target = %target.display(), count = files.len(), "collected markdown files");
    Ok(files)
}
