//! Restructure pass: turns flat `- title：description` list lines into a
//! two-level list. This is the rewrite `title-colon-list` asks for; it is an
//! explicit command rather than part of `fix` because the split point needs
//! a human to confirm it.
//!
//! ```text
//! - 可読性：コードが読みやすくなる     - 可読性
//!                                  =>     + コードが読みやすくなる
//! ```
//!
//! When nothing follows the colon, the colon is dropped and a plain
//! continuation line (non-empty, not itself a list item) becomes the nested
//! entry. Code blocks, comments, and allow-listed lines are left untouched.

use crate::backup;
use crate::error::{Error, Result};
use crate::exclusion::ExclusionZones;
use crate::markdown;
use crate::models::FileFailure;
use crate::scan::title_colon;
use crate::utils::display_path;
use chrono::{DateTime, Local};
use std::fs;
use std::path::{Path, PathBuf};

const NESTED_INDENT: &str = "    ";

/// Restructure `text`, returning the new text and the number of list items converted.
pub fn restructure_document(text: &str) -> (String, usize) {
    let zones = ExclusionZones::from_text(text);
    let lines: Vec<markdown::Line<'_>> = markdown::lines(text).collect();
    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    let mut converted = 0usize;
    let mut i = 0usize;
    while i < lines.len() {
        let line = lines[i];
        i += 1;
        let tc = match title_colon(line.text) {
            Some(tc) if !zones.is_excluded(text, line.range()) => tc,
            _ => {
                out.push(raw_line(text, &line).to_string());
                continue;
            }
        };
        let item = tc.item;
        out.push(format!("{}{} {}", item.indent, item.marker, tc.title));
        let nested = format!("{}{}+ ", item.indent, NESTED_INDENT);
        if !tc.description.is_empty() {
            out.push(format!("{nested}{}", tc.description));
        } else if let Some(next) = lines.get(i) {
            if is_continuation(next.text) && !zones.in_region(&next.range()) {
                out.push(format!("{nested}{}", next.text.trim()));
                i += 1;
            }
        }
        converted += 1;
    }
    (out.join("\n"), converted)
}

/// The line's text including a stripped `\r`, so untouched lines round-trip.
fn raw_line<'a>(text: &'a str, line: &markdown::Line<'a>) -> &'a str {
    let end = line.start + line.text.len();
    if text[end..].starts_with('\r') {
        &text[line.start..end + 1]
    } else {
        line.text
    }
}

fn is_continuation(line: &str) -> bool {
    let t = line.trim_start();
    !t.is_empty()
        && markdown::list_item(line).is_none()
        && !markdown::is_heading(line)
        && !t.starts_with(|c: char| c.is_ascii_digit())
}

#[derive(Debug, Clone, Default)]
/// Accumulated result of a restructure batch.
pub struct RestructureRun {
    /// (file, converted items)
    pub changed: Vec<(String, usize)>,
    pub backups: Vec<String>,
    pub failures: Vec<FileFailure>,
    pub files_seen: usize,
}

/// Restructure one file. Returns `None` when nothing changes, otherwise the
/// converted item count and, when written, the backup path.
fn restructure_file(
    path: &Path,
    write: bool,
    backup_dir: &str,
    now: &DateTime<Local>,
) -> Result<Option<(usize, Option<PathBuf>)>> {
    let original = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    let (text, n) = restructure_document(&original);
    if text == original {
        return Ok(None);
    }
    if !write {
        return Ok(Some((n, None)));
    }
    let b = backup::write_backup(path, &original, backup_dir, now)?;
    fs::write(path, &text).map_err(|e| Error::io(path, e))?;
    Ok(Some((n, Some(b))))
}

/// Restructure each file in order; with `write`, back up and rewrite changed files.
pub fn run_restructure(
    files: &[PathBuf],
    write: bool,
    backup_dir: &str,
    now: &DateTime<Local>,
) -> RestructureRun {
    let mut run = RestructureRun::default();
    for path in files {
        run.files_seen += 1;
        let name = display_path(path);
        match restructure_file(path, write, backup_dir, now) {
            Ok(Some((n, b))) => {
                tracing::info!(file = %name, items = n, write, "restructured");
                run.changed.push((name, n));
                if let Some(b) = b {
                    run.backups.push(display_path(&b));
                }
            }
            Ok(None) => {}
            Err(e) => {
                tracing::error!(file = %name, "restructure failed: {e}");
                run.failures.push(FileFailure {
                    file: name,
                    message: e.to_string(),
                });
            }
        }
    }
    run
}
