//! Write-once backups of files before the fixer or restructure pass mutates them.
//!
//! A backup of `dir/ch01.md` lands at `dir/<backup_dir>/ch01.md.backup.<stamp>`
//! where `<stamp>` is a local timestamp with millisecond precision. Backups are
//! never read back by kousei; they exist for the operator.

use crate::error::{Error, Result};
use chrono::{DateTime, Local};
use glob::glob;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

const STAMP_FORMAT: &str = "%Y%m%d%H%M%S%3f";
const MAX_SUFFIX: usize = 100;

/// Path of the backup for `file` taken at `stamp`.
pub fn backup_path(file: &Path, backup_dir: &str, stamp: &str) -> PathBuf {
    let parent = file.parent().unwrap_or_else(|| Path::new("."));
    let name = file
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    parent
        .join(backup_dir)
        .join(format!("{name}.backup.{stamp}"))
}

/// Persist `content` as the backup of `file`. Never overwrites an existing
/// backup: a numeric suffix is appended when the stamped name is taken.
pub fn write_backup(
    file: &Path,
    content: &str,
    backup_dir: &str,
    now: &DateTime<Local>,
) -> Result<PathBuf> {
    let stamp = now.format(STAMP_FORMAT).to_string();
    let first = backup_path(file, backup_dir, &stamp);
    if let Some(dir) = first.parent() {
        fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;
    }
    for n in 0..MAX_SUFFIX {
        let path = if n == 0 {
            first.clone()
        } else {
            backup_path(file, backup_dir, &format!("{stamp}-{n}"))
        };
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut f) => {
                f.write_all(content.as_bytes())
                    .and_then(|_| f.sync_all())
                    .map_err(|e| Error::io(&path, e))?;
                tracing::info!(file = %file.display(), backup = %path.display(), "backup written");
                return Ok(path);
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(Error::io(&path, e)),
        }
    }
    Err(Error::BackupExists(first))
}

/// Delete `*.backup.*` files under `target` last modified before
/// `now - older_than_days`. Returns the number of files removed.
pub fn cleanup_backups(target: &Path, older_than_days: u64, now: SystemTime) -> Result<usize> {
    let root = if target.is_file() {
        target.parent().unwrap_or_else(|| Path::new("."))
    } else {
        target
    };
    let cutoff = now
        .checked_sub(Duration::from_secs(older_than_days * 24 * 60 * 60))
        .unwrap_or(SystemTime::UNIX_EPOCH);
    let base = glob::Pattern::escape(&root.to_string_lossy());
    let pattern = format!("{}/**/*.backup.*", base.trim_end_matches('/'));
    let mut removed = 0usize;
    for entry in glob(&pattern)?.flatten() {
        let modified = match fs::metadata(&entry).and_then(|m| m.modified()) {
            Ok(t) => t,
            Err(e) => {
                tracing::warn!(path = %entry.display(), "cannot stat backup: {e}");
                continue;
            }
        };
        if modified < cutoff {
            match fs::remove_file(&entry) {
                Ok(()) => removed += 1,
                Err(e) => tracing::warn!(path = %entry.display(), "cannot remove backup: {e}"),
            }
        }
    }
    Ok(removed)
}
