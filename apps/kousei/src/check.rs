//! Check runner: scans a set of files and accumulates a `CheckRun`.
//!
//! Files are read and scanned in parallel and collected back in input order.
//! A file that cannot be read is recorded as a `FileFailure` and the batch
//! continues.

use crate::models::{CheckRun, FileFailure};
use crate::rules::RuleSet;
use crate::scan::scan_document;
use crate::utils::display_path;
use rayon::prelude::*;
use std::fs;
use std::path::PathBuf;

/// Scan every file in `files` with `rules`.
pub fn run_check(files: &[PathBuf], rules: &RuleSet) -> CheckRun {
    let per_file: Vec<(String, Result<_, String>)> = files
        .par_iter()
        .map(|path| {
            let name = display_path(path);
            match fs::read_to_string(path) {
                Ok(text) => {
                    let found = scan_document(&name, &text, rules);
                    tracing::debug!(file = %name, violations = found.len(), "scanned");
                    (name, Ok(found))
                }
                Err(e) => (name, Err(e.to_string())),
            }
        })
        .collect();

    let mut run = CheckRun::default();
    for (name, res) in per_file {
        match res {
            Ok(mut found) => {
                run.files.push(name);
                run.violations.append(&mut found);
            }
            Err(message) => {
                tracing::error!(file = %name, "failed to read: {message}");
                run.failures.push(FileFailure {
                    file: name,
                    message,
                });
            }
        }
    }
    run
}
