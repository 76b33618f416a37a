//! Fixer: applies the deterministic rewrites and routes everything else to
//! manual review.
//!
//! Behavior:
//! - Fix rules run in declaration order, only for rules enabled in the
//!   active `RuleSet`, skipping matches inside exclusion spans. The list is
//!   re-applied until nothing changes (bounded), so fixing is idempotent.
//! - After rewriting, every remaining rule violation (non-fixable rules and
//!   forms the rewrites do not cover) and every manual-suggestion match
//!   becomes a `ManualReviewItem`.
//! - A file is written back only when its text changed, and only after its
//!   backup has been persisted.

use crate::backup;
use crate::error::{Error, Result};
use crate::exclusion::ExclusionZones;
use crate::models::{FileFailure, FixRecord, FixRun, ManualReviewItem};
use crate::rules::{auto_fixes, manual_suggestions, FixRule, RuleSet};
use crate::scan::scan_document;
use crate::utils::display_path;
use chrono::{DateTime, Local};
use std::fs;
use std::path::{Path, PathBuf};

/// Upper bound on full passes over the fix list.
const MAX_PASSES: usize = 8;

/// Result of fixing one document in memory.
#[derive(Debug, Clone)]
pub struct FixOutcome {
    pub text: String,
    pub fixes: Vec<FixRecord>,
    pub manual: Vec<ManualReviewItem>,
}

impl FixOutcome {
    pub fn changed(&self, original: &str) -> bool {
        self.text != original
    }
}

/// Fix `text` (the contents of `file`) without touching the filesystem.
pub fn fix_document(file: &str, text: &str, rules: &RuleSet) -> FixOutcome {
    let active: Vec<&FixRule> = auto_fixes()
        .iter()
        .filter(|f| rules.contains(f.rule_id))
        .collect();
    let mut counts = vec![0usize; active.len()];
    let mut current = text.to_string();
    for _ in 0..MAX_PASSES {
        let mut changed = false;
        for (i, fx) in active.iter().enumerate() {
            let (next, n) = apply_fix(&current, fx);
            if n > 0 {
                counts[i] += n;
                current = next;
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    let fixes = active
        .iter()
        .zip(&counts)
        .filter(|(_, n)| **n > 0)
        .map(|(fx, n)| FixRecord {
            file: file.to_string(),
            rule_id: fx.id.to_string(),
            description: fx.description.to_string(),
            occurrence_count: *n,
        })
        .collect();
    let manual = manual_review(file, &current, rules);
    FixOutcome {
        text: current,
        fixes,
        manual,
    }
}

/// Replace every non-excluded match of `fx` in `text`, returning the new text
/// and the number of replacements.
pub fn apply_fix(text: &str, fx: &FixRule) -> (String, usize) {
    let zones = ExclusionZones::from_text(text);
    let mut out = String::with_capacity(text.len());
    let mut last = 0usize;
    let mut n = 0usize;
    for caps in fx.pattern.captures_iter(text) {
        let Some(m) = caps.get(0) else { continue };
        if zones.is_excluded(text, m.range()) {
            continue;
        }
        out.push_str(&text[last..m.start()]);
        caps.expand(fx.replacement, &mut out);
        last = m.end();
        n += 1;
    }
    if n == 0 {
        return (text.to_string(), 0);
    }
    out.push_str(&text[last..]);
    (out, n)
}

fn manual_review(file: &str, text: &str, rules: &RuleSet) -> Vec<ManualReviewItem> {
    let violations = scan_document(file, text, rules);
    let mut items: Vec<ManualReviewItem> = Vec::new();
    for rule in rules.iter() {
        let matches: Vec<String> = violations
            .iter()
            .filter(|v| v.rule_id == rule.id)
            .map(|v| v.matched_text.clone())
            .collect();
        if !matches.is_empty() {
            items.push(ManualReviewItem {
                file: file.to_string(),
                source: rule.id.clone(),
                matches,
                suggestion: rule.suggestion.clone(),
                example: None,
            });
        }
    }

    let zones = ExclusionZones::from_text(text);
    for sug in manual_suggestions() {
        let matches: Vec<String> = sug
            .pattern
            .find_iter(text)
            .filter(|m| !zones.is_excluded(text, m.range()))
            .map(|m| m.as_str().to_string())
            .collect();
        if matches.is_empty() {
            continue;
        }
        if let Some(item) = items.iter_mut().find(|it| it.source == sug.rule_id) {
            item.example = Some(sug.example.to_string());
            continue;
        }
        items.push(ManualReviewItem {
            file: file.to_string(),
            source: sug.pattern.as_str().to_string(),
            matches,
            suggestion: sug.suggestion.to_string(),
            example: Some(sug.example.to_string()),
        });
    }
    items
}

/// A file fixed on disk.
#[derive(Debug, Clone)]
pub struct FileFix {
    pub outcome: FixOutcome,
    /// Set when the file changed; the backup was written before the file.
    pub backup: Option<PathBuf>,
}

/// Fix one file in place, writing its backup first when the text changes.
pub fn fix_file(
    path: &Path,
    rules: &RuleSet,
    backup_dir: &str,
    now: &DateTime<Local>,
) -> Result<FileFix> {
    let original = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    let outcome = fix_document(&display_path(path), &original, rules);
    if !outcome.changed(&original) {
        return Ok(FileFix {
            outcome,
            backup: None,
        });
    }
    let backup = backup::write_backup(path, &original, backup_dir, now)?;
    fs::write(path, &outcome.text).map_err(|e| Error::io(path, e))?;
    tracing::info!(file = %path.display(), fixes = outcome.fixes.len(), "fixed");
    Ok(FileFix {
        outcome,
        backup: Some(backup),
    })
}

/// Fix every file in order. Per-file failures are recorded and skipped.
pub fn run_fix(
    files: &[PathBuf],
    rules: &RuleSet,
    backup_dir: &str,
    now: &DateTime<Local>,
) -> FixRun {
    let mut run = FixRun::default();
    for path in files {
        run.files_seen += 1;
        let name = display_path(path);
        tracing::debug!(file = %name, "fixing");
        match fix_file(path, rules, backup_dir, now) {
            Ok(ff) => {
                if let Some(b) = ff.backup {
                    run.modified.push(name);
                    run.backups.push(display_path(&b));
                }
                run.fixes.extend(ff.outcome.fixes);
                run.manual.extend(ff.outcome.manual);
            }
            Err(e) => {
                tracing::error!(file = %name, "fix failed: {e}");
                run.failures.push(FileFailure {
                    file: name,
                    message: e.to_string(),
                });
            }
        }
    }
    run
}
