//! Shared data models for check/fix outputs.
//!
//! Everything here is plain data: produced once by a scan or fix pass and
//! never mutated afterwards. Field names serialize in camelCase to keep the
//! JSON report shape stable for CI consumers.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Rule severity. Only `Error` affects exit codes.
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
/// One located failure of a rule against a document.
pub struct Violation {
    pub file: String,
    pub line: usize,
    pub column: usize,
    pub rule_id: String,
    pub severity: Severity,
    pub description: String,
    pub suggestion: String,
    pub matched_text: String,
    pub line_text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
/// Per-file violation counts.
pub struct FileStats {
    pub errors: usize,
    pub warnings: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
/// Aggregate counts for a check run.
pub struct Summary {
    pub total_files: usize,
    pub total_violations: usize,
    pub errors: usize,
    pub warnings: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
/// Structured report written by `check --json`.
pub struct ComplianceReport {
    pub timestamp: String,
    pub summary: Summary,
    pub violations: Vec<Violation>,
    pub file_stats: BTreeMap<String, FileStats>,
}

#[derive(Debug, Clone, Serialize)]
/// A file that could not be read or written during a batch run.
pub struct FileFailure {
    pub file: String,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
/// Accumulated result of scanning a set of files.
pub struct CheckRun {
    /// Every file that was scanned successfully, in path order.
    pub files: Vec<String>,
    pub violations: Vec<Violation>,
    pub failures: Vec<FileFailure>,
}

impl CheckRun {
    pub fn errors(&self) -> usize {
        self.violations
            .iter()
            .filter(|v| v.severity == Severity::Error)
            .count()
    }

    pub fn warnings(&self) -> usize {
        self.violations
            .iter()
            .filter(|v| v.severity == Severity::Warning)
            .count()
    }

    /// True when no error-severity violation was found. Warnings never fail a run.
    pub fn all_clear(&self) -> bool {
        self.errors() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
/// A deterministic replacement applied by the fixer.
pub struct FixRecord {
    pub file: String,
    pub rule_id: String,
    pub description: String,
    pub occurrence_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
/// A match that needs a human decision.
pub struct ManualReviewItem {
    pub file: String,
    /// Rule id, or the pattern source for ad-hoc suggestions.
    pub source: String,
    pub matches: Vec<String>,
    pub suggestion: String,
    pub example: Option<String>,
}

#[derive(Debug, Clone, Default)]
/// Accumulated result of a fix batch.
pub struct FixRun {
    pub fixes: Vec<FixRecord>,
    pub manual: Vec<ManualReviewItem>,
    /// Files whose content changed and was written back.
    pub modified: Vec<String>,
    /// Backups written, one per modified file.
    pub backups: Vec<String>,
    pub failures: Vec<FileFailure>,
    pub files_seen: usize,
}
