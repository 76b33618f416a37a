//! Output rendering for check, fix, restructure, and rules commands.
//!
//! Supports `human` (default) and `json` outputs. Renderers return strings
//! so they can be tested; the `print_*` wrappers write them to stdout. The
//! structured compliance report (`compose_report`) is the same value that
//! `check --json` writes to disk.

use crate::error::{Error, Result};
use crate::models::{CheckRun, ComplianceReport, FileStats, FixRun, Severity, Summary, Violation};
use crate::restructure::RestructureRun;
use crate::rules::RuleSet;
use crate::utils::use_colors;
use chrono::{DateTime, Local};
use owo_colors::OwoColorize;
use serde_json::json;
use serde_json::Value as JsonVal;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

/// Render the human summary of a check run and whether it is all clear
/// (no error-severity violations).
pub fn report(run: &CheckRun, color: bool) -> (String, bool) {
    (render_check_human(run, color), run.all_clear())
}

/// Print check results in the requested format.
pub fn print_check(run: &CheckRun, output: &str) -> Result<()> {
    match output {
        "json" => {
            let rep = compose_report(run, &Local::now());
            println!("{}", serde_json::to_string_pretty(&rep)?);
        }
        _ => print!("{}", render_check_human(run, use_colors(output))),
    }
    Ok(())
}

pub fn render_check_human(run: &CheckRun, color: bool) -> String {
    let mut out = String::new();
    let errors: Vec<&Violation> = run
        .violations
        .iter()
        .filter(|v| v.severity == Severity::Error)
        .collect();
    let warnings: Vec<&Violation> = run
        .violations
        .iter()
        .filter(|v| v.severity == Severity::Warning)
        .collect();

    for (title, group) in [("Errors", &errors), ("Warnings", &warnings)] {
        if group.is_empty() {
            continue;
        }
        let header = format!("{} ({})", title, group.len());
        if color {
            let _ = writeln!(out, "\n{}", header.bold().underline());
        } else {
            let _ = writeln!(out, "\n{}", header);
        }
        for v in group {
            render_violation(&mut out, v, color);
        }
    }

    for f in &run.failures {
        let tag = if color {
            "✖ ⟦io⟧".red().bold().to_string()
        } else {
            "✖ ⟦io⟧".to_string()
        };
        let _ = writeln!(out, "{} {} — {}", tag, f.file, f.message);
    }

    if run.violations.is_empty() {
        let msg = "✔ No style violations found.";
        if color {
            let _ = writeln!(out, "{}", msg.green().bold());
        } else {
            let _ = writeln!(out, "{}", msg);
        }
    } else {
        let _ = writeln!(out, "\nPer file:");
        for (file, st) in file_stats(run).iter().filter(|(_, s)| s.total > 0) {
            let _ = writeln!(out, "  {}: {} errors, {} warnings", file, st.errors, st.warnings);
        }
    }

    let summary = format!(
        "— Summary — files={} violations={} errors={} warnings={} failures={}",
        run.files.len(),
        run.violations.len(),
        run.errors(),
        run.warnings(),
        run.failures.len()
    );
    if color {
        let _ = writeln!(out, "{}", summary.bold());
    } else {
        let _ = writeln!(out, "{}", summary);
    }
    out
}

fn render_violation(out: &mut String, v: &Violation, color: bool) {
    let (icon, sev) = match v.severity {
        Severity::Error => ("✖", "⟦error⟧"),
        Severity::Warning => ("▲", "⟦warn⟧"),
    };
    let loc = format!("{}:{}:{}", v.file, v.line, v.column);
    if color {
        let (icon, sev) = match v.severity {
            Severity::Error => (icon.red().to_string(), sev.red().bold().to_string()),
            Severity::Warning => (icon.yellow().to_string(), sev.yellow().bold().to_string()),
        };
        let _ = writeln!(
            out,
            "{} {} {} ❲{}❳ — {}",
            icon,
            sev,
            loc.bold(),
            v.rule_id,
            v.description
        );
    } else {
        let _ = writeln!(out, "{} {} {} ❲{}❳ — {}", icon, sev, loc, v.rule_id, v.description);
    }
    let _ = writeln!(out, "    match: {}", v.matched_text);
    let _ = writeln!(out, "    line:  {}", v.line_text);
    if color {
        let _ = writeln!(out, "    {} {}", "hint:".cyan(), v.suggestion);
    } else {
        let _ = writeln!(out, "    hint:  {}", v.suggestion);
    }
}

/// Per-file counts, including scanned files without violations.
pub fn file_stats(run: &CheckRun) -> BTreeMap<String, FileStats> {
    let mut stats: BTreeMap<String, FileStats> = run
        .files
        .iter()
        .map(|f| (f.clone(), FileStats::default()))
        .collect();
    for v in &run.violations {
        let st = stats.entry(v.file.clone()).or_default();
        st.total += 1;
        match v.severity {
            Severity::Error => st.errors += 1,
            Severity::Warning => st.warnings += 1,
        }
    }
    stats
}

/// Compose the structured compliance report (pure) for a check run.
pub fn compose_report(run: &CheckRun, now: &DateTime<Local>) -> ComplianceReport {
    ComplianceReport {
        timestamp: now.to_rfc3339(),
        summary: Summary {
            total_files: run.files.len(),
            total_violations: run.violations.len(),
            errors: run.errors(),
            warnings: run.warnings(),
        },
        violations: run.violations.clone(),
        file_stats: file_stats(run),
    }
}

/// Write `report` as pretty JSON to `path`.
pub fn write_report(report: &ComplianceReport, path: &Path) -> Result<()> {
    let s = serde_json::to_string_pretty(report)?;
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;
    }
    fs::write(path, s).map_err(|e| Error::io(path, e))
}

/// Print fix results in the requested format.
pub fn print_fix(run: &FixRun, output: &str) -> Result<()> {
    match output {
        "json" => println!("{}", serde_json::to_string_pretty(&compose_fix_json(run))?),
        _ => print!("{}", render_fix_human(run, use_colors(output))),
    }
    Ok(())
}

pub fn render_fix_human(run: &FixRun, color: bool) -> String {
    let mut out = String::new();
    for (file, backup) in run.modified.iter().zip(&run.backups) {
        if color {
            let _ = writeln!(out, "{} {} (backup: {})", "✏️  fixed:".green().bold(), file.bold(), backup);
        } else {
            let _ = writeln!(out, "✏️  fixed: {} (backup: {})", file, backup);
        }
    }

    if !run.fixes.is_empty() {
        let _ = writeln!(out, "\nApplied fixes:");
        // rule id -> (description, count, files)
        let mut by_rule: BTreeMap<&str, (&str, usize, Vec<&str>)> = BTreeMap::new();
        for f in &run.fixes {
            let e = by_rule
                .entry(f.rule_id.as_str())
                .or_insert((f.description.as_str(), 0, Vec::new()));
            e.1 += f.occurrence_count;
            if !e.2.contains(&f.file.as_str()) {
                e.2.push(f.file.as_str());
            }
        }
        for (id, (desc, count, files)) in by_rule {
            let _ = writeln!(out, "  - {} ❲{}❳: {} occurrence(s)", desc, id, count);
            let _ = writeln!(out, "    files: {}", files.join(", "));
        }
    }

    if !run.manual.is_empty() {
        let header = format!("\nManual review needed ({}):", run.manual.len());
        if color {
            let _ = writeln!(out, "{}", header.yellow().bold());
        } else {
            let _ = writeln!(out, "{}", header);
        }
        for (i, item) in run.manual.iter().enumerate() {
            let _ = writeln!(out, "  {}. {}", i + 1, item.file);
            let _ = writeln!(out, "     source:  {}", item.source);
            let _ = writeln!(out, "     matches: {}", item.matches.len());
            let _ = writeln!(out, "     hint:    {}", item.suggestion);
            if let Some(ex) = &item.example {
                let _ = writeln!(out, "     example: {}", ex);
            }
        }
    }

    for f in &run.failures {
        let _ = writeln!(out, "✖ ⟦io⟧ {} — {}", f.file, f.message);
    }

    let summary = format!(
        "— Summary — files={} modified={} fixes={} manual={} failures={}",
        run.files_seen,
        run.modified.len(),
        run.fixes.iter().map(|f| f.occurrence_count).sum::<usize>(),
        run.manual.len(),
        run.failures.len()
    );
    if color {
        let _ = writeln!(out, "{}", summary.bold());
    } else {
        let _ = writeln!(out, "{}", summary);
    }
    out
}

/// Compose fix JSON object (pure) for testing/snapshot purposes.
pub fn compose_fix_json(run: &FixRun) -> JsonVal {
    json!({
        "fixes": run.fixes,
        "manualReview": run.manual,
        "modified": run.modified,
        "backups": run.backups,
        "failures": run.failures,
        "summary": {
            "files": run.files_seen,
            "modified": run.modified.len(),
            "fixes": run.fixes.iter().map(|f| f.occurrence_count).sum::<usize>(),
            "manual": run.manual.len(),
            "failures": run.failures.len(),
        }
    })
}

/// Print the verification verdict that follows a fix batch.
pub fn print_verification(run: &CheckRun, output: &str) -> Result<()> {
    print_check(run, output)?;
    if output == "json" {
        return Ok(());
    }
    let color = use_colors(output);
    let msg = if run.all_clear() {
        "All auto-fixable violations are resolved."
    } else {
        "Some violations need manual fixes; see the report above."
    };
    if color && run.all_clear() {
        println!("{}", msg.green().bold());
    } else if color {
        println!("{}", msg.yellow().bold());
    } else {
        println!("{}", msg);
    }
    Ok(())
}

/// Print restructure results.
pub fn print_restructure(run: &RestructureRun, output: &str, write: bool) -> Result<()> {
    match output {
        "json" => {
            let items: Vec<_> = run
                .changed
                .iter()
                .map(|(file, n)| json!({"file": file, "items": n}))
                .collect();
            let out = json!({
                "results": items,
                "backups": run.backups,
                "failures": run.failures,
                "summary": {
                    "files": run.files_seen,
                    "changed": run.changed.len(),
                    "wrote": if write { run.changed.len() } else { 0 },
                }
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        _ => {
            let color = use_colors(output);
            let label = if write { "restructured:" } else { "would restructure:" };
            for (file, n) in &run.changed {
                if color {
                    println!("{} {} ({} items)", label.green().bold(), file.bold(), n);
                } else {
                    println!("{} {} ({} items)", label, file, n);
                }
            }
            for f in &run.failures {
                println!("✖ ⟦io⟧ {} — {}", f.file, f.message);
            }
            if run.changed.is_empty() {
                println!("no changes: {} file(s) checked", run.files_seen);
            }
        }
    }
    Ok(())
}

/// Print the active rule registry.
pub fn print_rules(rules: &RuleSet, output: &str) -> Result<()> {
    match output {
        "json" => {
            let items: Vec<_> = rules
                .iter()
                .map(|r| {
                    json!({
                        "id": r.id,
                        "kind": r.kind_name(),
                        "severity": r.severity,
                        "fixable": r.fixable,
                        "description": r.description,
                        "suggestion": r.suggestion,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&items)?);
        }
        _ => {
            let color = use_colors(output);
            for r in rules.iter() {
                let fix = if r.fixable { "fixable" } else { "manual" };
                let line = format!(
                    "{:<24} {:<10} {:<7} {:<7} {}",
                    r.id,
                    r.kind_name(),
                    r.severity,
                    fix,
                    r.description
                );
                if color && r.severity == Severity::Error {
                    println!("{}", line.red());
                } else {
                    println!("{}", line);
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FileFailure, FixRecord, ManualReviewItem};
    use crate::scan::scan_document;
    use chrono::TimeZone;

    fn sample_run() -> CheckRun {
        let rules = RuleSet::builtin();
        let mut violations = scan_document("a.md", "**見出し**\n**注意** 本文\n", &rules);
        violations.extend(scan_document("b.md", "- 概要 - 説明です\n", &rules));
        CheckRun {
            files: vec!["a.md".into(), "b.md".into(), "clean.md".into()],
            violations,
            failures: vec![],
        }
    }

    #[test]
    fn test_report_counts_are_consistent() {
        let run = sample_run();
        let now = Local.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).single().unwrap();
        let rep = compose_report(&run, &now);
        let v = serde_json::to_value(&rep).unwrap();
        let total = v["summary"]["totalViolations"].as_u64().unwrap();
        assert_eq!(total as usize, v["violations"].as_array().unwrap().len());
        assert_eq!(
            total,
            v["summary"]["errors"].as_u64().unwrap() + v["summary"]["warnings"].as_u64().unwrap()
        );
        assert_eq!(v["summary"]["totalFiles"], 3);
        assert_eq!(v["fileStats"]["clean.md"]["total"], 0);
        assert_eq!(v["fileStats"]["a.md"]["errors"], 1);
        assert_eq!(v["fileStats"]["a.md"]["warnings"], 1);
        assert_eq!(v["violations"][0]["ruleId"], "bold-as-heading");
        assert_eq!(v["violations"][0]["matchedText"], "**見出し**");
        assert!(v["timestamp"].as_str().unwrap().starts_with("2024-05-01T12:00:00"));
    }

    #[test]
    fn test_human_report_groups_by_severity() {
        let run = sample_run();
        let (text, all_clear) = report(&run, false);
        assert!(!all_clear);
        let err_at = text.find("Errors (1)").unwrap();
        let warn_at = text.find("Warnings (2)").unwrap();
        assert!(err_at < warn_at);
        assert!(text.contains("a.md:1:1 ❲bold-as-heading❳"));
        assert!(text.contains("  b.md: 0 errors, 1 warnings"));
        assert!(!text.contains("clean.md:"));
        assert!(text.contains("— Summary — files=3 violations=3 errors=1 warnings=2 failures=0"));
    }

    #[test]
    fn test_human_report_all_clear() {
        let run = CheckRun {
            files: vec!["ok.md".into()],
            violations: vec![],
            failures: vec![FileFailure {
                file: "bad.md".into(),
                message: "permission denied".into(),
            }],
        };
        let (text, all_clear) = report(&run, false);
        assert!(all_clear);
        assert!(text.contains("No style violations found"));
        assert!(text.contains("⟦io⟧ bad.md — permission denied"));
    }

    #[test]
    fn test_write_report_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/report.json");
        let rep = compose_report(&sample_run(), &Local::now());
        write_report(&rep, &path).unwrap();
        let v: JsonVal = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(v["summary"]["totalViolations"], 3);
    }

    #[test]
    fn test_fix_json_and_human_aggregate_by_rule() {
        let run = FixRun {
            fixes: vec![
                FixRecord {
                    file: "a.md".into(),
                    rule_id: "incorrect-code-listing".into(),
                    description: "listing".into(),
                    occurrence_count: 2,
                },
                FixRecord {
                    file: "b.md".into(),
                    rule_id: "incorrect-code-listing".into(),
                    description: "listing".into(),
                    occurrence_count: 1,
                },
            ],
            manual: vec![ManualReviewItem {
                file: "a.md".into(),
                source: "bold-as-heading".into(),
                matches: vec!["**x**".into()],
                suggestion: "use a heading".into(),
                example: Some("**x** → ### x".into()),
            }],
            modified: vec!["a.md".into(), "b.md".into()],
            backups: vec!["backup/a.md.backup.1".into(), "backup/b.md.backup.1".into()],
            failures: vec![],
            files_seen: 3,
        };
        let v = compose_fix_json(&run);
        assert_eq!(v["summary"]["fixes"], 3);
        assert_eq!(v["summary"]["manual"], 1);
        assert_eq!(v["manualReview"][0]["source"], "bold-as-heading");
        let text = render_fix_human(&run, false);
        assert!(text.contains("listing ❲incorrect-code-listing❳: 3 occurrence(s)"));
        assert!(text.contains("files: a.md, b.md"));
        assert!(text.contains("example: **x** → ### x"));
        assert!(text.contains("files=3 modified=2 fixes=3 manual=1 failures=0"));
    }
}
