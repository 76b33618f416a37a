//! CLI argument parsing via `clap`.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "kousei",
    version,
    about = "Markdown style checker and fixer for manuscripts",
    long_about = "kousei — check and fix Markdown manuscripts against a fixed set of style rules.\n\nConfiguration precedence: CLI > kousei.toml > defaults.",
    after_help = "Examples:\n  kousei check\n  kousei check manuscripts/ch01.md --json --output report.json\n  kousei fix --cleanup\n  kousei restructure --dry-run\n  kousei rules --format json",
    arg_required_else_help = true
)]
/// Top-level CLI options and subcommands.
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand)]
/// Supported subcommands for checking, fixing, and restructuring.
pub enum Commands {
    /// Show version
    #[command(about = "Show version", long_about = "Print the current kousei version.")]
    Version,
    /// Scan manuscripts and report violations
    #[command(
        about = "Run style checks",
        long_about = "Scan every Markdown file under the target and report rule violations. Error-severity violations and unreadable files make the run exit 1; warnings never do.",
        after_help = "Examples:\n  kousei check\n  kousei check manuscripts --format json\n  kousei check --json --output out/report.json"
    )]
    Check {
        #[arg(long, help = "Repository root (default: current dir)")]
        repo_root: Option<String>,
        #[arg(help = "Directory or Markdown file to check (default: manuscripts)")]
        path: Option<String>,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Also write the JSON compliance report")]
        json: bool,
        #[arg(long, help = "Report path used with --json (default: compliance-report.json)")]
        output: Option<String>,
        #[arg(long, help = "Output mode: human|json (default: human)")]
        format: Option<String>,
    },
    /// Apply automatic fixes
    #[command(
        about = "Apply automatic fixes",
        long_about = "Rewrite fixable violations in place. Each changed file is backed up first. Remaining violations are listed for manual review, then a verification check runs over the same target.",
        after_help = "Examples:\n  kousei fix\n  kousei fix manuscripts/ch03.md --skip-verify\n  kousei fix --cleanup --cleanup-days 14"
    )]
    Fix {
        #[arg(long, help = "Repository root (default: current dir)")]
        repo_root: Option<String>,
        #[arg(help = "Directory or Markdown file to fix (default: manuscripts)")]
        path: Option<String>,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Skip the verification check after fixing")]
        skip_verify: bool,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Delete old backups before fixing")]
        cleanup: bool,
        #[arg(long, help = "Age in days after which backups are deleted (default: 7)")]
        cleanup_days: Option<u64>,
        #[arg(long, help = "Output mode: human|json (default: human)")]
        format: Option<String>,
    },
    /// Convert `title：description` list items into nested lists
    #[command(
        about = "Restructure colon list items",
        long_about = "Split flat `- title：description` list items into a title item with a nested description item. Changed files are backed up first.",
        after_help = "Examples:\n  kousei restructure --dry-run\n  kousei restructure manuscripts/ch02.md"
    )]
    Restructure {
        #[arg(long, help = "Repository root (default: current dir)")]
        repo_root: Option<String>,
        #[arg(help = "Directory or Markdown file to restructure (default: manuscripts)")]
        path: Option<String>,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Report planned changes without writing")]
        dry_run: bool,
        #[arg(long, help = "Output mode: human|json (default: human)")]
        format: Option<String>,
    },
    /// List active rules
    #[command(
        about = "List active rules",
        long_about = "Print every active rule after applying the [rules] section of kousei.toml: id, kind, severity, fixable flag, and description."
    )]
    Rules {
        #[arg(long, help = "Repository root (default: current dir)")]
        repo_root: Option<String>,
        #[arg(long, help = "Output mode: human|json (default: human)")]
        format: Option<String>,
    },
}
