//! kousei CLI binary entry point.
//! Delegates to library modules for check/fix/restructure and prints results.

use chrono::Local;
use clap::Parser;
use kousei::cli::{Cli, Commands};
use kousei::config::{self, Effective};
use kousei::error::Result;
use kousei::rules::RuleSet;
use kousei::utils::{error_prefix, info_prefix, note_prefix};
use kousei::{backup, check, discover, fix, logging, output, restructure};
use std::time::SystemTime;

fn main() {
    logging::init_tracing();
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // help and version go to stdout and are not failures
            let _ = e.print();
            std::process::exit(if e.use_stderr() { 1 } else { 0 });
        }
    };
    let code = match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {}", error_prefix(), e);
            1
        }
    };
    std::process::exit(code);
}

/// Resolve settings and build the active rule set, noting when defaults apply.
fn prepare(
    repo_root: Option<&str>,
    path: Option<&str>,
    format: Option<&str>,
    report: Option<&str>,
) -> Result<(Effective, RuleSet)> {
    let eff = config::resolve_effective(repo_root, path, format, report)?;
    if eff.config_path.is_none() && eff.output != "json" {
        eprintln!("{} No kousei.toml found; using defaults.", note_prefix());
    }
    let rules = RuleSet::from_config(&eff.rules)?;
    tracing::debug!(rules = rules.len(), target = %eff.target.display(), "resolved");
    Ok((eff, rules))
}

fn run(cli: Cli) -> Result<i32> {
    match cli.cmd {
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(0)
        }
        Commands::Check {
            repo_root,
            path,
            json,
            output: report,
            format,
        } => {
            let (eff, rules) = prepare(
                repo_root.as_deref(),
                path.as_deref(),
                format.as_deref(),
                report.as_deref(),
            )?;
            let files = discover::collect_markdown(&eff.target)?;
            let run = check::run_check(&files, &rules);
            output::print_check(&run, &eff.output)?;
            if json {
                let report = output::compose_report(&run, &Local::now());
                output::write_report(&report, &eff.report_path)?;
                if eff.output != "json" {
                    eprintln!(
                        "{} Report written to {}",
                        info_prefix(),
                        kousei::utils::display_path(&eff.report_path)
                    );
                }
            }
            let ok = run.all_clear() && run.failures.is_empty();
            Ok(if ok { 0 } else { 1 })
        }
        Commands::Fix {
            repo_root,
            path,
            skip_verify,
            cleanup,
            cleanup_days,
            format,
        } => {
            let (eff, rules) = prepare(
                repo_root.as_deref(),
                path.as_deref(),
                format.as_deref(),
                None,
            )?;
            if cleanup {
                let days = cleanup_days.unwrap_or(eff.cleanup_days);
                let removed = backup::cleanup_backups(&eff.target, days, SystemTime::now())?;
                if eff.output != "json" {
                    eprintln!(
                        "{} Removed {} backup(s) older than {} day(s).",
                        info_prefix(),
                        removed,
                        days
                    );
                }
            }
            let files = discover::collect_markdown(&eff.target)?;
            let run = fix::run_fix(&files, &rules, &eff.backup_dir, &Local::now());
            output::print_fix(&run, &eff.output)?;
            if eff.verify && !skip_verify {
                let files = discover::collect_markdown(&eff.target)?;
                let verification = check::run_check(&files, &rules);
                output::print_verification(&verification, &eff.output)?;
            }
            Ok(0)
        }
        Commands::Restructure {
            repo_root,
            path,
            dry_run,
            format,
        } => {
            let (eff, _) = prepare(
                repo_root.as_deref(),
                path.as_deref(),
                format.as_deref(),
                None,
            )?;
            let files = discover::collect_markdown(&eff.target)?;
            let write = !dry_run;
            let run = restructure::run_restructure(&files, write, &eff.backup_dir, &Local::now());
            output::print_restructure(&run, &eff.output, write)?;
            Ok(if run.failures.is_empty() { 0 } else { 1 })
        }
        Commands::Rules { repo_root, format } => {
            let (eff, rules) = prepare(repo_root.as_deref(), None, format.as_deref(), None)?;
            output::print_rules(&rules, &eff.output)?;
            Ok(0)
        }
    }
}
