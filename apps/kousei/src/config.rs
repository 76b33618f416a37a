//! Configuration discovery and effective settings resolution.
//!
//! kousei reads `kousei.toml|yaml|yml` from the repository root (or closest
//! ancestor) and merges it with CLI flags to produce an `Effective` config.
//! Defaults:
//! - `dir`: `manuscripts`
//! - `output`: `human`
//! - `check.report`: `compliance-report.json`
//! - `fix.backup_dir`: `backup`
//! - `fix.cleanup_days`: 7
//! - `fix.verify`: true
//! - `rules.disable`: empty, `rules.custom`: empty
//!
//! Overrides precedence: CLI > config file > defaults.

use crate::error::{Error, Result};
use crate::rules::RulesCfg;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_DIR: &str = "manuscripts";
pub const DEFAULT_REPORT: &str = "compliance-report.json";
pub const DEFAULT_BACKUP_DIR: &str = "backup";
pub const DEFAULT_CLEANUP_DAYS: u64 = 7;

const CONFIG_FILES: [&str; 3] = ["kousei.toml", "kousei.yaml", "kousei.yml"];

#[derive(Debug, Default, Deserialize, Clone)]
/// Check-related configuration section under `[check]`.
pub struct CheckCfg {
    pub report: Option<String>,
}

#[derive(Debug, Default, Deserialize, Clone)]
/// Fix-related configuration section under `[fix]`.
pub struct FixCfg {
    pub backup_dir: Option<String>,
    pub cleanup_days: Option<u64>,
    pub verify: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Clone)]
/// Root configuration loaded from `kousei.toml|yaml`.
pub struct KouseiConfig {
    pub dir: Option<String>,
    pub output: Option<String>,
    pub check: Option<CheckCfg>,
    pub fix: Option<FixCfg>,
    #[serde(default)]
    pub rules: Option<RulesCfg>,
}

#[derive(Debug, Clone)]
/// Fully-resolved configuration used by commands after applying precedence.
pub struct Effective {
    pub repo_root: PathBuf,
    pub config_path: Option<PathBuf>,
    /// Directory or single file to process.
    pub target: PathBuf,
    pub output: String,
    pub report_path: PathBuf,
    pub backup_dir: String,
    pub cleanup_days: u64,
    pub verify: bool,
    pub rules: RulesCfg,
}

/// Walk upward from `start` to detect the repository root.
///
/// Stops when a `kousei.toml|yaml|yml` or a `.git` directory is found.
pub fn detect_repo_root(start: &Path) -> PathBuf {
    let start = start.canonicalize().unwrap_or_else(|_| start.to_path_buf());
    let mut cur = start.as_path();
    loop {
        if CONFIG_FILES.iter().any(|f| cur.join(f).exists()) || cur.join(".git").exists() {
            return cur.to_path_buf();
        }
        match cur.parent() {
            Some(p) => cur = p,
            None => return start,
        }
    }
}

/// Path of the config file under `root`, if any.
pub fn find_config(root: &Path) -> Option<PathBuf> {
    CONFIG_FILES
        .iter()
        .map(|f| root.join(f))
        .find(|p| p.exists())
}

/// Load `KouseiConfig` from `kousei.toml` or `kousei.yaml|yml` if present.
///
/// A config file that exists but does not parse is an error, not a silent
/// fallback to defaults.
pub fn load_config(root: &Path) -> Result<Option<KouseiConfig>> {
    let Some(path) = find_config(root) else {
        return Ok(None);
    };
    let s = fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
    let is_toml = path.extension().is_some_and(|e| e == "toml");
    let cfg = if is_toml {
        toml::from_str::<KouseiConfig>(&s).map_err(|e| Error::Config {
            path: path.clone(),
            message: e.to_string(),
        })?
    } else {
        serde_yaml::from_str::<KouseiConfig>(&s).map_err(|e| Error::Config {
            path: path.clone(),
            message: e.to_string(),
        })?
    };
    Ok(Some(cfg))
}

/// Resolve `Effective` by merging CLI flags, discovered config, and defaults.
///
/// `cli_target` is taken relative to the working directory; the configured
/// `dir` is taken relative to the repository root.
pub fn resolve_effective(
    cli_repo_root: Option<&str>,
    cli_target: Option<&str>,
    cli_output: Option<&str>,
    cli_report: Option<&str>,
) -> Result<Effective> {
    let start = PathBuf::from(cli_repo_root.unwrap_or("."));
    let repo_root = detect_repo_root(&start);
    let config_path = find_config(&repo_root);
    let cfg = load_config(&repo_root)?.unwrap_or_default();

    let target = match cli_target {
        Some(t) => PathBuf::from(t),
        None => repo_root.join(cfg.dir.as_deref().unwrap_or(DEFAULT_DIR)),
    };

    let output = cli_output
        .map(|s| s.to_string())
        .or(cfg.output)
        .unwrap_or_else(|| "human".to_string());
    if output != "human" && output != "json" {
        return Err(Error::Config {
            path: config_path.clone().unwrap_or_else(|| repo_root.clone()),
            message: format!("unknown output mode '{output}' (expected human|json)"),
        });
    }

    let report_path = match cli_report {
        Some(r) => PathBuf::from(r),
        None => repo_root.join(
            cfg.check
                .as_ref()
                .and_then(|c| c.report.as_deref())
                .unwrap_or(DEFAULT_REPORT),
        ),
    };

    let fix = cfg.fix.unwrap_or_default();
    Ok(Effective {
        repo_root,
        config_path,
        target,
        output,
        report_path,
        backup_dir: fix
            .backup_dir
            .unwrap_or_else(|| DEFAULT_BACKUP_DIR.to_string()),
        cleanup_days: fix.cleanup_days.unwrap_or(DEFAULT_CLEANUP_DAYS),
        verify: fix.verify.unwrap_or(true),
        rules: cfg.rules.unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_without_config() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        let eff = resolve_effective(dir.path().to_str(), None, None, None).unwrap();
        assert!(eff.config_path.is_none());
        assert!(eff.target.ends_with(DEFAULT_DIR));
        assert_eq!(eff.output, "human");
        assert!(eff.report_path.ends_with(DEFAULT_REPORT));
        assert_eq!(eff.backup_dir, "backup");
        assert_eq!(eff.cleanup_days, 7);
        assert!(eff.verify);
        assert!(eff.rules.disable.is_empty());
    }

    #[test]
    fn test_detect_and_load_toml() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        let mut f = fs::File::create(root.join("kousei.toml")).unwrap();
        writeln!(
            f,
            "{}",
            r#"
dir = "chapters"
output = "json"
[check]
report = "out/report.json"
[fix]
backup_dir = ".bak"
cleanup_days = 3
verify = false
[rules]
disable = ["bold-info-prefix"]
[[rules.custom]]
id = "no-todo"
pattern = "TODO"
description = "Leftover TODO"
    "#
        )
        .unwrap();
        let nested = root.join("chapters/part1");
        fs::create_dir_all(&nested).unwrap();

        // Discovery walks up from a nested directory
        let eff = resolve_effective(nested.to_str(), None, None, None).unwrap();
        assert_eq!(eff.repo_root, root.canonicalize().unwrap());
        assert!(eff.target.ends_with("chapters"));
        assert_eq!(eff.output, "json");
        assert!(eff.report_path.ends_with("out/report.json"));
        assert_eq!(eff.backup_dir, ".bak");
        assert_eq!(eff.cleanup_days, 3);
        assert!(!eff.verify);
        assert_eq!(eff.rules.disable, vec!["bold-info-prefix".to_string()]);
        assert_eq!(eff.rules.custom[0].id, "no-todo");
    }

    #[test]
    fn test_load_yaml_and_cli_precedence() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(
            root.join("kousei.yaml"),
            "dir: docs\noutput: json\ncheck:\n  report: r.json\n",
        )
        .unwrap();
        let eff = resolve_effective(root.to_str(), Some("ms/ch01.md"), Some("human"), Some("x.json"))
            .unwrap();
        assert_eq!(eff.target, PathBuf::from("ms/ch01.md"));
        assert_eq!(eff.output, "human");
        assert_eq!(eff.report_path, PathBuf::from("x.json"));
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("kousei.toml"), "dir = [unclosed").unwrap();
        assert!(matches!(
            resolve_effective(dir.path().to_str(), None, None, None),
            Err(Error::Config { .. })
        ));
    }

    #[test]
    fn test_unknown_output_mode_rejected() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        assert!(resolve_effective(dir.path().to_str(), None, Some("xml"), None).is_err());
    }
}
