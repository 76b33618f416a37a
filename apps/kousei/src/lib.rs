//! kousei core library.
//!
//! This crate exposes programmatic APIs for checking and fixing Markdown
//! manuscripts against a registry of style rules.
//!
//! High-level modules:
//! - `cli`: CLI argument parsing (binary uses this).
//! - `config`: Discovery and effective configuration resolution.
//! - `rules`: Rule registry, auto-fix rules, and manual-review suggestions.
//! - `exclusion`: Code-fence/comment regions and the allow-list.
//! - `markdown`: Line and list-item helpers shared by the passes.
//! - `scan`: Per-document violation scanning.
//! - `check`: Batch check over a file set.
//! - `fix`: Fixpoint auto-fixer with backups.
//! - `restructure`: Colon list items into nested lists.
//! - `backup`: Timestamped backups and cleanup.
//! - `models`: Violation, report, and run result structs.
//! - `output`: Human/JSON printers.
//! - `error`, `logging`, `discover`, `utils`: Supporting pieces.
pub mod backup;
pub mod check;
pub mod cli;
pub mod config;
pub mod discover;
pub mod error;
pub mod exclusion;
pub mod fix;
pub mod logging;
pub mod markdown;
pub mod models;
pub mod output;
pub mod restructure;
pub mod rules;
pub mod scan;
pub mod utils;
