//! CLI definition and parsing.
//!
//! Notes:
//! - CLI flags override values from the XML config file.
//! - --debug is a shorthand for --log-level debug.

use clap::{Parser, ValueHint};
use std::path::PathBuf;

use crate::config::types::{Config, LogLevel};

/// Move manifest bundles out of an inbox directory tree.
#[derive(Parser, Debug, Clone)]
#[command(
    author,
    version,
    about = "Move XML manifests and their attachments out of an inbox, one bundle at a time"
)]
pub struct Args {
    /// Config file to read instead of BUNDLE_MOVER_CONFIG / the default location.
    #[arg(long, short = 'c', value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Inbox root scanned for manifests.
    #[arg(long, value_hint = ValueHint::DirPath)]
    pub source_directory: Option<PathBuf>,

    /// Destination for manifests and other .xml members.
    #[arg(long, value_hint = ValueHint::DirPath)]
    pub xml_destination: Option<PathBuf>,

    /// Destination for attachments.
    #[arg(long, value_hint = ValueHint::DirPath)]
    pub attachment_destination: Option<PathBuf>,

    /// Reset permissions on moved files ("true" or "false").
    #[arg(long, value_name = "BOOL")]
    pub reset_permissions: Option<String>,

    /// Enable debug logging (shorthand for --log-level debug).
    #[arg(short = 'd', long)]
    pub debug: bool,

    /// Set log level: quiet, normal, info, debug.
    #[arg(long)]
    pub log_level: Option<String>,

    /// Also write logs to this file.
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub log_file: Option<PathBuf>,

    /// Emit logs in structured JSON.
    #[arg(long)]
    pub json: bool,

    /// Run a single pass and exit instead of polling.
    #[arg(long)]
    pub once: bool,

    /// Print the config file location and exit.
    #[arg(long)]
    pub print_config: bool,
}

impl Args {
    /// Effective log level derived from flags.
    /// Precedence: --debug > --log-level value > None (use config default).
    pub fn effective_log_level(&self) -> Option<LogLevel> {
        if self.debug {
            return Some(LogLevel::Debug);
        }
        self.log_level.as_deref().and_then(LogLevel::parse)
    }

    /// Apply CLI overrides to a loaded Config (in-place). No-ops for unset flags.
    pub fn apply_overrides(&self, cfg: &mut Config) {
        if let Some(p) = &self.source_directory {
            cfg.source_directory = Some(p.clone());
        }
        if let Some(p) = &self.xml_destination {
            cfg.xml_destination = Some(p.clone());
        }
        if let Some(p) = &self.attachment_destination {
            cfg.attachment_destination = Some(p.clone());
        }
        if let Some(raw) = &self.reset_permissions {
            cfg.set_reset_permissions_raw(raw);
        }
        if let Some(level) = self.effective_log_level() {
            cfg.log_level = level;
        }
        if let Some(p) = &self.log_file {
            cfg.log_file = Some(p.clone());
        }
    }
}

pub fn parse() -> Args {
    Args::parse()
}
