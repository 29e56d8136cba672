//! Core configuration types.
//! - Config holds the three directories plus runtime knobs.
//! - LogLevel represents verbosity with simple parsing helpers.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use super::paths;

/// Program-defined verbosity levels exposed to users/config.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Only errors
    Quiet,
    /// Informational output (default)
    #[default]
    Normal,
    /// More info (like verbose)
    Info,
    /// Debug/trace
    Debug,
}

impl LogLevel {
    /// Parse common string names into our LogLevel (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "quiet" | "error" | "none" => Some(LogLevel::Quiet),
            "normal" => Some(LogLevel::Normal),
            "info" | "verbose" | "detailed" => Some(LogLevel::Info),
            "debug" | "trace" => Some(LogLevel::Debug),
            _ => None,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Quiet => "quiet",
            LogLevel::Normal => "normal",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        };
        f.write_str(s)
    }
}

impl FromStr for LogLevel {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("invalid log level: '{s}'"))
    }
}

/// Parse a boolean setting: only "true"/"false" (any case, surrounding whitespace ignored).
pub fn parse_flag(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

/// Runtime configuration used by the mover.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Inbox root scanned for manifests
    pub source_directory: Option<PathBuf>,
    /// Where manifests (and any other `.xml` member) end up
    pub xml_destination: Option<PathBuf>,
    /// Where every non-xml member ends up
    pub attachment_destination: Option<PathBuf>,
    /// Reset destination permissions after a complete bundle move
    pub reset_permissions: bool,
    /// Raw value of reset_permissions_after_move when it was neither true nor false
    pub invalid_reset_value: Option<String>,
    /// Console verbosity
    pub log_level: LogLevel,
    /// Optional path to a log file
    pub log_file: Option<PathBuf>,
}

impl Config {
    /// Construct a Config with explicit directories; other fields use defaults.
    pub fn new(
        source_directory: impl Into<PathBuf>,
        xml_destination: impl Into<PathBuf>,
        attachment_destination: impl Into<PathBuf>,
    ) -> Self {
        Self {
            source_directory: Some(source_directory.into()),
            xml_destination: Some(xml_destination.into()),
            attachment_destination: Some(attachment_destination.into()),
            log_file: paths::default_log_path(),
            ..Default::default()
        }
    }

    /// Apply a raw reset_permissions_after_move value; invalid values fall back to false.
    pub fn set_reset_permissions_raw(&mut self, raw: &str) {
        match parse_flag(raw) {
            Some(v) => {
                self.reset_permissions = v;
                self.invalid_reset_value = None;
            }
            None => {
                self.reset_permissions = false;
                self.invalid_reset_value = Some(raw.to_string());
            }
        }
    }
}
