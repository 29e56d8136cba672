//! XML configuration support.
//! - Loads settings from config.xml (quick_xml + serde).
//! - Unknown XML fields are rejected so typos surface at startup.
//!
//! Notes:
//! - This module only reads the config file; directory validation happens elsewhere.

use quick_xml::de::from_str as from_xml_str;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::paths::default_config_path;
use super::types::{Config, LogLevel};
use crate::errors::ConfigError;

/// Struct mirroring the XML config for deserialization.
#[derive(Debug, Deserialize)]
#[serde(rename = "config")]
#[serde(deny_unknown_fields)]
struct XmlConfig {
    source_directory: Option<String>,
    xml_destination_directory: Option<String>,
    attachment_destination_directory: Option<String>,
    reset_permissions_after_move: Option<String>,
    log_level: Option<String>,
    log_file: Option<String>,
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

// Map XmlConfig -> Config
fn xml_to_config(parsed: XmlConfig) -> Config {
    let mut cfg = Config {
        log_file: super::paths::default_log_path(),
        ..Default::default()
    };

    cfg.source_directory = non_empty(parsed.source_directory.as_deref()).map(PathBuf::from);
    cfg.xml_destination = non_empty(parsed.xml_destination_directory.as_deref()).map(PathBuf::from);
    cfg.attachment_destination =
        non_empty(parsed.attachment_destination_directory.as_deref()).map(PathBuf::from);

    if let Some(raw) = parsed.reset_permissions_after_move.as_deref() {
        cfg.set_reset_permissions_raw(raw);
    }
    if let Some(level) = non_empty(parsed.log_level.as_deref()).and_then(LogLevel::parse) {
        cfg.log_level = level;
    }
    if let Some(file) = non_empty(parsed.log_file.as_deref()) {
        cfg.log_file = Some(PathBuf::from(file));
    }

    cfg
}

/// Load a Config from a specific XML file path.
pub fn load_config_from_xml_path(path: &Path) -> Result<Config, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed: XmlConfig = from_xml_str(&contents).map_err(|e| ConfigError::Malformed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    Ok(xml_to_config(parsed))
}

/// Load the config from `$BUNDLE_MOVER_CONFIG` or the default location.
/// Returns Ok(None) when no config file exists there.
pub fn load_config() -> Result<Option<Config>, ConfigError> {
    let Some(path) = default_config_path() else {
        return Ok(None);
    };
    if !path.exists() {
        debug!(path = %path.display(), "no config file found");
        return Ok(None);
    }
    debug!(path = %path.display(), "loading config");
    load_config_from_xml_path(&path).map(Some)
}
