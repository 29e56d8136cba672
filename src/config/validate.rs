//! Config validation logic.
//! Verifies that every configured directory exists and is a directory and that
//! no destination sits inside the inbox, then canonicalizes the paths. Runs once
//! at startup.

use std::path::{Path, PathBuf};
use tracing::{error, info};

use super::types::Config;
use crate::errors::ConfigError;

/// Directories the worker needs, all verified and canonical.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directories {
    pub source: PathBuf,
    pub xml_destination: PathBuf,
    pub attachment_destination: PathBuf,
}

impl Config {
    /// Validate presence and type of the three directories (no mutation).
    pub fn validate(&self) -> Result<Directories, ConfigError> {
        let source = required_dir(self.source_directory.as_deref(), "source directory")?;
        let xml_destination =
            required_dir(self.xml_destination.as_deref(), "xml destination directory")?;
        let attachment_destination = required_dir(
            self.attachment_destination.as_deref(),
            "attachment destination directory",
        )?;
        for (name, dest) in [
            ("xml destination directory", &xml_destination),
            ("attachment destination directory", &attachment_destination),
        ] {
            if dest.starts_with(&source) {
                error!("{name} is inside the source directory: {}", dest.display());
                return Err(ConfigError::InsideSource {
                    name,
                    path: dest.clone(),
                    inbox: source.clone(),
                });
            }
        }
        Ok(Directories {
            source,
            xml_destination,
            attachment_destination,
        })
    }
}

/// Validate and rewrite the config with canonical directory paths.
pub fn validate_and_normalize(cfg: &mut Config) -> Result<Directories, ConfigError> {
    let dirs = cfg.validate()?;
    cfg.source_directory = Some(dirs.source.clone());
    cfg.xml_destination = Some(dirs.xml_destination.clone());
    cfg.attachment_destination = Some(dirs.attachment_destination.clone());
    info!(
        "Config validated: source='{}' xml='{}' attachments='{}' reset_permissions={}",
        dirs.source.display(),
        dirs.xml_destination.display(),
        dirs.attachment_destination.display(),
        cfg.reset_permissions
    );
    Ok(dirs)
}

/// Ensure path is set, exists and is a directory; emit clear errors with path context.
fn required_dir(path: Option<&Path>, name: &'static str) -> Result<PathBuf, ConfigError> {
    let Some(path) = path else {
        error!("{name} is not configured");
        return Err(ConfigError::Unset { name });
    };
    if !path.exists() {
        error!("{name} does not exist: {}", path.display());
        return Err(ConfigError::MissingDirectory {
            name,
            path: path.to_path_buf(),
        });
    }
    if !path.is_dir() {
        error!("{name} is not a directory: {}", path.display());
        return Err(ConfigError::NotADirectory {
            name,
            path: path.to_path_buf(),
        });
    }
    Ok(dunce::canonicalize(path).unwrap_or_else(|_| path.to_path_buf()))
}
