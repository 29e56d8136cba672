//! Typed error definitions for bundle_mover.
//! Every fallible bundle step returns one of these so the caller can decide
//! between "retry next pass" and "give up on this bundle" explicitly.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failure modes of a single bundle attempt.
#[derive(Debug, Error)]
pub enum BundleError {
    /// Manifest could not be read or parsed (often still being written).
    #[error("Unable to read xml document {path}: {reason}")]
    Read { path: PathBuf, reason: String },

    #[error("File does not exist: {0}")]
    MissingSource(PathBuf),

    #[error("File already exists: {0}")]
    DestinationCollision(PathBuf),

    #[error("Cannot get an exclusive lock on file {path}")]
    LockContention {
        path: PathBuf,
        #[source]
        source: Option<io::Error>,
    },

    /// A member failed to move after `moved` earlier members were relocated.
    #[error("Failed to move file {path} ({moved} member(s) already moved)")]
    MoveFailure {
        path: PathBuf,
        moved: usize,
        #[source]
        source: io::Error,
    },

    #[error("Failed to reset permissions on {path}")]
    PermissionReset {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to delete source directory {path}")]
    DirectoryCleanup {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl BundleError {
    /// Numeric diagnostic id; ids below 20 are reported as errors.
    pub fn diagnostic_id(&self) -> u32 {
        match self {
            BundleError::Read { .. }
            | BundleError::MissingSource(_)
            | BundleError::DestinationCollision(_)
            | BundleError::LockContention { .. } => 10,
            BundleError::MoveFailure { .. } => 11,
            BundleError::PermissionReset { .. } => 20,
            BundleError::DirectoryCleanup { .. } => 22,
        }
    }

    /// Path the diagnostic is keyed on.
    pub fn target(&self) -> &Path {
        match self {
            BundleError::Read { path, .. }
            | BundleError::MissingSource(path)
            | BundleError::DestinationCollision(path)
            | BundleError::LockContention { path, .. }
            | BundleError::MoveFailure { path, .. }
            | BundleError::PermissionReset { path, .. }
            | BundleError::DirectoryCleanup { path, .. } => path,
        }
    }

    /// Short human message without the path (the path travels as the target).
    pub fn summary(&self) -> &'static str {
        match self {
            BundleError::Read { .. } => "Unable to read xml document",
            BundleError::MissingSource(_) => "File does not exist",
            BundleError::DestinationCollision(_) => "File already exists",
            BundleError::LockContention { .. } => "Cannot get an exclusive lock on file",
            BundleError::MoveFailure { .. } => "Failed to move file",
            BundleError::PermissionReset { .. } => "Failed to reset permissions",
            BundleError::DirectoryCleanup { .. } => "Failed to delete source directory",
        }
    }

    /// Underlying cause rendered for the diagnostic entry, if any.
    pub fn cause(&self) -> Option<String> {
        match self {
            BundleError::Read { reason, .. } => Some(reason.clone()),
            BundleError::LockContention { source, .. } => source.as_ref().map(|e| e.to_string()),
            BundleError::MoveFailure { source, .. }
            | BundleError::PermissionReset { source, .. }
            | BundleError::DirectoryCleanup { source, .. } => Some(source.to_string()),
            BundleError::MissingSource(_) | BundleError::DestinationCollision(_) => None,
        }
    }

    /// True when the bundle must never be attempted again.
    pub fn is_permanent(&self) -> bool {
        matches!(self, BundleError::MoveFailure { .. })
    }

    /// True for steps that run after a complete move and never affect bundle status.
    pub fn is_best_effort(&self) -> bool {
        matches!(
            self,
            BundleError::PermissionReset { .. } | BundleError::DirectoryCleanup { .. }
        )
    }
}

/// Startup configuration failures. Any of these keeps the worker from starting.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid {name}: {path} does not exist")]
    MissingDirectory { name: &'static str, path: PathBuf },

    #[error("Invalid {name}: {path} is not a directory")]
    NotADirectory { name: &'static str, path: PathBuf },

    #[error("{name} is not configured")]
    Unset { name: &'static str },

    #[error("Invalid {name}: {path} must not be inside the source directory {inbox}")]
    InsideSource {
        name: &'static str,
        path: PathBuf,
        inbox: PathBuf,
    },

    #[error("Cannot read config file {path}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Malformed config file {path}: {reason}")]
    Malformed { path: PathBuf, reason: String },
}

impl ConfigError {
    /// Path or setting name used as the diagnostic target.
    pub fn target(&self) -> String {
        match self {
            ConfigError::MissingDirectory { path, .. }
            | ConfigError::NotADirectory { path, .. }
            | ConfigError::InsideSource { path, .. }
            | ConfigError::Unreadable { path, .. }
            | ConfigError::Malformed { path, .. } => path.display().to_string(),
            ConfigError::Unset { name } => (*name).to_string(),
        }
    }
}
