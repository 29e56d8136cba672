//! Core library for `bundle_mover`.
//!
//! Watches an inbox tree for XML manifests and moves each manifest together
//! with the attachments it lists: manifests to one directory, attachments to
//! another. A bundle is moved only when every member is present, unlocked and
//! free at its destination; otherwise it is retried for up to 24 hours.

pub mod bundle;
pub mod cli;
pub mod clock;
pub mod config;
pub mod diagnostics;
pub mod errors;
pub mod fs_ops;
pub mod output;
pub mod platform;
pub mod scheduler;
pub mod service;
pub mod shutdown;

pub use bundle::{Bundle, FailureTracker, Routes};
pub use clock::{Clock, SystemClock};
pub use config::{Config, Directories, LogLevel, default_config_path, default_log_path, path_has_symlink_ancestor};
pub use diagnostics::{DedupDiagnostics, Diagnostic, DiagnosticSink, Severity, TracingSink};
pub use errors::{BundleError, ConfigError};
pub use scheduler::{BundleOutcome, PassSummary, Scheduler};
pub use service::{MoverService, build_scheduler};
pub use shutdown::StopFlag;
