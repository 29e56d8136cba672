//! Bundle move execution.
//!
//! Members move one by one in bundle order. If a member fails after earlier
//! ones were relocated, execution stops and the bundle is reported as a
//! permanent failure. Already-moved members stay where they are; nothing is
//! rolled back.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::resolve::{Bundle, Routes};
use crate::errors::BundleError;
use crate::fs_ops::Relocator;
use crate::platform;

/// Knobs for a move that do not depend on the bundle.
#[derive(Debug, Clone, Copy)]
pub struct MoveOptions<'a> {
    /// Reset permissions on every moved file once the whole bundle is across.
    pub reset_permissions: bool,
    /// Inbox root; never removed even when it ends up empty.
    pub inbox_root: &'a Path,
}

/// Result of a complete move.
#[derive(Debug, Default)]
pub struct MoveReport {
    pub moved: Vec<PathBuf>,
    /// Best-effort steps that failed; the move itself still counts as done.
    pub warnings: Vec<BundleError>,
    pub removed_source_dir: bool,
}

/// Relocate every member, then run the best-effort follow-ups.
pub fn execute_move(
    bundle: &Bundle,
    routes: &Routes,
    relocator: &dyn Relocator,
    opts: MoveOptions<'_>,
) -> Result<MoveReport, BundleError> {
    let mut report = MoveReport::default();

    for name in bundle.members() {
        let src = bundle.source_path(name);
        let dest = routes.destination_path(name);
        if let Err(source) = relocator.relocate(&src, &dest) {
            return Err(BundleError::MoveFailure {
                path: src,
                moved: report.moved.len(),
                source,
            });
        }
        debug!(bundle = bundle.key(), src = %src.display(), dest = %dest.display(), "member moved");
        report.moved.push(dest);
    }

    if opts.reset_permissions {
        for dest in &report.moved {
            if let Err(source) = platform::reset_permissions(dest) {
                report.warnings.push(BundleError::PermissionReset {
                    path: dest.clone(),
                    source,
                });
            }
        }
    }

    let dir = bundle.source_dir();
    if dir != opts.inbox_root {
        match fs::remove_dir(dir) {
            Ok(()) => report.removed_source_dir = true,
            Err(source) => report.warnings.push(BundleError::DirectoryCleanup {
                path: dir.to_path_buf(),
                source,
            }),
        }
    }

    info!(
        bundle = bundle.key(),
        members = report.moved.len(),
        source_dir = %dir.display(),
        "bundle moved"
    );
    Ok(report)
}
