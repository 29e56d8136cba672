//! Move preconditions, checked member by member before anything is touched.

use std::fs;
use tracing::trace;

use super::resolve::{Bundle, Routes};
use crate::errors::BundleError;
use crate::fs_ops::probe_exclusive;

/// Verify every member can be moved right now. Stops at the first problem:
/// 1. source must be a regular file (a symlink does not count, even to a file)
/// 2. destination must be free
/// 3. source must be exclusively lockable (no producer still writing)
///
/// Every failure here is retryable and leaves the filesystem untouched.
pub fn check_movable(bundle: &Bundle, routes: &Routes) -> Result<(), BundleError> {
    for name in bundle.members() {
        let src = bundle.source_path(name);
        let dest = routes.destination_path(name);

        if !fs::symlink_metadata(&src).is_ok_and(|m| m.is_file()) {
            return Err(BundleError::MissingSource(src));
        }
        if fs::symlink_metadata(&dest).is_ok() {
            return Err(BundleError::DestinationCollision(dest));
        }
        if let Err(e) = probe_exclusive(&src) {
            return Err(BundleError::LockContention {
                path: src,
                source: Some(e),
            });
        }
        trace!(bundle = bundle.key(), member = %name, "member movable");
    }
    Ok(())
}
