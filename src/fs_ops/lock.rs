//! Exclusive-lock probe used before a bundle is moved.
//!
//! The probe opens the file read+write (no sharing on Windows), takes a
//! non-blocking exclusive lock and releases it straight away. It says "nobody
//! held the file a moment ago" and nothing more: the lock is not held through
//! the move, so a writer can still reopen the file in between. On Unix the lock
//! is advisory (flock) and only detects producers that lock as well.

use fs2::FileExt;
use std::io;
use std::path::Path;
use tracing::trace;

use crate::platform::open_exclusive;

/// Ok(()) when `path` could be opened and exclusively locked right now.
/// A held lock surfaces as an error of kind WouldBlock (or a sharing
/// violation on Windows); other I/O errors pass through unchanged.
pub fn probe_exclusive(path: &Path) -> io::Result<()> {
    let file = open_exclusive(path)?;
    FileExt::try_lock_exclusive(&file)?;
    let released = FileExt::unlock(&file);
    drop(file);
    trace!(path = %path.display(), "exclusive probe succeeded");
    released
}
