//! Member relocation.
//! A `Relocator` moves one file to a destination path that must not exist yet.
//! The default implementation renames without replacing (link then unlink on
//! Unix) and falls back to copy+rename when source and destination live on
//! different filesystems.

use std::io;
use std::path::Path;
use tracing::{debug, warn};

use super::copy::copy_then_rename;
use super::helpers::io_error_with_help;
use super::util;

/// Moves a single file. Implementations must not overwrite `dest`.
pub trait Relocator: Send {
    fn relocate(&self, src: &Path, dest: &Path) -> io::Result<()>;
}

/// No-clobber rename with a cross-device copy fallback.
#[derive(Debug, Default, Clone, Copy)]
pub struct RenameRelocator;

impl Relocator for RenameRelocator {
    fn relocate(&self, src: &Path, dest: &Path) -> io::Result<()> {
        match util::rename_no_clobber(src, dest) {
            Ok(()) => {
                if let Some(parent) = dest.parent() {
                    let _ = util::fsync_dir(parent);
                }
                debug!(src = %src.display(), dest = %dest.display(), "renamed");
                Ok(())
            }
            Err(e) if util::is_cross_device(&e) => {
                warn!(src = %src.display(), dest = %dest.display(), "rename crosses filesystems, copying instead");
                copy_then_rename(src, dest)
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                Err(io_error_with_help("move file", dest)(e))
            }
            Err(e) => Err(io_error_with_help("move file", src)(e)),
        }
    }
}
