//! Cross-filesystem fallback for a member move:
//! - Copies to a temp file in the destination directory (create_new, fsynced)
//! - Renames temp -> dest without replacing anything that appeared meanwhile
//! - Removes the source last, so a failure never loses the only copy

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;
use tracing::debug;

use super::helpers::io_error_with_help;
use super::util;

const BUF_SIZE: usize = 1024 * 1024;

/// Copy `src` into a new file at `dst` and fsync it. Never clobbers `dst`.
fn copy_streaming(src: &Path, dst: &Path) -> io::Result<u64> {
    let reader = File::open(src)?;
    let mut reader = BufReader::with_capacity(BUF_SIZE, reader);
    let out = OpenOptions::new().write(true).create_new(true).open(dst)?;
    let mut writer = BufWriter::with_capacity(BUF_SIZE, out);
    let bytes = io::copy(&mut reader, &mut writer)?;
    writer.flush()?;
    let out = writer.into_inner().map_err(|e| e.into_error())?;
    out.sync_all()?;
    Ok(bytes)
}

/// Move `src` to `dest` across filesystems.
pub(super) fn copy_then_rename(src: &Path, dest: &Path) -> io::Result<()> {
    let dest_dir = dest.parent().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "destination has no parent directory")
    })?;
    let tmp = util::unique_temp_path(dest_dir);

    let bytes = match copy_streaming(src, &tmp) {
        Ok(n) => n,
        Err(e) => {
            let _ = fs::remove_file(&tmp);
            return Err(io_error_with_help("copy to temporary file", &tmp)(e));
        }
    };

    if let Err(e) = util::rename_no_clobber(&tmp, dest) {
        let _ = fs::remove_file(&tmp);
        return Err(io_error_with_help("rename temporary file", dest)(e));
    }
    let _ = util::fsync_dir(dest_dir);

    fs::remove_file(src).map_err(io_error_with_help("remove original file", src))?;
    debug!(src = %src.display(), dest = %dest.display(), bytes, "copied across filesystems");
    Ok(())
}
