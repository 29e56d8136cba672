use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Hidden temp sibling inside `dst_dir`, unique per process and instant.
pub(super) fn unique_temp_path(dst_dir: &Path) -> PathBuf {
    let pid = std::process::id();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    dst_dir.join(format!(".bundle_mover.{pid}.{nanos}.tmp"))
}

pub(super) fn is_cross_device(e: &io::Error) -> bool {
    // io::ErrorKind::CrossesDevices is recent; match the raw codes instead.
    match e.raw_os_error() {
        #[cfg(unix)]
        Some(code) => code == libc::EXDEV,
        // ERROR_NOT_SAME_DEVICE
        #[cfg(windows)]
        Some(code) => code == 17,
        #[cfg(not(any(unix, windows)))]
        Some(_) => false,
        None => false,
    }
}

#[cfg(unix)]
pub(super) fn fsync_dir(dir: &Path) -> io::Result<()> {
    std::fs::File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
pub(super) fn fsync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}

/// Put `src` at `dest`, failing with AlreadyExists instead of replacing `dest`.
///
/// Unix links the new name first (link(2) never replaces) and then drops the
/// old one. Filesystems without hard links fall back to check-then-rename.
#[cfg(unix)]
pub(super) fn rename_no_clobber(src: &Path, dest: &Path) -> io::Result<()> {
    match fs::hard_link(src, dest) {
        Ok(()) => {}
        Err(e) if links_unsupported(&e) => return checked_rename(src, dest),
        Err(e) => return Err(e),
    }
    if let Err(e) = fs::remove_file(src) {
        // Leave things as they were: one name, at the source.
        let _ = fs::remove_file(dest);
        return Err(e);
    }
    Ok(())
}

#[cfg(not(unix))]
pub(super) fn rename_no_clobber(src: &Path, dest: &Path) -> io::Result<()> {
    checked_rename(src, dest)
}

/// rename(2) after confirming `dest` is free. A file created between the check
/// and the rename is replaced; only used where no atomic form is available.
fn checked_rename(src: &Path, dest: &Path) -> io::Result<()> {
    if fs::symlink_metadata(dest).is_ok() {
        return Err(io::Error::from(io::ErrorKind::AlreadyExists));
    }
    fs::rename(src, dest)
}

#[cfg(unix)]
fn links_unsupported(e: &io::Error) -> bool {
    matches!(
        e.raw_os_error(),
        Some(code) if code == libc::EPERM || code == libc::EOPNOTSUPP || code == libc::EMLINK
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn no_clobber_rename_moves_into_free_name() {
        let td = tempdir().unwrap();
        let src = td.path().join("a.pdf");
        let dest = td.path().join("b.pdf");
        fs::write(&src, b"a").unwrap();
        rename_no_clobber(&src, &dest).unwrap();
        assert!(!src.exists());
        assert_eq!(fs::read(&dest).unwrap(), b"a");
    }

    #[test]
    fn no_clobber_rename_keeps_existing_destination() {
        let td = tempdir().unwrap();
        let src = td.path().join("a.pdf");
        let dest = td.path().join("b.pdf");
        fs::write(&src, b"new").unwrap();
        fs::write(&dest, b"old").unwrap();
        let err = rename_no_clobber(&src, &dest).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
        assert_eq!(fs::read(&dest).unwrap(), b"old");
        assert_eq!(fs::read(&src).unwrap(), b"new");
    }
}
