//! I/O helper utilities.
//!
//! Enriches io::Error with the operation, the path and a platform-aware hint
//! while preserving the original ErrorKind, so callers can still branch on it.
//!
//! Usage:
//!   fs::rename(src, dst).map_err(io_error_with_help("move file", src))?;

use std::io;
use std::path::Path;

fn hint_for(e: &io::Error) -> Option<&'static str> {
    #[cfg(unix)]
    if let Some(code) = e.raw_os_error() {
        let hint = match code {
            libc::EACCES | libc::EPERM => Some("permission denied; check ownership and write permissions"),
            libc::EXDEV => Some("cross-filesystem; atomic rename not possible"),
            libc::EBUSY => Some("resource busy; ensure no other process is writing"),
            libc::ENOENT => Some("path not found; verify it exists"),
            libc::EEXIST => Some("already exists; refusing to overwrite"),
            libc::ENOSPC => Some("insufficient space on device"),
            libc::EROFS => Some("read-only filesystem; cannot write here"),
            libc::ENOTEMPTY => Some("directory not empty"),
            libc::ELOOP => Some("symbolic link where a regular file was expected"),
            _ => None,
        };
        if hint.is_some() {
            return hint;
        }
    }
    #[cfg(windows)]
    if let Some(code) = e.raw_os_error() {
        let hint = match code {
            5 => Some("access denied; check permissions"),
            17 => Some("not same device; cross-filesystem move"),
            32 | 33 => Some("sharing violation; file is in use"),
            2 | 3 => Some("path not found; verify it exists"),
            80 | 183 => Some("already exists; refusing to overwrite"),
            112 => Some("insufficient disk space"),
            145 => Some("directory not empty"),
            _ => None,
        };
        if hint.is_some() {
            return hint;
        }
    }
    match e.kind() {
        io::ErrorKind::PermissionDenied => Some("permission denied; check ownership and write permissions"),
        io::ErrorKind::NotFound => Some("path not found; verify it exists"),
        io::ErrorKind::AlreadyExists => Some("already exists; refusing to overwrite"),
        io::ErrorKind::WouldBlock => Some("locked by another process; retry after the current write finishes"),
        _ => None,
    }
}

/// Format a human-friendly message with op/path plus platform-aware hints.
pub(crate) fn build_message(op: &str, path: &Path, e: &io::Error) -> String {
    let mut msg = format!("{} '{}': {}", op, path.display(), e);
    if let Some(hint) = hint_for(e) {
        msg.push_str(" (");
        msg.push_str(hint);
        msg.push(')');
    }
    if let Some(code) = e.raw_os_error() {
        msg.push_str(&format!(" [os code: {code}]"));
    }
    msg
}

/// Returns a closure suitable for `.map_err(...)` that keeps the ErrorKind
/// and replaces the message with an enriched one.
pub fn io_error_with_help<'a>(
    op: &'a str,
    path: &'a Path,
) -> impl FnOnce(io::Error) -> io::Error + 'a {
    move |e: io::Error| io::Error::new(e.kind(), build_message(op, path, &e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_kind_and_names_path() {
        let p = Path::new("/inbox/dir1/a.pdf");
        let e = io_error_with_help("move file", p)(io::Error::from(io::ErrorKind::AlreadyExists));
        assert_eq!(e.kind(), io::ErrorKind::AlreadyExists);
        let msg = e.to_string();
        assert!(msg.contains("move file"));
        assert!(msg.contains("/inbox/dir1/a.pdf"));
        assert!(msg.contains("refusing to overwrite"));
    }

    #[cfg(unix)]
    #[test]
    fn cross_device_hint_and_code() {
        let e = io::Error::from_raw_os_error(libc::EXDEV);
        let msg = build_message("rename", Path::new("/x"), &e);
        assert!(msg.contains("cross-filesystem"), "msg was: {msg}");
        assert!(msg.contains("os code"));
    }
}
