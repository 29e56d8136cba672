//! Manifest discovery.
//! Walks the inbox on every pass; nothing is cached because bundle directories
//! come and go between passes.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

use super::MANIFEST_SUFFIX;

/// True when `name` ends with `suffix`, ignoring ASCII case.
pub fn has_suffix_ignore_case(name: &str, suffix: &str) -> bool {
    name.len() >= suffix.len()
        && name.is_char_boundary(name.len() - suffix.len())
        && name[name.len() - suffix.len()..].eq_ignore_ascii_case(suffix)
}

/// Every manifest file below `root`, in walk order (names sorted per directory).
///
/// Fails only when the root itself cannot be read; entries that vanish or
/// become unreadable below it are skipped for this pass.
pub fn scan_manifests(root: &Path) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
        let entry = match entry {
            Ok(e) => e,
            Err(e) if e.depth() == 0 => {
                return Err(e).with_context(|| format!("scan inbox '{}'", root.display()));
            }
            Err(e) => {
                debug!(error = %e, "skipping unreadable inbox entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else {
            debug!(path = %entry.path().display(), "skipping non-UTF-8 file name");
            continue;
        };
        if has_suffix_ignore_case(name, MANIFEST_SUFFIX) {
            found.push(entry.into_path());
        }
    }
    debug!(root = %root.display(), count = found.len(), "scanned inbox");
    Ok(found)
}
