//! Bundle resolution and destination routing. Pure; no filesystem access.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use super::ROUTE_SUFFIX;
use super::scan::has_suffix_ignore_case;

/// A manifest plus the attachments it references, all in one source directory.
///
/// Members are unique ignoring case; the manifest is always first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bundle {
    key: String,
    source_dir: PathBuf,
    members: Vec<String>,
}

impl Bundle {
    /// Build the member list: manifest first, then attachments in document
    /// order, dropping any name already present (case-insensitive).
    pub fn resolve(
        manifest_name: &str,
        source_dir: impl Into<PathBuf>,
        attachments: impl IntoIterator<Item = String>,
    ) -> Self {
        let mut seen: HashSet<String> = HashSet::new();
        seen.insert(manifest_name.to_lowercase());
        let mut members = vec![manifest_name.to_string()];
        for name in attachments {
            if seen.insert(name.to_lowercase()) {
                members.push(name);
            }
        }
        Self {
            key: manifest_name.to_string(),
            source_dir: source_dir.into(),
            members,
        }
    }

    /// Manifest file name; identifies the bundle across passes.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    pub fn members(&self) -> &[String] {
        &self.members
    }

    pub fn source_path(&self, member: &str) -> PathBuf {
        self.source_dir.join(member)
    }
}

/// Destination directories, chosen per member by file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Routes {
    pub xml: PathBuf,
    pub attachments: PathBuf,
}

impl Routes {
    pub fn new(xml: impl Into<PathBuf>, attachments: impl Into<PathBuf>) -> Self {
        Self {
            xml: xml.into(),
            attachments: attachments.into(),
        }
    }

    /// `.xml` names (any case) go to the xml directory, everything else to attachments.
    pub fn destination_dir(&self, name: &str) -> &Path {
        if has_suffix_ignore_case(name, ROUTE_SUFFIX) {
            &self.xml
        } else {
            &self.attachments
        }
    }

    pub fn destination_path(&self, name: &str) -> PathBuf {
        self.destination_dir(name).join(name)
    }
}
