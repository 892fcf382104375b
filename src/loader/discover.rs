//! Source discovery.

use std::path::{Path, PathBuf};

use tracing::warn;
use walkdir::WalkDir;

use crate::loader::{PACKAGE_ENTRY, SOURCE_EXTENSION};

/// Find loadable sources under `root`.
///
/// Package directories are reported as a single source and not descended
/// into, so a package's internal scripts never show up as stray files.
/// Entries are visited in file-name order, giving a stable result.
pub fn find_sources(root: &Path) -> Vec<PathBuf> {
    // A package root is itself the single source.
    if root.is_dir() && root.join(PACKAGE_ENTRY).is_file() {
        return vec![root.to_path_buf()];
    }

    let mut sources = Vec::new();
    let mut walker = WalkDir::new(root).sort_by_file_name().into_iter();

    while let Some(entry) = walker.next() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!(%err, "skipping unreadable directory entry");
                continue;
            }
        };
        let path = entry.path();

        if entry.file_type().is_dir() {
            if path != root && path.join(PACKAGE_ENTRY).is_file() {
                sources.push(path.to_path_buf());
                walker.skip_current_dir();
            }
            continue;
        }
        if entry.file_type().is_file() && path.to_string_lossy().ends_with(SOURCE_EXTENSION) {
            sources.push(path.to_path_buf());
        }
    }

    sources
}
