//! Removal of empty directories.

use crate::error::{SortError, SortResult};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Removes every empty directory below `root`, deepest first.
///
/// The directory list is collected before anything is removed. A directory
/// whose only contents were empty directories becomes empty once those are
/// gone and is removed as well. `root` itself is never removed.
///
/// Returns the removed directories in removal order.
pub fn prune_empty_dirs(root: &Path) -> SortResult<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    for entry in WalkDir::new(root).min_depth(1).contents_first(true) {
        let entry = entry?;
        if entry.file_type().is_dir() {
            dirs.push((entry.depth(), entry.into_path()));
        }
    }
    // contents_first already yields children first; the stable sort makes it explicit
    dirs.sort_by(|a, b| b.0.cmp(&a.0));

    let mut removed = Vec::new();
    for (_, dir) in dirs {
        if !is_empty_dir(&dir)? {
            continue;
        }
        fs::remove_dir(&dir).map_err(|e| SortError::RemoveFailed {
            path: dir.clone(),
            source: e,
        })?;
        debug!(path = %dir.display(), "removed empty directory");
        removed.push(dir);
    }
    Ok(removed)
}

fn is_empty_dir(dir: &Path) -> SortResult<bool> {
    let mut entries = fs::read_dir(dir).map_err(|e| SortError::RemoveFailed {
        path: dir.to_path_buf(),
        source: e,
    })?;
    Ok(entries.next().is_none())
}
