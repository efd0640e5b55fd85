/// Moving files into category folders.
///
/// This module owns the filesystem side of sorting: creating the category
/// folders under the root, taking a snapshot of the files to visit, and
/// moving one file to `root/<category>/<normalized name>` under a
/// [`CollisionPolicy`].
use crate::config::{CollisionPolicy, CompiledFilters};
use crate::error::{SortError, SortResult};
use crate::file_category::{Category, CategoryTable};
use crate::normalize::normalize;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// A file that was moved during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MovedFile {
    /// Where the file was before the move.
    pub from: PathBuf,
    /// Where the file is now.
    pub to: PathBuf,
    /// The category folder it went to.
    pub category: Category,
}

/// A file left in place because its destination name was taken.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub occupied_by: PathBuf,
}

/// What happened to a single file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The file was moved (possibly replacing or beside an existing file).
    Moved(MovedFile),
    /// The file already sits at its destination.
    InPlace,
    /// The destination was taken and the policy said to leave the file.
    Skipped(SkippedFile),
}

/// Creates category folders and moves files into them.
pub struct FileOrganizer;

impl FileOrganizer {
    /// Checks that `root` exists and is a directory.
    pub fn validate_root(root: &Path) -> SortResult<()> {
        if !root.exists() {
            return Err(SortError::InvalidRoot {
                path: root.to_path_buf(),
                reason: "path does not exist".to_string(),
            });
        }
        if !root.is_dir() {
            return Err(SortError::InvalidRoot {
                path: root.to_path_buf(),
                reason: "path is not a directory".to_string(),
            });
        }
        Ok(())
    }

    /// Ensures every category folder exists directly under `root`.
    ///
    /// Existing folders are left as they are, so calling this twice is
    /// harmless. Returns the folders that were newly created.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use clean_folder::file_category::CategoryTable;
    /// use clean_folder::file_organizer::FileOrganizer;
    /// use std::path::Path;
    ///
    /// let created = FileOrganizer::ensure_category_dirs(
    ///     Path::new("/path/to/root"),
    ///     &CategoryTable::default(),
    /// )?;
    /// println!("created {} folders", created.len());
    /// # Ok::<(), clean_folder::SortError>(())
    /// ```
    pub fn ensure_category_dirs(root: &Path, table: &CategoryTable) -> SortResult<Vec<PathBuf>> {
        Self::validate_root(root)?;

        let mut created = Vec::new();
        for (category, _) in table.entries() {
            let category_path = root.join(category.dir_name());
            if category_path.is_dir() {
                continue;
            }
            fs::create_dir(&category_path).map_err(|e| SortError::DirectoryCreationFailed {
                path: category_path.clone(),
                source: e,
            })?;
            debug!(path = %category_path.display(), "created category folder");
            created.push(category_path);
        }
        Ok(created)
    }

    /// Lists every regular file under `root`, recursively, before anything moves.
    ///
    /// Files rejected by `filters` are left out. Symbolic links are not
    /// followed and not listed.
    pub fn snapshot_files(root: &Path, filters: &CompiledFilters) -> SortResult<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let rel_path = entry.path().strip_prefix(root).unwrap_or(entry.path());
            if filters.should_include(rel_path) {
                files.push(entry.into_path());
            }
        }
        Ok(files)
    }

    /// Computes where a file belongs: `root/<category>/<normalized name>`.
    pub fn destination_for(root: &Path, file_name: &str, category: Category) -> PathBuf {
        root.join(category.dir_name()).join(normalize(file_name))
    }

    /// Moves `file_path` into its category folder under `root`.
    ///
    /// The category folder is created if it is missing. When the
    /// destination already holds a file, `policy` decides: replace it, pick a
    /// free `stem_N.ext` name, or leave the source alone.
    ///
    /// # Errors
    ///
    /// Any I/O failure is returned as a fatal [`SortError`].
    pub fn move_to_category(
        root: &Path,
        file_path: &Path,
        category: Category,
        policy: CollisionPolicy,
    ) -> SortResult<MoveOutcome> {
        let file_name = file_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| SortError::FileMoveFailure {
                from: file_path.to_path_buf(),
                to: root.join(category.dir_name()),
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "file has no name component",
                ),
            })?;

        let mut destination = Self::destination_for(root, &file_name, category);
        if destination == file_path {
            return Ok(MoveOutcome::InPlace);
        }

        let category_path = root.join(category.dir_name());
        if !category_path.is_dir() {
            fs::create_dir_all(&category_path).map_err(|e| SortError::DirectoryCreationFailed {
                path: category_path.clone(),
                source: e,
            })?;
        }

        if destination.exists() {
            match policy {
                CollisionPolicy::Overwrite => {
                    warn!(
                        from = %file_path.display(),
                        to = %destination.display(),
                        "destination exists, overwriting"
                    );
                    // rename() does not replace existing files on every platform
                    if destination.is_file() {
                        fs::remove_file(&destination).map_err(|e| SortError::RemoveFailed {
                            path: destination.clone(),
                            source: e,
                        })?;
                    }
                }
                CollisionPolicy::Rename => {
                    destination = free_name(&destination);
                    debug!(to = %destination.display(), "destination exists, renaming");
                }
                CollisionPolicy::Skip => {
                    warn!(
                        path = %file_path.display(),
                        occupied_by = %destination.display(),
                        "destination exists, skipping"
                    );
                    return Ok(MoveOutcome::Skipped(SkippedFile {
                        path: file_path.to_path_buf(),
                        occupied_by: destination,
                    }));
                }
            }
        }

        fs::rename(file_path, &destination).map_err(|e| SortError::FileMoveFailure {
            from: file_path.to_path_buf(),
            to: destination.clone(),
            source: e,
        })?;
        debug!(from = %file_path.display(), to = %destination.display(), "moved");

        Ok(MoveOutcome::Moved(MovedFile {
            from: file_path.to_path_buf(),
            to: destination,
            category,
        }))
    }
}

/// Returns the first `stem_N.ext` next to `taken` that does not exist yet.
fn free_name(taken: &Path) -> PathBuf {
    let parent = taken.parent().unwrap_or(Path::new(""));
    let name = taken
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let (stem, ext) = match name.rsplit_once('.') {
        Some((stem, ext)) => (stem.to_string(), format!(".{ext}")),
        None => (name.clone(), String::new()),
    };

    (1..)
        .map(|n| parent.join(format!("{stem}_{n}{ext}")))
        .find(|candidate| !candidate.exists())
        .unwrap_or_else(|| taken.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_ensure_category_dirs_creates_all_five() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();

        let created = FileOrganizer::ensure_category_dirs(root, &CategoryTable::default())
            .expect("Failed to create folders");

        assert_eq!(created.len(), 5);
        for name in ["images", "video", "documents", "audio", "archives"] {
            assert!(root.join(name).is_dir(), "{name} should exist");
        }
    }

    #[test]
    fn test_ensure_category_dirs_is_idempotent() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        let table = CategoryTable::default();

        FileOrganizer::ensure_category_dirs(root, &table).unwrap();
        fs::write(root.join("documents/keep.txt"), b"x").unwrap();
        let second = FileOrganizer::ensure_category_dirs(root, &table).unwrap();

        assert!(second.is_empty());
        assert!(root.join("documents/keep.txt").exists());
        assert_eq!(fs::read_dir(root).unwrap().count(), 5);
    }

    #[test]
    fn test_ensure_category_dirs_invalid_root() {
        let result = FileOrganizer::ensure_category_dirs(
            Path::new("/non/existent/path"),
            &CategoryTable::default(),
        );
        assert!(matches!(result, Err(SortError::InvalidRoot { .. })));
    }

    #[test]
    fn test_snapshot_lists_nested_files_only() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("a/b")).unwrap();
        fs::write(root.join("top.txt"), b"").unwrap();
        fs::write(root.join("a/b/deep.jpg"), b"").unwrap();

        let files = FileOrganizer::snapshot_files(root, &CompiledFilters::default()).unwrap();

        assert_eq!(files, vec![root.join("a/b/deep.jpg"), root.join("top.txt")]);
    }

    #[test]
    fn test_move_normalizes_name() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let file_path = root.join("звіт 2024.txt");
        fs::write(&file_path, b"hello").unwrap();

        let outcome = FileOrganizer::move_to_category(
            root,
            &file_path,
            Category::Documents,
            CollisionPolicy::Overwrite,
        )
        .unwrap();

        let expected = root.join("documents/zvit_2024.txt");
        assert_eq!(
            outcome,
            MoveOutcome::Moved(MovedFile {
                from: file_path.clone(),
                to: expected.clone(),
                category: Category::Documents,
            })
        );
        assert!(!file_path.exists());
        assert_eq!(fs::read(expected).unwrap(), b"hello");
    }

    #[test]
    fn test_move_file_already_in_place() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir(root.join("images")).unwrap();
        let file_path = root.join("images/photo.png");
        fs::write(&file_path, b"png").unwrap();

        let outcome = FileOrganizer::move_to_category(
            root,
            &file_path,
            Category::Images,
            CollisionPolicy::Rename,
        )
        .unwrap();

        assert_eq!(outcome, MoveOutcome::InPlace);
        assert!(file_path.exists());
    }

    #[test]
    fn test_collision_overwrite_last_mover_wins() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir(root.join("documents")).unwrap();
        fs::write(root.join("documents/a_b.txt"), b"first").unwrap();
        let second = root.join("a b.txt");
        fs::write(&second, b"second").unwrap();

        FileOrganizer::move_to_category(
            root,
            &second,
            Category::Documents,
            CollisionPolicy::Overwrite,
        )
        .unwrap();

        assert_eq!(fs::read(root.join("documents/a_b.txt")).unwrap(), b"second");
        assert_eq!(fs::read_dir(root.join("documents")).unwrap().count(), 1);
    }

    #[test]
    fn test_collision_rename_picks_free_suffix() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir(root.join("documents")).unwrap();
        fs::write(root.join("documents/a_b.txt"), b"first").unwrap();
        fs::write(root.join("documents/a_b_1.txt"), b"taken").unwrap();
        let second = root.join("a b.txt");
        fs::write(&second, b"second").unwrap();

        let outcome = FileOrganizer::move_to_category(
            root,
            &second,
            Category::Documents,
            CollisionPolicy::Rename,
        )
        .unwrap();

        let MoveOutcome::Moved(moved) = outcome else {
            panic!("expected a move, got {outcome:?}");
        };
        assert_eq!(moved.to, root.join("documents/a_b_2.txt"));
        assert_eq!(fs::read(root.join("documents/a_b.txt")).unwrap(), b"first");
    }

    #[test]
    fn test_collision_skip_leaves_source() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir(root.join("documents")).unwrap();
        fs::write(root.join("documents/a_b.txt"), b"first").unwrap();
        let second = root.join("a b.txt");
        fs::write(&second, b"second").unwrap();

        let outcome =
            FileOrganizer::move_to_category(root, &second, Category::Documents, CollisionPolicy::Skip)
                .unwrap();

        assert!(matches!(outcome, MoveOutcome::Skipped(_)));
        assert!(second.exists());
        assert_eq!(fs::read(root.join("documents/a_b.txt")).unwrap(), b"first");
    }

    #[test]
    fn test_free_name_without_extension() {
        let temp_dir = TempDir::new().unwrap();
        let taken = temp_dir.path().join("notes");
        fs::write(&taken, b"").unwrap();
        assert_eq!(free_name(&taken), temp_dir.path().join("notes_1"));
    }
}
