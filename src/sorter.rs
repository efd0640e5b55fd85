//! The sorting pipeline.
//!
//! One run over a root folder goes through four phases, strictly in order:
//!
//! 1. create the category folders,
//! 2. classify every file and move known ones into their category folder,
//! 3. remove directories left empty,
//! 4. unpack archives next to where they sit and delete them.
//!
//! Every phase works on a snapshot of the tree taken before it starts
//! mutating anything.

use crate::archive::{ArchiveUnpacker, UnpackOutcome, Unpacker};
use crate::cleanup::prune_empty_dirs;
use crate::config::{CompiledFilters, Policy, SortConfig};
use crate::error::{SortError, SortResult};
use crate::file_category::{Category, CategoryTable, extension_of};
use crate::file_organizer::{FileOrganizer, MoveOutcome, MovedFile, SkippedFile};
use crate::output::OutputFormatter;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// What happened to one archive during phase 4.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchiveRecord {
    pub path: PathBuf,
    /// Nesting level: archives found by the walk are level 1.
    pub depth: usize,
    pub outcome: UnpackOutcome,
    /// Whether the archive file was removed afterwards.
    pub deleted: bool,
}

/// A move phase 2 would make, computed without touching the tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedMove {
    pub from: PathBuf,
    pub to: PathBuf,
    pub category: Category,
    /// Another file already holds, or will hold, the destination name.
    pub collides: bool,
}

/// Everything a run did, returned to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct SortReport {
    pub root: PathBuf,
    pub dry_run: bool,
    /// The fixed category table, as configured.
    pub known_extensions: BTreeMap<Category, Vec<&'static str>>,
    /// Distinct extensions that matched no category, sorted.
    pub unknown_extensions: Vec<String>,
    pub moved: Vec<MovedFile>,
    pub skipped: Vec<SkippedFile>,
    pub planned: Vec<PlannedMove>,
    pub pruned: Vec<PathBuf>,
    pub archives: Vec<ArchiveRecord>,
    /// When the run finished; serialized as RFC 3339.
    pub finished_at: DateTime<Utc>,
}

impl SortReport {
    fn new(root: &Path, table: &CategoryTable, dry_run: bool) -> Self {
        Self {
            root: root.to_path_buf(),
            dry_run,
            known_extensions: table
                .entries()
                .map(|(category, exts)| (category, exts.to_vec()))
                .collect(),
            unknown_extensions: Vec::new(),
            moved: Vec::new(),
            skipped: Vec::new(),
            planned: Vec::new(),
            pruned: Vec::new(),
            archives: Vec::new(),
            finished_at: Utc::now(),
        }
    }

    /// Number of files per category that were moved (or would be, in a dry run).
    pub fn category_counts(&self) -> BTreeMap<Category, usize> {
        let mut counts = BTreeMap::new();
        let categories = self
            .moved
            .iter()
            .map(|m| m.category)
            .chain(self.planned.iter().map(|p| p.category));
        for category in categories {
            *counts.entry(category).or_insert(0) += 1;
        }
        counts
    }
}

/// Runs the pipeline over one root folder.
pub struct Sorter<U: Unpacker = ArchiveUnpacker> {
    table: CategoryTable,
    policy: Policy,
    filters: CompiledFilters,
    unpacker: U,
    show_progress: bool,
}

impl Sorter<ArchiveUnpacker> {
    /// Builds a sorter from a configuration, with the default unpacker.
    pub fn new(config: &SortConfig) -> SortResult<Self> {
        Self::with_unpacker(config, ArchiveUnpacker)
    }
}

impl<U: Unpacker> Sorter<U> {
    /// Builds a sorter that unpacks archives with `unpacker`.
    pub fn with_unpacker(config: &SortConfig, unpacker: U) -> SortResult<Self> {
        Ok(Self {
            table: CategoryTable::default(),
            policy: config.policy.clone(),
            filters: config.compile_filters()?,
            unpacker,
            show_progress: false,
        })
    }

    /// Shows a progress bar while files are moved.
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Sorts `root` and returns the report.
    ///
    /// # Errors
    ///
    /// Any filesystem error outside archive unpacking ends the run; the tree
    /// is left as it was at that point.
    pub fn run(&self, root: &Path) -> SortResult<SortReport> {
        FileOrganizer::validate_root(root)?;
        let mut report = SortReport::new(root, &self.table, false);

        let created = FileOrganizer::ensure_category_dirs(root, &self.table)?;
        info!(created = created.len(), "category folders ready");

        let mut unknown = BTreeSet::new();
        self.sort_files(root, &mut report, &mut unknown)?;
        report.unknown_extensions = unknown.into_iter().collect();
        info!(
            moved = report.moved.len(),
            skipped = report.skipped.len(),
            unknown = report.unknown_extensions.len(),
            "files sorted"
        );

        report.pruned = prune_empty_dirs(root)?;
        info!(pruned = report.pruned.len(), "empty directories removed");

        self.expand_archives(root, &mut report)?;
        info!(archives = report.archives.len(), "archives processed");

        report.finished_at = Utc::now();
        Ok(report)
    }

    /// Classifies `root` without changing anything on disk.
    pub fn plan(&self, root: &Path) -> SortResult<SortReport> {
        FileOrganizer::validate_root(root)?;
        let mut report = SortReport::new(root, &self.table, true);
        let mut unknown = BTreeSet::new();
        let mut claimed = HashSet::new();

        for path in FileOrganizer::snapshot_files(root, &self.filters)? {
            let file_name = file_name_of(&path);
            let Some(category) = self.table.classify(&file_name) else {
                unknown.insert(extension_of(&file_name));
                continue;
            };
            let to = FileOrganizer::destination_for(root, &file_name, category);
            if to == path {
                claimed.insert(to);
                continue;
            }
            let collides = to.exists() || !claimed.insert(to.clone());
            report.planned.push(PlannedMove {
                from: path,
                to,
                category,
                collides,
            });
        }

        report.unknown_extensions = unknown.into_iter().collect();
        report.finished_at = Utc::now();
        Ok(report)
    }

    fn sort_files(
        &self,
        root: &Path,
        report: &mut SortReport,
        unknown: &mut BTreeSet<String>,
    ) -> SortResult<()> {
        let files = FileOrganizer::snapshot_files(root, &self.filters)?;
        let progress = self
            .show_progress
            .then(|| OutputFormatter::create_progress_bar(files.len() as u64));

        for path in files {
            if let Some(pb) = &progress {
                pb.inc(1);
            }
            // an earlier overwrite may have replaced this path already
            if !path.exists() {
                continue;
            }
            let file_name = file_name_of(&path);
            match self.table.classify(&file_name) {
                Some(category) => {
                    match FileOrganizer::move_to_category(
                        root,
                        &path,
                        category,
                        self.policy.collision,
                    )? {
                        MoveOutcome::Moved(moved) => report.moved.push(moved),
                        MoveOutcome::Skipped(skipped) => report.skipped.push(skipped),
                        MoveOutcome::InPlace => {}
                    }
                }
                None => {
                    debug!(path = %path.display(), "unknown extension, left in place");
                    unknown.insert(extension_of(&file_name));
                }
            }
        }

        if let Some(pb) = progress {
            pb.finish_and_clear();
        }
        Ok(())
    }

    fn expand_archives(&self, root: &Path, report: &mut SortReport) -> SortResult<()> {
        let mut queue: VecDeque<(PathBuf, usize)> =
            FileOrganizer::snapshot_files(root, &self.filters)?
                .into_iter()
                .filter(|path| self.table.is_archive(&file_name_of(path)))
                .map(|path| (path, 1))
                .collect();
        // a path waits in the queue at most once; it may come back after it is
        // unpacked and an extraction writes a new file at the same place
        let mut pending: HashSet<PathBuf> = queue.iter().map(|(path, _)| path.clone()).collect();

        while let Some((archive, depth)) = queue.pop_front() {
            pending.remove(&archive);
            if !archive.is_file() {
                continue;
            }
            let target_dir = archive.parent().unwrap_or(root).to_path_buf();
            let outcome = self.unpacker.unpack(&archive, &target_dir);

            let delete = outcome.is_unpacked() || self.policy.delete_failed_archives;
            if delete {
                fs::remove_file(&archive).map_err(|e| SortError::RemoveFailed {
                    path: archive.clone(),
                    source: e,
                })?;
            }

            if self.policy.expand_nested_archives {
                for entry in outcome.written() {
                    if !self.table.is_archive(&file_name_of(entry)) {
                        continue;
                    }
                    if depth >= self.policy.max_archive_depth {
                        warn!(
                            path = %entry.display(),
                            max_depth = self.policy.max_archive_depth,
                            "nested archive too deep, left packed"
                        );
                    } else if pending.insert(entry.clone()) {
                        queue.push_back((entry.clone(), depth + 1));
                    } else {
                        debug!(path = %entry.display(), "nested archive already queued");
                    }
                }
            }

            report.archives.push(ArchiveRecord {
                path: archive,
                depth,
                outcome,
                deleted: delete,
            });
        }
        Ok(())
    }
}

/// Sorts `root` with the default configuration.
///
/// ```no_run
/// let report = clean_folder::sort_folder(std::path::Path::new("/tmp/messy"))?;
/// println!("unknown: {}", report.unknown_extensions.join(", "));
/// # Ok::<(), clean_folder::SortError>(())
/// ```
pub fn sort_folder(root: &Path) -> SortResult<SortReport> {
    Sorter::new(&SortConfig::default())?.run(root)
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
