//! Error types for clean-folder.
//!
//! Only [`SortError`] ever escapes a run. Archive problems are caught at the
//! unpack boundary and turned into [`crate::archive::UnpackOutcome::Failed`].

use std::path::PathBuf;

use crate::config::ConfigError;

/// Fatal errors that terminate a sorting run.
///
/// A run that fails leaves the tree in whatever state it had reached; nothing
/// is rolled back.
#[derive(Debug, thiserror::Error)]
pub enum SortError {
    /// The root path does not exist or is not a directory.
    #[error("invalid root folder {}: {reason}", path.display())]
    InvalidRoot { path: PathBuf, reason: String },

    /// A category folder could not be created.
    #[error("failed to create directory {}: {source}", path.display())]
    DirectoryCreationFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A file could not be moved into its category folder.
    #[error("failed to move {} to {}: {source}", from.display(), to.display())]
    FileMoveFailure {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A file or directory could not be removed.
    #[error("failed to remove {}: {source}", path.display())]
    RemoveFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Walking the directory tree failed.
    #[error("failed to walk directory tree: {0}")]
    Walk(#[from] walkdir::Error),

    /// The configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The run report could not be serialized.
    #[error("failed to serialize report: {0}")]
    Report(#[from] serde_json::Error),
}

/// Result alias used by the sorting pipeline.
pub type SortResult<T> = Result<T, SortError>;

/// Reasons an archive could not be unpacked.
///
/// These never propagate out of the unpacker; they only show up as the text
/// of a failed outcome.
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("unsupported archive format")]
    UnsupportedFormat,

    #[error("RAR support is not enabled in this build")]
    RarDisabled,

    #[error("entry '{0}' would be written outside the target directory")]
    UnsafeEntry(String),

    #[error("entry '{0}' would overwrite the archive being extracted")]
    SelfOverwrite(String),

    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("rar error: {0}")]
    Rar(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
