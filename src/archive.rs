//! Archive unpacking.
//!
//! The container format is detected from the file signature, never from the
//! name. ZIP is always supported; RAR needs the `rar` cargo feature. Failures
//! never escape [`Unpacker::unpack`]: they are logged and returned as
//! [`UnpackOutcome::Failed`].

use crate::error::ArchiveError;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Number of leading bytes inspected for a signature.
const SIGNATURE_LEN: u64 = 8192;

/// Container formats the unpacker understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveFormat {
    Zip,
    Rar,
}

impl ArchiveFormat {
    /// Detects the format from the leading bytes of a file.
    pub fn from_signature(buf: &[u8]) -> Option<Self> {
        if infer::archive::is_zip(buf) {
            Some(ArchiveFormat::Zip)
        } else if infer::archive::is_rar(buf) {
            Some(ArchiveFormat::Rar)
        } else {
            None
        }
    }

    /// Reads the start of `path` and detects its format.
    pub fn detect(path: &Path) -> io::Result<Option<Self>> {
        let mut buf = Vec::new();
        File::open(path)?.take(SIGNATURE_LEN).read_to_end(&mut buf)?;
        Ok(Self::from_signature(&buf))
    }
}

/// Result of one unpack attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum UnpackOutcome {
    /// The archive was extracted; `entries` are the files written.
    Unpacked { entries: Vec<PathBuf> },
    /// The archive could not be extracted. `partial` lists the files
    /// written before the failure; they stay on disk.
    Failed {
        reason: String,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        partial: Vec<PathBuf>,
    },
}

impl UnpackOutcome {
    /// A failure that wrote nothing.
    pub fn failed(reason: impl Into<String>) -> Self {
        UnpackOutcome::Failed {
            reason: reason.into(),
            partial: Vec::new(),
        }
    }

    pub fn is_unpacked(&self) -> bool {
        matches!(self, UnpackOutcome::Unpacked { .. })
    }

    /// Files this attempt left on disk, whether it succeeded or not.
    pub fn written(&self) -> &[PathBuf] {
        match self {
            UnpackOutcome::Unpacked { entries } => entries,
            UnpackOutcome::Failed { partial, .. } => partial,
        }
    }
}

/// Extracts an archive into a directory.
pub trait Unpacker {
    /// Extracts `archive` into `target_dir`.
    ///
    /// Must not fail: every problem is reported through the outcome. The
    /// archive file itself is left where it is.
    fn unpack(&self, archive: &Path, target_dir: &Path) -> UnpackOutcome;
}

/// The default unpacker, backed by the `zip` and `unrar` crates.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArchiveUnpacker;

impl Unpacker for ArchiveUnpacker {
    fn unpack(&self, archive: &Path, target_dir: &Path) -> UnpackOutcome {
        let mut written = Vec::new();
        match extract(archive, target_dir, &mut written) {
            Ok(()) => {
                debug!(
                    archive = %archive.display(),
                    files = written.len(),
                    "unpacked archive"
                );
                UnpackOutcome::Unpacked { entries: written }
            }
            Err(e) => {
                if written.is_empty() {
                    warn!("Failed to unpack archive {}: {}", archive.display(), e);
                } else {
                    warn!(
                        "Failed to unpack archive {} after writing {} files: {}",
                        archive.display(),
                        written.len(),
                        e
                    );
                }
                UnpackOutcome::Failed {
                    reason: e.to_string(),
                    partial: written,
                }
            }
        }
    }
}

/// Extracts `archive`, pushing every file written onto `written` as it goes.
fn extract(
    archive: &Path,
    target_dir: &Path,
    written: &mut Vec<PathBuf>,
) -> Result<(), ArchiveError> {
    match ArchiveFormat::detect(archive)? {
        Some(ArchiveFormat::Zip) => extract_zip(archive, target_dir, written),
        Some(ArchiveFormat::Rar) => extract_rar(archive, target_dir, written),
        None => Err(ArchiveError::UnsupportedFormat),
    }
}

fn extract_zip(
    archive_path: &Path,
    target_dir: &Path,
    extracted: &mut Vec<PathBuf>,
) -> Result<(), ArchiveError> {
    use zip::ZipArchive;

    let mut archive = ZipArchive::new(File::open(archive_path)?)?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let rel_path = entry
            .enclosed_name()
            .map(Path::to_path_buf)
            .ok_or_else(|| ArchiveError::UnsafeEntry(entry.name().to_string()))?;
        let out_path = target_dir.join(&rel_path);

        if entry.is_dir() {
            fs::create_dir_all(&out_path)?;
            continue;
        }
        if out_path == archive_path {
            return Err(ArchiveError::SelfOverwrite(entry.name().to_string()));
        }
        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out_file = File::create(&out_path)?;
        io::copy(&mut entry, &mut out_file)?;
        extracted.push(out_path);
    }

    Ok(())
}

/// True when `path` is relative and never climbs out of its base.
#[cfg(feature = "rar")]
fn is_enclosed(path: &Path) -> bool {
    path.components()
        .all(|c| matches!(c, std::path::Component::Normal(_)))
}

#[cfg(feature = "rar")]
fn extract_rar(
    archive_path: &Path,
    target_dir: &Path,
    extracted: &mut Vec<PathBuf>,
) -> Result<(), ArchiveError> {
    use unrar::Archive;

    let rar_error = |e: unrar::error::UnrarError| ArchiveError::Rar(e.to_string());

    let mut archive = Archive::new(archive_path)
        .open_for_processing()
        .map_err(rar_error)?;

    while let Some(header) = archive.read_header().map_err(rar_error)? {
        let entry = header.entry();
        let name = entry.filename.to_string_lossy().into_owned();
        if !is_enclosed(&entry.filename) {
            return Err(ArchiveError::UnsafeEntry(name));
        }
        let out_path = target_dir.join(&entry.filename);

        archive = if entry.is_file() {
            if out_path == archive_path {
                return Err(ArchiveError::SelfOverwrite(name));
            }
            let next = header.extract_with_base(target_dir).map_err(rar_error)?;
            extracted.push(out_path);
            next
        } else {
            header.skip().map_err(rar_error)?
        };
    }

    Ok(())
}

#[cfg(not(feature = "rar"))]
fn extract_rar(
    _archive_path: &Path,
    _target_dir: &Path,
    _extracted: &mut Vec<PathBuf>,
) -> Result<(), ArchiveError> {
    Err(ArchiveError::RarDisabled)
}
