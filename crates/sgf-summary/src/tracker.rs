//! Tracking of game record files that have already been ingested.
//!
//! Files are identified by canonical absolute path, so scanning a growing
//! directory again, or adding a file that a scan already found, yields only
//! files that were never seen before.

use glob::Pattern;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// Errors raised while locating or reading game record files.
#[derive(Error, Debug)]
pub enum IngestError {
    /// The requested file or directory does not exist.
    #[error("no such file or directory: {}", .0.display())]
    MissingPath(PathBuf),
    /// A directory scan was requested on something that is not a directory.
    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),
    /// A single-file add was requested on something that is not a file.
    #[error("not a file: {}", .0.display())]
    NotAFile(PathBuf),
    /// The file extension is neither `.sgf` nor `.sgfs`.
    #[error("not a recognized game file: {}", .0.display())]
    UnrecognizedFileType(PathBuf),
    /// A tracked file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The directory path could not be turned into a search pattern.
    #[error("invalid search pattern: {0}")]
    Pattern(#[from] glob::PatternError),
}

/// Layout of a game record file, decided by its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    /// `.sgfs`: one complete record per line.
    Batch,
    /// `.sgf`: the whole file is one record.
    Single,
}

impl FileKind {
    /// Classifies a path by its lowercased extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "sgfs" => Some(FileKind::Batch),
            "sgf" => Some(FileKind::Single),
            _ => None,
        }
    }
}

/// Files found by one scan that were not tracked before.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewFiles {
    pub batch: BTreeSet<PathBuf>,
    pub single: BTreeSet<PathBuf>,
}

impl NewFiles {
    pub fn len(&self) -> usize {
        self.batch.len() + self.single.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batch.is_empty() && self.single.is_empty()
    }

    fn insert(&mut self, kind: FileKind, path: PathBuf) {
        match kind {
            FileKind::Batch => self.batch.insert(path),
            FileKind::Single => self.single.insert(path),
        };
    }
}

/// The set of batch and single record files ingested so far.
///
/// A path lives in at most one of the two sets; which one is fixed by its
/// extension.
#[derive(Debug, Clone, Default)]
pub struct FileTracker {
    tracked: NewFiles,
}

impl FileTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scans `dir` for game record files and tracks the ones not seen before.
    ///
    /// Files with other extensions, or none, are skipped silently. With
    /// `recursive`, subdirectories are scanned as well.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::MissingPath`] or [`IngestError::NotADirectory`]
    /// without tracking anything when `dir` is not an existing directory.
    pub fn discover(&mut self, dir: &Path, recursive: bool) -> Result<NewFiles, IngestError> {
        if !dir.exists() {
            return Err(IngestError::MissingPath(dir.to_path_buf()));
        }
        if !dir.is_dir() {
            return Err(IngestError::NotADirectory(dir.to_path_buf()));
        }
        let root = dir.canonicalize().map_err(|source| IngestError::Read {
            path: dir.to_path_buf(),
            source,
        })?;

        let escaped = Pattern::escape(&root.to_string_lossy());
        let pattern = if recursive {
            format!("{}/**/*", escaped)
        } else {
            format!("{}/*", escaped)
        };

        let mut found = NewFiles::default();
        for entry in glob::glob(&pattern)? {
            let path = match entry {
                Ok(path) => path,
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };
            if !path.is_file() {
                continue;
            }
            let Some(kind) = FileKind::from_path(&path) else {
                continue;
            };
            let path = path.canonicalize().unwrap_or(path);
            if !self.contains(&path) {
                found.insert(kind, path);
            }
        }

        for path in &found.batch {
            self.tracked.batch.insert(path.clone());
        }
        for path in &found.single {
            self.tracked.single.insert(path.clone());
        }

        info!(
            "Found {} new sgfs files and {} new sgf files under {}",
            found.batch.len(),
            found.single.len(),
            dir.display()
        );
        Ok(found)
    }

    /// Tracks a single file.
    ///
    /// Returns `Ok(None)` when the file is already tracked; adding the same
    /// file twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::MissingPath`] if the file does not exist,
    /// [`IngestError::NotAFile`] if the path is a directory or other non-file,
    /// and [`IngestError::UnrecognizedFileType`] if it is not a `.sgf` or
    /// `.sgfs` file.
    pub fn add_path(&mut self, path: &Path) -> Result<Option<(FileKind, PathBuf)>, IngestError> {
        if !path.exists() {
            return Err(IngestError::MissingPath(path.to_path_buf()));
        }
        if !path.is_file() {
            return Err(IngestError::NotAFile(path.to_path_buf()));
        }
        let kind = FileKind::from_path(path)
            .ok_or_else(|| IngestError::UnrecognizedFileType(path.to_path_buf()))?;
        let absolute = path.canonicalize().map_err(|source| IngestError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        if self.contains(&absolute) {
            info!("{} is already added", absolute.display());
            return Ok(None);
        }
        self.tracked.insert(kind, absolute.clone());
        Ok(Some((kind, absolute)))
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.tracked.batch.contains(path) || self.tracked.single.contains(path)
    }

    pub fn batch_files(&self) -> &BTreeSet<PathBuf> {
        &self.tracked.batch
    }

    pub fn single_files(&self) -> &BTreeSet<PathBuf> {
        &self.tracked.single
    }

    /// Number of tracked files of both kinds.
    pub fn len(&self) -> usize {
        self.tracked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracked.is_empty()
    }

    /// Forgets every tracked file.
    pub fn reset(&mut self) {
        self.tracked = NewFiles::default();
    }
}
