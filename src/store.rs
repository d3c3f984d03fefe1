//! Recording storage: listing and deleting macro files on disk.
//!
//! The store is a thin file-system view over one directory. It never caches:
//! every call re-reads the directory, and existence is checked at use time.

use std::fs;
use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use thiserror::Error;

use crate::config::Settings;

/// Result of scanning the recordings directory.
///
/// An absent directory and an empty (or match-free) directory are different
/// answers; the caller renders a different message for each.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Listing {
    /// The directory itself does not exist.
    Missing,
    /// The directory exists; sorted names of matching recordings, possibly empty.
    Found(Vec<String>),
}

/// Failure kinds for [`RecordingStore::delete`].
#[derive(Debug, Error)]
pub enum DeleteError {
    /// The named recording is already gone.
    #[error("recording '{0}' not found")]
    NotFound(String),
    /// The file exists but could not be removed.
    #[error("could not delete '{name}': {source}")]
    Denied {
        name: String,
        #[source]
        source: io::Error,
    },
}

/// File-system view over one recordings directory.
#[derive(Debug, Clone)]
pub struct RecordingStore {
    dir: PathBuf,
    suffix: String,
}

impl RecordingStore {
    pub fn new(settings: &Settings) -> RecordingStore {
        RecordingStore {
            dir: settings.recordings_dir.clone(),
            suffix: settings.suffix.clone(),
        }
    }

    /// Path of one recording by name, inside the store directory.
    pub fn path_of(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// Whether the named recording exists right now.
    pub fn exists(&self, name: &str) -> bool {
        self.path_of(name).is_file()
    }

    /// Scans the directory for recordings.
    ///
    /// Returns [`Listing::Missing`] when the directory is absent, otherwise a
    /// lexicographically sorted list of the regular files whose name ends
    /// with the configured suffix. Anything else in the directory is ignored.
    pub fn list(&self) -> Result<Listing> {
        if !self.dir.is_dir() {
            return Ok(Listing::Missing);
        }
        let entries = fs::read_dir(&self.dir)
            .with_context(|| format!("failed to read directory {}", self.dir.display()))?;
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry
                .with_context(|| format!("failed to read entry in {}", self.dir.display()))?;
            let file_type = entry
                .file_type()
                .with_context(|| format!("failed to stat entry in {}", self.dir.display()))?;
            if !file_type.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if name.ends_with(&self.suffix) {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(Listing::Found(names))
    }

    /// Deletes one recording by name.
    ///
    /// Irreversible. The caller is responsible for refreshing any view that
    /// still shows the name.
    pub fn delete(&self, name: &str) -> Result<(), DeleteError> {
        let path = self.path_of(name);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                Err(DeleteError::NotFound(name.to_string()))
            }
            Err(err) => Err(DeleteError::Denied {
                name: name.to_string(),
                source: err,
            }),
        }
    }
}
