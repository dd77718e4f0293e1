//! Lazy, single-pass directory enumeration.

use std::path::{Path, PathBuf};

use tracing::debug;

use super::RawEntry;
use crate::errors::{map_io_error, ListingError};

/// A lazy source of raw directory entries.
///
/// Entries come out in whatever order the underlying read produces them.
/// The sequence is finite and cannot be restarted.
#[async_trait::async_trait]
pub trait EntrySource: Send {
    /// Advance to the next entry; `Ok(None)` once exhausted.
    async fn next_entry(&mut self) -> Result<Option<RawEntry>, ListingError>;
}

/// Enumerates one directory through a single open handle.
///
/// The handle is owned by this value and closed when it is dropped, which
/// covers exhaustion, early abandonment and errors alike.
#[derive(Debug)]
pub struct DirectoryEnumerator {
    path: PathBuf,
    read_dir: tokio::fs::ReadDir,
}

impl DirectoryEnumerator {
    /// Open `path` for enumeration.
    ///
    /// Fails before producing any entry when the path is missing, is not a
    /// directory or cannot be read.
    pub async fn open(path: &Path) -> Result<Self, ListingError> {
        let read_dir = tokio::fs::read_dir(path)
            .await
            .map_err(|e| map_io_error(e, &path.to_string_lossy()))?;
        debug!("Opened directory {}", path.display());
        Ok(Self {
            path: path.to_path_buf(),
            read_dir,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait::async_trait]
impl EntrySource for DirectoryEnumerator {
    async fn next_entry(&mut self) -> Result<Option<RawEntry>, ListingError> {
        let entry = match self.read_dir.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => return Ok(None),
            Err(e) => {
                return Err(ListingError::Enumeration(format!(
                    "{}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        // DirEntry::file_type does not follow symlinks.
        let is_dir = entry
            .file_type()
            .await
            .map(|t| t.is_dir())
            .unwrap_or(false);

        if is_dir {
            Ok(Some(RawEntry::directory(entry.file_name())))
        } else {
            Ok(Some(RawEntry::file(entry.file_name())))
        }
    }
}
