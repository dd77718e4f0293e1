//! Per-entry metadata resolution.

use std::path::Path;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::warn;

use super::{FileStat, RawEntry, ResolvedEntry};

/// Mode reported for directories, which are never stat'ed.
pub const DIRECTORY_MODE: u32 = 0o755;

/// Async stat lookup for a single path.
#[async_trait::async_trait]
pub trait MetadataSource: Send + Sync {
    /// Stat `path`, following symlinks.
    async fn stat(&self, path: &Path) -> std::io::Result<FileStat>;
}

/// Metadata source backed by the local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalMetadata;

#[async_trait::async_trait]
impl MetadataSource for LocalMetadata {
    async fn stat(&self, path: &Path) -> std::io::Result<FileStat> {
        let metadata = tokio::fs::metadata(path).await?;
        Ok(FileStat {
            size: metadata.len(),
            created_ms: metadata.created().ok().and_then(epoch_millis),
            modified_ms: metadata.modified().ok().and_then(epoch_millis),
            mode: mode_bits(&metadata),
        })
    }
}

/// Turns raw entries into resolved entries, one lookup at a time.
pub struct MetadataResolver {
    source: Arc<dyn MetadataSource>,
}

impl MetadataResolver {
    pub fn new(source: Arc<dyn MetadataSource>) -> Self {
        Self { source }
    }

    /// Resolver over the local filesystem.
    pub fn local() -> Self {
        Self::new(Arc::new(LocalMetadata))
    }

    /// Resolve `entry` inside `parent`.
    ///
    /// Directories are synthesised without a lookup. Returns `None` when
    /// the lookup fails, typically because the entry vanished after it was
    /// enumerated.
    pub async fn resolve(&self, parent: &Path, entry: RawEntry) -> Option<ResolvedEntry> {
        let full_path = parent.join(&entry.name);

        if entry.is_dir_hint {
            return Some(ResolvedEntry {
                name: entry.name,
                full_path,
                is_directory: true,
                size: None,
                created_ms: None,
                modified_ms: now_millis(),
                mode: DIRECTORY_MODE,
            });
        }

        match self.source.stat(&full_path).await {
            Ok(stat) => Some(ResolvedEntry {
                name: entry.name,
                full_path,
                is_directory: false,
                size: Some(stat.size),
                created_ms: stat.created_ms,
                modified_ms: stat.modified_ms.unwrap_or_else(now_millis),
                mode: stat.mode,
            }),
            Err(e) => {
                warn!("Could not stat file {}: {}", full_path.display(), e);
                None
            }
        }
    }
}

/// Milliseconds since the Unix epoch; `None` for pre-epoch times.
pub fn epoch_millis(time: SystemTime) -> Option<u64> {
    time.duration_since(UNIX_EPOCH)
        .ok()
        .map(|d| d.as_millis() as u64)
}

/// Current time in epoch milliseconds.
pub fn now_millis() -> u64 {
    epoch_millis(SystemTime::now()).unwrap_or_default()
}

#[cfg(unix)]
fn mode_bits(metadata: &std::fs::Metadata) -> u32 {
    use std::os::unix::fs::MetadataExt;
    metadata.mode()
}

/// Without Unix mode bits, report a regular file that is read-write or
/// read-only.
#[cfg(not(unix))]
fn mode_bits(metadata: &std::fs::Metadata) -> u32 {
    if metadata.permissions().readonly() {
        0o100444
    } else {
        0o100666
    }
}
