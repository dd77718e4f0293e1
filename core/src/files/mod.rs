//! Directory listing pipeline.
//!
//! A request flows through the stages leaf-first:
//! [`resolver`] (root containment) → [`enumerator`] (lazy directory read) →
//! [`metadata`] (per-entry stat) → [`encoder`] (NDJSON line) →
//! [`stream`] (backpressured delivery to a [`stream::LineSink`]).

pub mod encoder;
pub mod enumerator;
pub mod metadata;
pub mod resolver;
pub mod stream;

use std::ffi::OsString;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Record type discriminator, serialized as `"file"` / `"directory"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    File,
    Directory,
}

/// One streamed directory entry.
///
/// Field order is the wire order. Field names are serialized as camelCase
/// for the browser client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryRecord {
    pub name: String,
    /// Root-relative path, always starting with `/`.
    pub path: String,
    /// `None` for directories.
    pub size: Option<u64>,
    pub is_directory: bool,
    /// Epoch milliseconds.
    pub created: u64,
    /// Epoch milliseconds.
    pub modified: u64,
    /// Octal mode, zero-padded to 11 digits.
    pub permissions: String,
    /// `None` for directories, `"file"` for names without an extension.
    pub extension: Option<String>,
    #[serde(rename = "type")]
    pub entry_type: EntryType,
}

/// A raw entry as produced by directory enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntry {
    /// File name exactly as the directory read returned it. Not required to
    /// be valid UTF-8.
    pub name: OsString,
    /// Whether the directory read reported a directory. Symlinks are never
    /// hinted as directories.
    pub is_dir_hint: bool,
}

impl RawEntry {
    pub fn file(name: impl Into<OsString>) -> Self {
        Self {
            name: name.into(),
            is_dir_hint: false,
        }
    }

    pub fn directory(name: impl Into<OsString>) -> Self {
        Self {
            name: name.into(),
            is_dir_hint: true,
        }
    }
}

/// Stat result for a non-directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStat {
    pub size: u64,
    /// Epoch milliseconds; `None` when the platform or filesystem has no birth time.
    pub created_ms: Option<u64>,
    /// Epoch milliseconds; `None` when unavailable.
    pub modified_ms: Option<u64>,
    /// Full mode bits including the file type.
    pub mode: u32,
}

/// An entry whose metadata has been resolved and is ready to encode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEntry {
    /// Raw file name; converted lossily only when encoded.
    pub name: OsString,
    pub full_path: PathBuf,
    pub is_directory: bool,
    pub size: Option<u64>,
    pub created_ms: Option<u64>,
    pub modified_ms: u64,
    pub mode: u32,
}
