//! Record construction and NDJSON line encoding.

use std::path::{Component, Path, PathBuf};

use super::{EntryRecord, EntryType, ResolvedEntry};

/// Extension reported for files whose name carries none.
pub const NO_EXTENSION: &str = "file";

/// Builds wire records relative to a fixed root.
#[derive(Debug, Clone)]
pub struct RecordEncoder {
    root: PathBuf,
}

impl RecordEncoder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Build the canonical record for a resolved entry.
    pub fn to_record(&self, entry: &ResolvedEntry) -> EntryRecord {
        let modified = entry.modified_ms;
        let created = entry.created_ms.filter(|&ms| ms > 0).unwrap_or(modified);
        let name = entry.name.to_string_lossy().into_owned();

        EntryRecord {
            path: client_path(&self.root, &entry.full_path),
            size: if entry.is_directory { None } else { entry.size.or(Some(0)) },
            is_directory: entry.is_directory,
            created,
            modified,
            permissions: format_permissions(entry.mode),
            extension: if entry.is_directory {
                None
            } else {
                Some(extension_of(&name).to_string())
            },
            entry_type: if entry.is_directory {
                EntryType::Directory
            } else {
                EntryType::File
            },
            name,
        }
    }

    /// Encode a resolved entry as one JSON object followed by `\n`.
    ///
    /// Control characters in names are escaped by the serializer, so the
    /// output never contains a newline other than the terminator.
    pub fn encode(&self, entry: &ResolvedEntry) -> Result<Vec<u8>, serde_json::Error> {
        encode_line(&self.to_record(entry))
    }
}

/// Serialize a record as a single NDJSON line.
pub fn encode_line(record: &EntryRecord) -> Result<Vec<u8>, serde_json::Error> {
    let mut line = serde_json::to_vec(record)?;
    line.push(b'\n');
    Ok(line)
}

/// Path of `full` relative to `root`, `/`-prefixed with forward slashes.
/// The root itself maps to `/`.
pub fn client_path(root: &Path, full: &Path) -> String {
    let relative = full.strip_prefix(root).unwrap_or(full);
    let mut out = String::new();
    for component in relative.components() {
        if let Component::Normal(part) = component {
            out.push('/');
            out.push_str(&part.to_string_lossy());
        }
    }
    if out.is_empty() {
        out.push('/');
    }
    out
}

/// Render mode bits as octal digits, zero-padded to 11 characters.
pub fn format_permissions(mode: u32) -> String {
    format!("{:011o}", mode)
}

/// Text after the last `.` of `name`.
///
/// Dotfiles such as `.bashrc` and names ending in `.` have no extension
/// and get [`NO_EXTENSION`].
pub fn extension_of(name: &str) -> &str {
    match name.rfind('.') {
        Some(idx) if idx > 0 && idx + 1 < name.len() => &name[idx + 1..],
        _ => NO_EXTENSION,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file_entry(root: &Path, name: &str, size: u64) -> ResolvedEntry {
        ResolvedEntry {
            name: name.into(),
            full_path: root.join(name),
            is_directory: false,
            size: Some(size),
            created_ms: Some(1_000),
            modified_ms: 2_000,
            mode: 0o100644,
        }
    }

    #[test]
    fn extension_rules() {
        assert_eq!(extension_of("a.txt"), "txt");
        assert_eq!(extension_of("archive.tar.gz"), "gz");
        assert_eq!(extension_of("Makefile"), "file");
        assert_eq!(extension_of(".bashrc"), "file");
        assert_eq!(extension_of("trailing."), "file");
        assert_eq!(extension_of("..hidden"), "hidden");
        assert_eq!(extension_of("..."), "file");
        assert_eq!(extension_of(".config.json"), "json");
    }

    #[test]
    fn permissions_are_padded_octal() {
        assert_eq!(format_permissions(0o755), "00000000755");
        assert_eq!(format_permissions(0o100644), "00000100644");
        assert_eq!(format_permissions(0o40755).len(), 11);
    }

    #[cfg(unix)]
    #[test]
    fn client_path_is_root_relative() {
        let root = Path::new("/data");
        assert_eq!(client_path(root, Path::new("/data")), "/");
        assert_eq!(client_path(root, Path::new("/data/a.txt")), "/a.txt");
        assert_eq!(client_path(root, Path::new("/data/x/y/z")), "/x/y/z");
    }

    #[cfg(unix)]
    #[test]
    fn file_record_matches_scenario() {
        let root = Path::new("/data");
        let record = RecordEncoder::new(root).to_record(&file_entry(root, "a.txt", 10));

        assert_eq!(record.name, "a.txt");
        assert_eq!(record.path, "/a.txt");
        assert_eq!(record.size, Some(10));
        assert!(!record.is_directory);
        assert_eq!(record.extension.as_deref(), Some("txt"));
        assert_eq!(record.entry_type, EntryType::File);
        assert_eq!(record.created, 1_000);
        assert_eq!(record.modified, 2_000);
        assert_eq!(record.permissions, "00000100644");
    }

    #[cfg(unix)]
    #[test]
    fn directory_record_has_no_size_or_extension() {
        let root = Path::new("/data");
        let entry = ResolvedEntry {
            name: "b.d".into(),
            full_path: root.join("sub").join("b.d"),
            is_directory: true,
            size: None,
            created_ms: None,
            modified_ms: 5,
            mode: 0o755,
        };
        let record = RecordEncoder::new(root).to_record(&entry);
        assert_eq!(record.path, "/sub/b.d");
        assert_eq!(record.size, None);
        assert_eq!(record.extension, None);
        assert_eq!(record.entry_type, EntryType::Directory);
        assert_eq!(record.created, 5);
        assert_eq!(record.permissions, "00000000755");
    }

    #[test]
    fn zero_creation_time_falls_back_to_modified() {
        let root = Path::new("root");
        let mut entry = file_entry(root, "x.bin", 1);
        entry.created_ms = Some(0);
        let record = RecordEncoder::new(root).to_record(&entry);
        assert_eq!(record.created, record.modified);
    }

    #[test]
    fn encoded_line_is_single_line_json() {
        let root = Path::new("root");
        let entry = file_entry(root, "evil\nname\r\u{1}.txt", 3);
        let line = RecordEncoder::new(root).encode(&entry).unwrap();

        assert_eq!(line.last(), Some(&b'\n'));
        assert_eq!(line.iter().filter(|&&b| b == b'\n').count(), 1);
        assert!(!line.contains(&b'\r'));

        let parsed: serde_json::Value = serde_json::from_slice(&line).unwrap();
        assert_eq!(parsed["name"], "evil\nname\r\u{1}.txt");
        assert_eq!(parsed["extension"], "txt");
        assert_eq!(parsed["type"], "file");
        assert_eq!(parsed["isDirectory"], false);
    }
}
