// Payload encoding: reads each collected file fully into memory and pairs
// its base64 text with the relative path the provider will store it under.

use std::fs;
use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::collect::{CollectedFile, FolderCollector};
use crate::error::UploadError;

/// One entry of the upload body: `{"path": "...", "content": "<base64>"}`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub path: String,
    pub content: String,
}

/// Standard (padded) base64 of `bytes`.
pub fn encode_bytes(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

pub fn decode_content(content: &str) -> Result<Vec<u8>, base64::DecodeError> {
    STANDARD.decode(content)
}

/// Read `file` and turn it into a record.
pub fn encode_file(file: &CollectedFile) -> Result<FileRecord, UploadError> {
    let bytes =
        fs::read(&file.absolute_path).map_err(|e| UploadError::from_io(&file.absolute_path, e))?;
    debug!(path = %file.relative_path, bytes = bytes.len(), "encoded file");
    Ok(FileRecord {
        path: file.relative_path.clone(),
        content: encode_bytes(&bytes),
    })
}

/// Collect and encode every regular file under `root`.
///
/// All-or-nothing: the first traversal or read error aborts and nothing is
/// returned. The whole payload is held in memory.
pub fn build_payload(root: impl AsRef<Path>) -> Result<Vec<FileRecord>, UploadError> {
    let collector = FolderCollector::new(root)?;
    let mut records = Vec::new();
    for file in collector {
        records.push(encode_file(&file?)?);
    }
    info!(
        files = records.len(),
        encoded_bytes = payload_size(&records),
        "payload ready"
    );
    Ok(records)
}

/// Total size of the base64 text held by `records`.
pub fn payload_size(records: &[FileRecord]) -> usize {
    records.iter().map(|r| r.content.len()).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_empty_and_binary() {
        let all_bytes: Vec<u8> = (0..=255).collect();
        let samples: [&[u8]; 4] = [b"", b"hi", b"\x00\xff\x10", &all_bytes];
        for sample in samples {
            assert_eq!(decode_content(&encode_bytes(sample)).unwrap(), sample);
        }
    }

    #[test]
    fn uses_padded_standard_alphabet() {
        assert_eq!(encode_bytes(b"hi"), "aGk=");
        assert_eq!(encode_bytes(&[0xfb, 0xff]), "+/8=");
        assert_eq!(encode_bytes(b""), "");
    }

    #[test]
    fn payload_matches_folder_contents() {
        let dir = tempfile::tempdir().unwrap();
        let binary = vec![0u8, 1, 2, 200, 255, 0];
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("a.txt"), "hi").unwrap();
        fs::write(dir.path().join("sub/b.bin"), &binary).unwrap();

        let mut records = build_payload(dir.path()).unwrap();
        records.sort_by(|a, b| a.path.cmp(&b.path));

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].path, "a.txt");
        assert_eq!(decode_content(&records[0].content).unwrap(), b"hi");
        assert_eq!(records[1].path, "sub/b.bin");
        assert_eq!(decode_content(&records[1].content).unwrap(), binary);
    }

    #[test]
    fn record_count_equals_file_count() {
        let dir = tempfile::tempdir().unwrap();
        for d in ["one", "one/two", "three"] {
            fs::create_dir(dir.path().join(d)).unwrap();
        }
        for f in ["r", "one/a", "one/two/b", "one/two/c", "three/d"] {
            fs::write(dir.path().join(f), f.as_bytes()).unwrap();
        }
        assert_eq!(build_payload(dir.path()).unwrap().len(), 5);
    }

    #[test]
    fn serializes_as_path_and_content() {
        let record = FileRecord {
            path: "sub/x".into(),
            content: encode_bytes(b"x"),
        };
        let json = serde_json::to_value(vec![record]).unwrap();
        assert_eq!(json, serde_json::json!([{ "path": "sub/x", "content": "eA==" }]));
    }

    #[test]
    fn payload_size_sums_content() {
        let records = vec![
            FileRecord { path: "a".into(), content: "aGk=".into() },
            FileRecord { path: "b".into(), content: "".into() },
        ];
        assert_eq!(payload_size(&records), 4);
    }

    #[test]
    fn missing_root_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            build_payload(dir.path().join("gone")),
            Err(UploadError::NotFound(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn dangling_link_fails_at_read() {
        let dir = tempfile::tempdir().unwrap();
        std::os::unix::fs::symlink(dir.path().join("missing"), dir.path().join("broken")).unwrap();
        assert!(matches!(build_payload(dir.path()), Err(UploadError::Io { .. })));
    }
}
