// Folder traversal: turns a root directory into a lazy stream of regular
// files, each tagged with its `/`-separated path relative to the root.

use std::fs::{self, ReadDir};
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, warn};

use crate::error::UploadError;

/// A regular file found under the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectedFile {
    /// Path relative to the root, components joined with `/`.
    pub relative_path: String,
    pub absolute_path: PathBuf,
}

/// Depth-first walk over a root directory.
///
/// Symlinks to files are yielded and later read through the link; symlinks to
/// directories are not descended into. Dangling links are yielded as files so
/// the read reports them. After the first error the iterator is exhausted.
pub struct FolderCollector {
    root: PathBuf,
    stack: Vec<(PathBuf, ReadDir)>,
    failed: bool,
}

impl FolderCollector {
    /// Open `root` for traversal. Fails if it is missing, not a directory or
    /// cannot be listed.
    pub fn new(root: impl AsRef<Path>) -> Result<Self, UploadError> {
        let given = root.as_ref();
        let meta = match fs::metadata(given) {
            Ok(meta) => meta,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(UploadError::NotFound(given.to_path_buf()))
            }
            Err(e) => return Err(UploadError::from_io(given, e)),
        };
        if !meta.is_dir() {
            return Err(UploadError::NotADirectory(given.to_path_buf()));
        }

        let root = given
            .canonicalize()
            .map_err(|e| UploadError::from_io(given, e))?;
        let entries = fs::read_dir(&root).map_err(|e| UploadError::from_io(&root, e))?;
        debug!(root = %root.display(), "walking folder");

        Ok(FolderCollector {
            stack: vec![(root.clone(), entries)],
            root,
            failed: false,
        })
    }

    /// Absolute, canonical root of the walk.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn fail(&mut self, err: UploadError) -> Result<CollectedFile, UploadError> {
        self.failed = true;
        self.stack.clear();
        Err(err)
    }

    fn relative(&self, path: &Path) -> Result<String, UploadError> {
        let rel = path
            .strip_prefix(&self.root)
            .map_err(|_| UploadError::InvalidPath(path.to_path_buf()))?;
        let mut parts = Vec::new();
        for component in rel.components() {
            match component {
                Component::Normal(name) => match name.to_str() {
                    Some(s) => parts.push(s),
                    None => return Err(UploadError::InvalidPath(path.to_path_buf())),
                },
                _ => return Err(UploadError::InvalidPath(path.to_path_buf())),
            }
        }
        Ok(parts.join("/"))
    }

    fn file(&self, path: PathBuf) -> Result<CollectedFile, UploadError> {
        let relative_path = self.relative(&path)?;
        Ok(CollectedFile {
            relative_path,
            absolute_path: path,
        })
    }
}

impl Iterator for FolderCollector {
    type Item = Result<CollectedFile, UploadError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        loop {
            let (dir, entries) = self.stack.last_mut()?;
            let entry = match entries.next() {
                None => {
                    self.stack.pop();
                    continue;
                }
                Some(Ok(entry)) => entry,
                Some(Err(e)) => {
                    let err = UploadError::from_io(dir.clone(), e);
                    return Some(self.fail(err));
                }
            };

            let path = entry.path();
            let file_type = match entry.file_type() {
                Ok(t) => t,
                Err(e) => return Some(self.fail(UploadError::from_io(path, e))),
            };

            if file_type.is_dir() {
                match fs::read_dir(&path) {
                    Ok(children) => self.stack.push((path, children)),
                    Err(e) => return Some(self.fail(UploadError::from_io(path, e))),
                }
            } else if file_type.is_file() {
                return Some(self.file(path));
            } else if file_type.is_symlink() {
                match fs::metadata(&path) {
                    Ok(target) if target.is_dir() => {
                        debug!(path = %path.display(), "not following directory symlink");
                    }
                    Ok(target) if !target.is_file() => {
                        warn!(path = %path.display(), "skipping symlink to special file");
                    }
                    // file targets and dangling links both go to the reader
                    _ => return Some(self.file(path)),
                }
            } else {
                warn!(path = %path.display(), "skipping special file");
            }
        }
    }
}
