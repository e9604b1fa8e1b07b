// Error taxonomy shared by the library modules. The binary wraps these in
// `anyhow` at the top level; nothing here is retried or recovered.

use std::path::PathBuf;

use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("folder not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("permission denied: {}", path.display())]
    Permission {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("path is not valid UTF-8: {}", .0.display())]
    InvalidPath(PathBuf),

    #[error("no files to upload")]
    EmptyFolder,

    #[error("API key rejected by provider ({status})")]
    Auth { status: StatusCode, body: String },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("provider returned {status}: {body}")]
    Provider { status: StatusCode, body: String },

    #[error("configuration error: {0}")]
    Config(String),
}

impl UploadError {
    /// Classify an `io::Error` raised while touching `path`.
    pub fn from_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => UploadError::Permission { path, source },
            _ => UploadError::Io { path, source },
        }
    }
}
