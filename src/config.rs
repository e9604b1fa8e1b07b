// Configuration sources for the folder and the API key. Nothing is compiled
// in: values come from the command line, the environment or a key file in
// the user's home directory. Interactive fallbacks live in `ui`.

use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::UploadError;

pub const FOLDER_ENV: &str = "IPFS_UPLOAD_FOLDER";
pub const API_KEY_ENV: &str = "MORALIS_API_KEY";
const KEY_FILE_NAME: &str = ".ipfs_folder_upload_key";

/// Fully resolved settings for one run.
#[derive(Clone)]
pub struct Config {
    pub folder: PathBuf,
    api_key: String,
}

/// Whatever could be found without asking the user.
#[derive(Default, Clone)]
pub struct PartialConfig {
    pub folder: Option<PathBuf>,
    pub api_key: Option<String>,
}

impl Config {
    pub fn new(folder: impl Into<PathBuf>, api_key: &str) -> Result<Self, UploadError> {
        let api_key = clean_key(api_key)
            .ok_or_else(|| UploadError::Config("API key is empty".into()))?;
        Ok(Config {
            folder: folder.into(),
            api_key,
        })
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}

impl PartialConfig {
    /// Folder: `arg`, then `IPFS_UPLOAD_FOLDER`. Key: `MORALIS_API_KEY`, then
    /// the key file.
    pub fn gather(
        arg: Option<String>,
        env: impl Fn(&str) -> Option<String>,
        key_file: &Path,
    ) -> Result<Self, UploadError> {
        let folder = arg
            .filter(|a| !a.trim().is_empty())
            .or_else(|| env(FOLDER_ENV).filter(|v| !v.trim().is_empty()))
            .map(PathBuf::from);

        let api_key = match env(API_KEY_ENV).as_deref().and_then(clean_key) {
            Some(key) => Some(key),
            None => load_api_key(key_file)?,
        };

        Ok(PartialConfig { folder, api_key })
    }

    pub fn finish(self) -> Result<Config, UploadError> {
        let folder = self.folder.ok_or_else(|| {
            UploadError::Config(format!(
                "no folder given; pass it as the first argument or set {}",
                FOLDER_ENV
            ))
        })?;
        let api_key = self.api_key.ok_or_else(|| {
            UploadError::Config(format!("no API key found; set {}", API_KEY_ENV))
        })?;
        Config::new(folder, &api_key)
    }
}

/// Location of the persisted key: `~/.ipfs_folder_upload_key`, or the
/// current directory when no home directory is known.
pub fn key_file_path() -> PathBuf {
    let dir = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    dir.join(KEY_FILE_NAME)
}

/// Read a key saved by [`persist_api_key`]. A missing file is not an error.
pub fn load_api_key(path: &Path) -> Result<Option<String>, UploadError> {
    match fs::read_to_string(path) {
        Ok(data) => Ok(clean_key(&data)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(UploadError::from_io(path, e)),
    }
}

pub fn persist_api_key(path: &Path, key: &str) -> Result<(), UploadError> {
    fs::write(path, key).map_err(|e| UploadError::from_io(path, e))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))
            .map_err(|e| UploadError::from_io(path, e))?;
    }
    Ok(())
}

fn clean_key(raw: &str) -> Option<String> {
    let key = raw.trim();
    (!key.is_empty()).then(|| key.to_string())
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("folder", &self.folder)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl fmt::Debug for PartialConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PartialConfig")
            .field("folder", &self.folder)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
