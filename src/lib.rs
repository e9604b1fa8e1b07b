// Library root
// -----------
// The binary (`main.rs`) is a thin shell over these modules:
// - `collect`: recursive walk of the root folder.
// - `encode`: reads files and builds the `{path, content}` payload.
// - `api`: the single HTTP call to the folder-upload endpoint.
// - `config` / `ui`: where the folder and API key come from.
// - `error`: the error taxonomy shared by all of the above.
pub mod api;
pub mod collect;
pub mod config;
pub mod encode;
pub mod error;
pub mod ui;

use std::path::Path;

use tracing::info;
use tracing_subscriber::EnvFilter;

pub use api::{UploadClient, UploadResponse};
pub use encode::FileRecord;
pub use error::UploadError;

/// Collect, encode and upload everything under `root` in one request.
///
/// Traversal and read errors abort before the network is touched; an empty
/// folder is refused rather than sent.
pub fn upload_folder(root: &Path, client: &UploadClient) -> Result<UploadResponse, UploadError> {
    let records = encode::build_payload(root)?;
    let response = client.upload_folder(&records)?;
    if let Some(cid) = response.root_cid() {
        info!(%cid, "folder uploaded");
    }
    Ok(response)
}

/// Log to stderr, filtered by `RUST_LOG` (default `info`), so stdout only
/// carries the provider's response.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
