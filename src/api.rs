// Upload client: a small blocking HTTP client for the hosted folder-upload
// endpoint. One request per run; no retries and no timeout.

use std::fmt;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::encode::FileRecord;
use crate::error::UploadError;

/// Moralis folder-upload endpoint used when `IPFS_UPLOAD_URL` is unset.
pub const DEFAULT_UPLOAD_URL: &str = "https://deep-index.moralis.io/api/v2.2/ipfs/uploadFolder";

const API_KEY_HEADER: &str = "X-API-Key";

/// Client holding the reqwest blocking client, the endpoint URL and the
/// API key sent with the request.
#[derive(Clone)]
pub struct UploadClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

/// One stored file as reported by the provider, e.g.
/// `{"path": "https://ipfs.moralis.io:2053/ipfs/<cid>/a.txt"}`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UploadedEntry {
    pub path: String,
}

/// Successful response, kept exactly as the provider sent it.
#[derive(Debug, Clone)]
pub struct UploadResponse {
    status: StatusCode,
    body: String,
}

impl UploadClient {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Result<Self, UploadError> {
        let client = Client::builder().build()?;
        Ok(UploadClient {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        })
    }

    /// Create a client for `IPFS_UPLOAD_URL`, falling back to
    /// [`DEFAULT_UPLOAD_URL`].
    pub fn from_env(api_key: impl Into<String>) -> Result<Self, UploadError> {
        let endpoint =
            std::env::var("IPFS_UPLOAD_URL").unwrap_or_else(|_| DEFAULT_UPLOAD_URL.into());
        Self::new(endpoint, api_key)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn auth_headers(&self) -> Result<HeaderMap, UploadError> {
        let mut headers = HeaderMap::new();
        let mut key = HeaderValue::from_str(&self.api_key)
            .map_err(|_| UploadError::Config("API key contains invalid header characters".into()))?;
        key.set_sensitive(true);
        headers.insert(API_KEY_HEADER, key);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    /// POST `records` as a JSON array in a single request.
    ///
    /// 401/403 map to [`UploadError::Auth`], any other non-success status to
    /// [`UploadError::Provider`]. An empty list is rejected without a request.
    pub fn upload_folder(&self, records: &[FileRecord]) -> Result<UploadResponse, UploadError> {
        if records.is_empty() {
            return Err(UploadError::EmptyFolder);
        }
        let headers = self.auth_headers()?;

        info!(files = records.len(), endpoint = %self.endpoint, "uploading folder");
        let res = self
            .client
            .post(&self.endpoint)
            .headers(headers)
            .json(records)
            .send()?;

        let status = res.status();
        let body = res.text()?;
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(UploadError::Auth { status, body })
            }
            s if !s.is_success() => Err(UploadError::Provider { status, body }),
            _ => Ok(UploadResponse { status, body }),
        }
    }
}

impl fmt::Debug for UploadClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadClient")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl UploadResponse {
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Body exactly as returned by the provider.
    pub fn raw(&self) -> &str {
        &self.body
    }

    /// Parse the body as a list of stored paths.
    pub fn entries(&self) -> Result<Vec<UploadedEntry>, serde_json::Error> {
        serde_json::from_str(&self.body)
    }

    /// CID of the uploaded folder, taken from the first gateway path.
    pub fn root_cid(&self) -> Option<String> {
        let entries = self.entries().ok()?;
        let path = &entries.first()?.path;
        let (_, after) = path.split_once("/ipfs/")?;
        let cid = after.split('/').next()?;
        (!cid.is_empty()).then(|| cid.to_string())
    }
}

impl fmt::Display for UploadResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.body)
    }
}
