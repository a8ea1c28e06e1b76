//! Databricks DBFS backend over the DBFS REST API 2.0

use anyhow::{Context, Result};
use base64::Engine;
use serde::{Deserialize, Serialize};

/// Bytes requested per `dbfs/read` call (the API maximum is 1MB)
pub const DBFS_READ_CHUNK: u64 = 1024 * 1024;

const NOT_FOUND: &str = "RESOURCE_DOES_NOT_EXIST";

/// Error payload returned by the Databricks REST API
#[derive(Debug, thiserror::Error)]
#[error("{error_code}: {message} (HTTP {status})")]
pub struct DbfsApiError {
    pub status: u16,
    pub error_code: String,
    pub message: String,
}

/// Status of a DBFS file or directory
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct FileInfo {
    pub path: String,
    pub is_dir: bool,
    #[serde(default)]
    pub file_size: u64,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error_code: String,
    #[serde(default)]
    message: String,
}

#[derive(Deserialize)]
struct ReadResponse {
    bytes_read: u64,
    #[serde(default)]
    data: String,
}

#[derive(Serialize)]
struct DeleteRequest<'a> {
    path: &'a str,
    recursive: bool,
}

/// Client for the DBFS REST API of one Databricks workspace
#[derive(Clone)]
pub struct DbfsClient {
    http: reqwest::Client,
    host: String,
    token: String,
}

impl std::fmt::Debug for DbfsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbfsClient")
            .field("host", &self.host)
            .finish_non_exhaustive()
    }
}

impl DbfsClient {
    /// Create a client for a workspace host
    ///
    /// A host without a scheme is assumed to be served over HTTPS.
    pub fn new(host: &str, token: &str) -> Result<Self> {
        let host = host.trim().trim_end_matches('/');
        if host.is_empty() {
            anyhow::bail!("Databricks host must not be empty");
        }
        if token.trim().is_empty() {
            anyhow::bail!("Databricks token must not be empty");
        }

        let host = if host.starts_with("http://") || host.starts_with("https://") {
            host.to_string()
        } else {
            format!("https://{host}")
        };

        Ok(Self {
            http: reqwest::Client::new(),
            host,
            token: token.to_string(),
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    fn endpoint(&self, operation: &str) -> String {
        format!("{}/api/2.0/dbfs/{operation}", self.host)
    }

    /// Get the status of a path, or `None` when it does not exist
    pub async fn get_status(&self, path: &str) -> Result<Option<FileInfo>> {
        let response = self
            .http
            .get(self.endpoint("get-status"))
            .bearer_auth(&self.token)
            .query(&[("path", path)])
            .send()
            .await
            .with_context(|| format!("Failed to call DBFS get-status for: {path}"))?;

        match api_result(response).await {
            Ok(response) => {
                let info = response
                    .json::<FileInfo>()
                    .await
                    .with_context(|| format!("Invalid DBFS get-status response for: {path}"))?;
                Ok(Some(info))
            }
            Err(e) if e.error_code == NOT_FOUND => Ok(None),
            Err(e) => Err(e).with_context(|| format!("DBFS get-status failed for: {path}")),
        }
    }

    /// Read a whole DBFS file into memory
    pub async fn read(&self, path: &str) -> Result<Vec<u8>> {
        let mut contents = Vec::new();
        let mut offset: u64 = 0;

        loop {
            let response = self
                .http
                .get(self.endpoint("read"))
                .bearer_auth(&self.token)
                .query(&[
                    ("path", path.to_string()),
                    ("offset", offset.to_string()),
                    ("length", DBFS_READ_CHUNK.to_string()),
                ])
                .send()
                .await
                .with_context(|| format!("Failed to call DBFS read for: {path}"))?;

            let chunk = api_result(response)
                .await
                .with_context(|| format!("DBFS read failed for: {path}"))?
                .json::<ReadResponse>()
                .await
                .with_context(|| format!("Invalid DBFS read response for: {path}"))?;

            if chunk.bytes_read == 0 {
                break;
            }

            let bytes = base64::engine::general_purpose::STANDARD
                .decode(chunk.data.as_bytes())
                .with_context(|| format!("Invalid base64 data in DBFS read for: {path}"))?;
            contents.extend_from_slice(&bytes);
            offset += chunk.bytes_read;
        }

        tracing::debug!("Read {} bytes from DBFS: {}", contents.len(), path);

        Ok(contents)
    }

    /// Delete a file or directory
    pub async fn delete(&self, path: &str, recursive: bool) -> Result<()> {
        let response = self
            .http
            .post(self.endpoint("delete"))
            .bearer_auth(&self.token)
            .json(&DeleteRequest { path, recursive })
            .send()
            .await
            .with_context(|| format!("Failed to call DBFS delete for: {path}"))?;

        api_result(response)
            .await
            .with_context(|| format!("DBFS delete failed for: {path}"))?;

        tracing::debug!("Deleted from DBFS: {} (recursive: {})", path, recursive);

        Ok(())
    }
}

/// Turn a non-success response into a [`DbfsApiError`]
async fn api_result(response: reqwest::Response) -> Result<reqwest::Response, DbfsApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let body = serde_json::from_str::<ErrorBody>(&text).unwrap_or(ErrorBody {
        error_code: String::new(),
        message: text,
    });

    Err(DbfsApiError {
        status: status.as_u16(),
        error_code: if body.error_code.is_empty() {
            status.canonical_reason().unwrap_or("UNKNOWN").to_string()
        } else {
            body.error_code
        },
        message: body.message,
    })
}
