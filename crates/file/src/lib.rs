//! Source storage abstraction for reading and removing export sources
//!
//! This crate parses the path strings handed to `dbfs-export` and provides a
//! unified interface for opening, probing, and recursively removing them.
//!
//! # Path Types
//!
//! - **DBFS**: `dbfs:/tmp/data.csv` or a scheme-less absolute path `/tmp/data.csv`,
//!   accessed through the Databricks DBFS REST API
//! - **Local**: `file:/tmp/data.csv`, accessed through the local filesystem
//! - **S3**: `s3://bucket/key` (or `s3a://`), accessed through the AWS SDK
//!
//! # Example
//!
//! ```ignore
//! use dbfs_export_file::{SourceStorage, Storage, StoragePath};
//!
//! let storage = Storage::new().with_dbfs(DbfsClient::new(host, token)?);
//! let path = StoragePath::parse("dbfs:/tmp/upload.csv")?;
//! let removal = storage.remove(&path, true).await?;
//! ```

mod dbfs;
mod local;
mod s3;

use anyhow::Result;
use async_trait::async_trait;
use std::path::PathBuf;

pub use dbfs::{DbfsApiError, DbfsClient, FileInfo, DBFS_READ_CHUNK};
pub use s3::S3Client;

/// Error returned when a path string cannot be used as a storage location
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StoragePathError {
    #[error("Storage path must not be empty")]
    Empty,

    #[error("Refusing to use a filesystem root as a storage path: {0}")]
    Root(String),

    #[error("DBFS paths must be absolute: {0}")]
    Relative(String),

    #[error("S3 URI must be in format 's3://bucket/key/to/file': {0}")]
    InvalidS3(String),

    #[error("Unsupported storage scheme in: {0}")]
    UnsupportedScheme(String),
}

/// A parsed storage location
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoragePath {
    /// DBFS absolute path, without the `dbfs:` scheme
    Dbfs(String),
    /// Local filesystem path
    Local(PathBuf),
    /// S3 object (or prefix when removed recursively)
    S3 { bucket: String, key: String },
}

impl StoragePath {
    /// Parse a string into a StoragePath, auto-detecting the backend
    ///
    /// - `dbfs:/path` or `/path` -> Dbfs
    /// - `file:/path` -> Local
    /// - `s3://bucket/key` or `s3a://bucket/key` -> S3
    pub fn parse(uri: &str) -> Result<Self, StoragePathError> {
        if uri.trim().is_empty() {
            return Err(StoragePathError::Empty);
        }

        if let Some(rest) = uri.strip_prefix("dbfs:") {
            let path = format!("/{}", rest.trim_start_matches('/'));
            if path == "/" {
                return Err(StoragePathError::Root(uri.to_string()));
            }
            return Ok(StoragePath::Dbfs(path));
        }

        if let Some(rest) = uri.strip_prefix("file:") {
            let rest = rest.strip_prefix("//").unwrap_or(rest);
            if rest.is_empty() {
                return Err(StoragePathError::Empty);
            }
            if rest.trim_end_matches('/').is_empty() {
                return Err(StoragePathError::Root(uri.to_string()));
            }
            return Ok(StoragePath::Local(PathBuf::from(rest)));
        }

        if uri.starts_with("s3://") || uri.starts_with("s3a://") {
            let (bucket, key) = parse_s3_uri(uri)?;
            return Ok(StoragePath::S3 { bucket, key });
        }

        if uri.contains("://") {
            return Err(StoragePathError::UnsupportedScheme(uri.to_string()));
        }

        if !uri.starts_with('/') {
            return Err(StoragePathError::Relative(uri.to_string()));
        }
        if uri.trim_end_matches('/').is_empty() {
            return Err(StoragePathError::Root(uri.to_string()));
        }
        Ok(StoragePath::Dbfs(uri.to_string()))
    }

    /// Render the path the way a Spark engine expects to receive it
    pub fn engine_uri(&self) -> String {
        match self {
            StoragePath::Dbfs(path) => format!("dbfs:{path}"),
            StoragePath::Local(path) => format!("file:{}", path.display()),
            StoragePath::S3 { bucket, key } => format!("s3://{bucket}/{key}"),
        }
    }
}

impl std::fmt::Display for StoragePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.engine_uri())
    }
}

impl std::str::FromStr for StoragePath {
    type Err = StoragePathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StoragePath::parse(s)
    }
}

/// Outcome of a remove call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    /// Something existed at the path and has been deleted
    Deleted,
    /// Nothing existed at the path
    NotFound,
}

/// Operations the export needs from the storage layer holding its source
#[async_trait]
pub trait SourceStorage: Send + Sync {
    /// Open the object at `path` and return a sync-compatible reader over its bytes
    async fn open(&self, path: &StoragePath) -> Result<Box<dyn std::io::Read + Send>>;

    /// Check whether anything exists at `path`
    async fn exists(&self, path: &StoragePath) -> Result<bool>;

    /// Delete whatever exists at `path`
    ///
    /// With `recursive` set, directories (or S3 prefixes) are removed together
    /// with everything under them. A missing path is reported as
    /// [`Removal::NotFound`] rather than an error.
    async fn remove(&self, path: &StoragePath, recursive: bool) -> Result<Removal>;
}

/// Storage backed by the real DBFS, local, and S3 backends
#[derive(Debug, Clone, Default)]
pub struct Storage {
    dbfs: Option<DbfsClient>,
}

impl Storage {
    /// Storage without DBFS credentials; DBFS paths will be rejected
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a DBFS REST client used for `dbfs:` paths
    pub fn with_dbfs(mut self, client: DbfsClient) -> Self {
        self.dbfs = Some(client);
        self
    }

    fn dbfs(&self) -> Result<&DbfsClient> {
        self.dbfs.as_ref().ok_or_else(|| {
            anyhow::anyhow!(
                "No DBFS client configured; set DATABRICKS_HOST and DATABRICKS_TOKEN to access DBFS paths"
            )
        })
    }
}

#[async_trait]
impl SourceStorage for Storage {
    async fn open(&self, path: &StoragePath) -> Result<Box<dyn std::io::Read + Send>> {
        let bytes = match path {
            StoragePath::Dbfs(p) => self.dbfs()?.read(p).await?,
            StoragePath::Local(p) => local::read(p).await?,
            StoragePath::S3 { bucket, key } => S3Client::new().await?.read(bucket, key).await?,
        };
        tracing::debug!("Read {} bytes from: {}", bytes.len(), path);
        Ok(Box::new(std::io::Cursor::new(bytes)))
    }

    async fn exists(&self, path: &StoragePath) -> Result<bool> {
        match path {
            StoragePath::Dbfs(p) => Ok(self.dbfs()?.get_status(p).await?.is_some()),
            StoragePath::Local(p) => local::exists(p).await,
            StoragePath::S3 { bucket, key } => S3Client::new().await?.exists(bucket, key).await,
        }
    }

    async fn remove(&self, path: &StoragePath, recursive: bool) -> Result<Removal> {
        match path {
            StoragePath::Dbfs(p) => {
                let client = self.dbfs()?;
                if client.get_status(p).await?.is_none() {
                    return Ok(Removal::NotFound);
                }
                client.delete(p, recursive).await?;
                Ok(Removal::Deleted)
            }
            StoragePath::Local(p) => local::remove(p, recursive).await,
            StoragePath::S3 { bucket, key } => {
                S3Client::new()
                    .await?
                    .remove(bucket, key, recursive)
                    .await
            }
        }
    }
}

/// Parse S3 URI in the format: s3://bucket/key/to/file
pub fn parse_s3_uri(uri: &str) -> Result<(String, String), StoragePathError> {
    let rest = uri
        .strip_prefix("s3://")
        .or_else(|| uri.strip_prefix("s3a://"))
        .ok_or_else(|| StoragePathError::InvalidS3(uri.to_string()))?;

    match rest.split_once('/') {
        Some((bucket, key)) if !bucket.is_empty() && !key.trim_matches('/').is_empty() => {
            Ok((bucket.to_string(), key.to_string()))
        }
        _ => Err(StoragePathError::InvalidS3(uri.to_string())),
    }
}
