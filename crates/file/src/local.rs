//! Local filesystem backend

use crate::Removal;
use anyhow::{Context, Result};
use std::io::ErrorKind;
use std::path::Path;

/// Read the entire file into memory
///
/// The whole file is read up front so callers can parse it synchronously
/// from inside the async runtime.
pub async fn read(path: &Path) -> Result<Vec<u8>> {
    tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read file: {}", path.display()))
}

pub async fn exists(path: &Path) -> Result<bool> {
    match tokio::fs::symlink_metadata(path).await {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => {
            Err(e).with_context(|| format!("Failed to get metadata for: {}", path.display()))
        }
    }
}

/// Remove a file or directory
///
/// Directories require `recursive` unless they are empty.
pub async fn remove(path: &Path, recursive: bool) -> Result<Removal> {
    let metadata = match tokio::fs::symlink_metadata(path).await {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!("Nothing to remove at: {}", path.display());
            return Ok(Removal::NotFound);
        }
        Err(e) => {
            return Err(e)
                .with_context(|| format!("Failed to get metadata for: {}", path.display()));
        }
    };

    let result = if metadata.is_dir() {
        if recursive {
            tokio::fs::remove_dir_all(path).await
        } else {
            tokio::fs::remove_dir(path).await
        }
    } else {
        tokio::fs::remove_file(path).await
    };

    match result {
        Ok(()) => {
            tracing::debug!("Removed: {}", path.display());
            Ok(Removal::Deleted)
        }
        // Lost a race with another remover
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(Removal::NotFound),
        Err(e) => Err(e).with_context(|| format!("Failed to remove: {}", path.display())),
    }
}
