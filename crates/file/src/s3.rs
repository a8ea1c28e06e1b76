//! S3 backend with recursive prefix removal

use crate::Removal;
use anyhow::{Context, Result};
use aws_config::BehaviorVersion;

/// S3 client for reading and removing export sources
///
/// Credentials and region come from the default AWS provider chain.
pub struct S3Client {
    client: aws_sdk_s3::Client,
}

impl S3Client {
    /// Create a new S3 client from AWS config
    pub async fn new() -> Result<Self> {
        let sdk_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
        let client = aws_sdk_s3::Client::new(&sdk_config);
        Ok(Self { client })
    }

    /// Fetch an object fully into memory
    pub async fn read(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .with_context(|| format!("Failed to fetch object from S3: s3://{bucket}/{key}"))?;

        let body = response
            .body
            .collect()
            .await
            .with_context(|| format!("Failed to read object body from S3: s3://{bucket}/{key}"))?;

        Ok(body.into_bytes().to_vec())
    }

    /// Check whether the object, or anything under `key/`, exists
    pub async fn exists(&self, bucket: &str, key: &str) -> Result<bool> {
        let key = key.trim_end_matches('/');
        if self.object_exists(bucket, key).await? {
            return Ok(true);
        }
        Ok(!self.list_keys(bucket, &format!("{key}/"), Some(1)).await?.is_empty())
    }

    /// Delete the object at `key` and, when recursive, every object under `key/`
    ///
    /// S3 has no directories, so a non-recursive remove of a key that only
    /// exists as a prefix is an error.
    pub async fn remove(&self, bucket: &str, key: &str, recursive: bool) -> Result<Removal> {
        let key = key.trim_end_matches('/');
        let mut targets = Vec::new();

        if self.object_exists(bucket, key).await? {
            targets.push(key.to_string());
        }

        let prefix = format!("{key}/");
        if recursive {
            targets.extend(self.list_keys(bucket, &prefix, None).await?);
        } else if targets.is_empty()
            && !self.list_keys(bucket, &prefix, Some(1)).await?.is_empty()
        {
            anyhow::bail!(
                "s3://{bucket}/{key} is a non-empty prefix; a recursive remove is required"
            );
        }

        if targets.is_empty() {
            tracing::debug!("Nothing to remove at: s3://{}/{}", bucket, key);
            return Ok(Removal::NotFound);
        }

        for target in &targets {
            self.client
                .delete_object()
                .bucket(bucket)
                .key(target)
                .send()
                .await
                .with_context(|| format!("Failed to delete S3 object: s3://{bucket}/{target}"))?;
        }

        tracing::debug!(
            "Removed {} objects under: s3://{}/{}",
            targets.len(),
            bucket,
            key
        );

        Ok(Removal::Deleted)
    }

    async fn object_exists(&self, bucket: &str, key: &str) -> Result<bool> {
        match self.client.head_object().bucket(bucket).key(key).send().await {
            Ok(_) => Ok(true),
            Err(err) => {
                let service_error = err.into_service_error();
                if service_error.is_not_found() {
                    Ok(false)
                } else {
                    Err(service_error)
                        .with_context(|| format!("Failed to stat S3 object: s3://{bucket}/{key}"))
                }
            }
        }
    }

    /// List every key under a prefix (recursive), stopping early at `limit`
    async fn list_keys(
        &self,
        bucket: &str,
        prefix: &str,
        limit: Option<usize>,
    ) -> Result<Vec<String>> {
        let mut results = Vec::new();
        let mut continuation_token: Option<String> = None;

        loop {
            let mut request = self.client.list_objects_v2().bucket(bucket).prefix(prefix);

            if let Some(token) = &continuation_token {
                request = request.continuation_token(token);
            }

            let response = request
                .send()
                .await
                .with_context(|| format!("Failed to list S3 prefix: s3://{bucket}/{prefix}"))?;

            if let Some(contents) = response.contents {
                for object in contents {
                    if let Some(key) = object.key {
                        results.push(key);
                        if limit.is_some_and(|limit| results.len() >= limit) {
                            return Ok(results);
                        }
                    }
                }
            }

            // Handle pagination
            if response.is_truncated == Some(true) {
                continuation_token = response.next_continuation_token;
            } else {
                break;
            }
        }

        Ok(results)
    }
}
