use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::debug;

use super::auth::TokenProvider;
use crate::store::ObjectStore;

/// Cloud Storage bucket behind Firebase Storage
pub struct FirebaseStorage {
    base_url: String,
    bucket: String,
    http: reqwest::Client,
    tokens: Arc<TokenProvider>,
}

impl FirebaseStorage {
    pub fn new(
        base_url: impl Into<String>,
        bucket: impl Into<String>,
        http: reqwest::Client,
        tokens: Arc<TokenProvider>,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            bucket: bucket.into(),
            http,
            tokens,
        }
    }

    /// Media upload endpoint; the object name goes in the query string
    pub fn upload_url(&self) -> String {
        format!("{}/upload/storage/v1/b/{}/o", self.base_url, self.bucket)
    }

    /// Object resource URL; the whole name is one encoded path segment
    pub fn object_url(&self, key: &str) -> String {
        format!(
            "{}/storage/v1/b/{}/o/{}",
            self.base_url,
            self.bucket,
            urlencoding::encode(key)
        )
    }
}

#[async_trait::async_trait]
impl ObjectStore for FirebaseStorage {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<()> {
        let token = self.tokens.token().await?;

        debug!("PUT gs://{}/{} ({} bytes)", self.bucket, key, bytes.len());

        self.http
            .post(self.upload_url())
            .query(&[("uploadType", "media"), ("name", key)])
            .bearer_auth(token)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await
            .with_context(|| format!("Failed to upload {}", key))?
            .error_for_status()
            .with_context(|| format!("Storage rejected upload of {}", key))?;

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let token = self.tokens.token().await?;

        debug!("DELETE gs://{}/{}", self.bucket, key);

        self.http
            .delete(self.object_url(key))
            .bearer_auth(token)
            .send()
            .await
            .with_context(|| format!("Failed to delete {}", key))?
            .error_for_status()
            .with_context(|| format!("Storage rejected delete of {}", key))?;

        Ok(())
    }

    fn name(&self) -> &str {
        "firebase-storage"
    }
}
