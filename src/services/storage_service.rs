use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::error::{Error, Result};

pub const APPLICATION_BUCKET: &str = "application-documents";

/// Object storage for application attachments.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Stores `data` under `path`. Existing objects are never overwritten.
    async fn upload(&self, path: &str, data: Bytes) -> Result<()>;

    /// Removes the object at `path`. Removing a missing object is not an error.
    async fn remove(&self, path: &str) -> Result<()>;

    /// URL under which the object at `path` can be downloaded.
    fn public_url(&self, path: &str) -> String;
}

/// Blob store on the local filesystem, served back through `/uploads`.
#[derive(Clone, Debug)]
pub struct LocalBlobStore {
    root: PathBuf,
    bucket: String,
    public_base_url: String,
}

impl LocalBlobStore {
    pub fn new(uploads_dir: impl Into<PathBuf>, bucket: &str, public_base_url: &str) -> Self {
        Self {
            root: uploads_dir.into(),
            bucket: bucket.to_string(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    fn resolve(&self, path: &str) -> Result<PathBuf> {
        let relative = Path::new(path);
        let safe = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if path.is_empty() || !safe {
            return Err(Error::BadRequest(format!("Invalid storage path: {}", path)));
        }
        Ok(self.root.join(&self.bucket).join(relative))
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn upload(&self, path: &str, data: Bytes) -> Result<()> {
        let target = self.resolve(path)?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut file = match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(Error::Conflict(format!("File already exists: {}", path)));
            }
            Err(e) => {
                tracing::error!(path, error = %e, "failed to create blob");
                return Err(e.into());
            }
        };
        file.write_all(&data).await?;
        file.flush().await?;

        tracing::debug!(path, bytes = data.len(), "blob stored");
        Ok(())
    }

    async fn remove(&self, path: &str) -> Result<()> {
        let target = self.resolve(path)?;
        match fs::remove_file(&target).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn public_url(&self, path: &str) -> String {
        match url::Url::parse(&self.public_base_url) {
            Ok(mut url) => {
                if let Ok(mut segments) = url.path_segments_mut() {
                    segments
                        .pop_if_empty()
                        .push("uploads")
                        .push(&self.bucket)
                        .extend(path.split('/'));
                }
                url.to_string()
            }
            Err(_) => format!("{}/uploads/{}/{}", self.public_base_url, self.bucket, path),
        }
    }
}
