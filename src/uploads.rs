//! Upload Handler: stores at most one image per submission and hands back its public path.

use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use thiserror::Error;

use crate::config::UPLOADS_SUBDIR;
use crate::object_store::{ObjectStore, ObjectStoreError};

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Failed to store upload {key}: {source}")]
    StorageWrite {
        key: String,
        #[source]
        source: ObjectStoreError,
    },
}

/// An image file received with a create submission.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub file_name: String,
    pub data: Bytes,
}

impl UploadedImage {
    /// Browsers send a part with an empty file name when no file was chosen.
    /// A named file with no bytes is still a file.
    pub fn is_empty(&self) -> bool {
        self.file_name.is_empty()
    }
}

#[derive(Clone)]
pub struct UploadHandler {
    store: Arc<dyn ObjectStore>,
}

impl UploadHandler {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// Store the image if one was submitted.
    ///
    /// Returns the path the asset is served under (`/uploads/{millis}{ext}`),
    /// or `None` when nothing was uploaded.
    pub async fn store(&self, image: Option<UploadedImage>) -> Result<Option<String>, UploadError> {
        let Some(image) = image.filter(|i| !i.is_empty()) else {
            return Ok(None);
        };

        let extension = original_extension(&image.file_name);
        let key = self.claim_key(&extension, image.data).await?;

        tracing::debug!(upload_key = %key, original = %image.file_name, "Stored upload");
        Ok(Some(public_path(&key)))
    }

    /// Best-effort removal of an upload by its public path.
    pub async fn discard(&self, public: &str) {
        let Some(key) = key_from_public_path(public) else {
            return;
        };
        if let Err(e) = self.store.delete(key).await {
            tracing::warn!(upload_key = %key, error = %e, "Failed to remove orphaned upload");
        }
    }

    /// Write `data` under `{epoch-millis}{ext}`, stepping the millisecond
    /// value forward past names already taken.
    async fn claim_key(&self, extension: &str, data: Bytes) -> Result<String, UploadError> {
        let mut millis = Utc::now().timestamp_millis();
        loop {
            let key = format!("{millis}{extension}");
            match self.store.put_new(&key, data.clone()).await {
                Ok(()) => return Ok(key),
                Err(ObjectStoreError::AlreadyExists(_)) => millis += 1,
                Err(source) => return Err(UploadError::StorageWrite { key, source }),
            }
        }
    }
}

/// Final extension of the client's file name including the dot, or empty.
pub fn original_extension(file_name: &str) -> String {
    // Clients may send full paths; only the last segment matters.
    let base = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
    Path::new(base)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}

pub fn public_path(key: &str) -> String {
    format!("/{UPLOADS_SUBDIR}/{key}")
}

fn key_from_public_path(public: &str) -> Option<&str> {
    public
        .strip_prefix('/')
        .and_then(|p| p.strip_prefix(UPLOADS_SUBDIR))
        .and_then(|p| p.strip_prefix('/'))
}
