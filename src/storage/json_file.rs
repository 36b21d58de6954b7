use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::models::PageRecord;
use super::{RecordStore, StoreError};

/// Record store backed by a single pretty-printed JSON array.
///
/// Every write rewrites the whole document. The new content goes to a
/// sibling temp file first and is renamed over the document, so readers
/// never observe a half-written array. Each write gets its own temp file so
/// concurrent writers never share one.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(format!(".{}.tmp", uuid::Uuid::new_v4().simple()));
        self.path.with_file_name(name)
    }

    async fn write_document(&self, records: &[PageRecord]) -> Result<(), StoreError> {
        let document = serde_json::to_string_pretty(records)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let temp = self.temp_path();
        let written = match tokio::fs::write(&temp, document.as_bytes()).await {
            Ok(()) => tokio::fs::rename(&temp, &self.path).await,
            Err(e) => Err(e),
        };
        if let Err(e) = written {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(e.into());
        }

        tracing::debug!(path = %self.path.display(), records = records.len(), "Wrote store document");
        Ok(())
    }
}

#[async_trait]
impl RecordStore for JsonFileStore {
    async fn load_all(&self) -> Result<Vec<PageRecord>, StoreError> {
        let data = match tokio::fs::read(&self.path).await {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        serde_json::from_slice(&data)
            .map_err(|e| StoreError::corrupt(self.path.display().to_string(), e))
    }

    async fn append_and_save(&self, record: &PageRecord) -> Result<(), StoreError> {
        let mut records = self.load_all().await?;
        records.push(record.clone());
        self.write_document(&records).await
    }

    async fn replace_all(&self, records: &[PageRecord]) -> Result<(), StoreError> {
        self.write_document(records).await
    }
}
