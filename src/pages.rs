//! Page Service: creates mini-pages and serves them while counting views.

use std::sync::Arc;

use chrono::{SubsecRound, Utc};
use serde::Deserialize;
use thiserror::Error;

use crate::qr::{EncodingError, QrEncoder};
use crate::storage::{PageRecord, RecordStore, StoreError};
use crate::uploads::{UploadError, UploadHandler, UploadedImage};

#[derive(Debug, Error)]
pub enum PageError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Upload(#[from] UploadError),
    #[error(transparent)]
    Encoding(#[from] EncodingError),
}

/// The text fields of the creation form. Missing fields are empty strings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub theme: String,
}

/// Scheme and host the creating request arrived on.
#[derive(Debug, Clone)]
pub struct Origin {
    pub scheme: String,
    pub host: String,
}

impl Origin {
    pub fn new(scheme: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            host: host.into(),
        }
    }

    pub fn page_url(&self, id: &str) -> String {
        format!("{}://{}/page/{}", self.scheme, self.host, id)
    }
}

#[derive(Debug, Clone)]
pub struct CreatedPage {
    pub id: String,
    pub share_url: String,
    /// `data:` URL of the QR code for `share_url`
    pub qr_image: String,
    pub record: PageRecord,
}

#[derive(Clone)]
pub struct PageService {
    store: Arc<dyn RecordStore>,
    uploads: UploadHandler,
    qr: Arc<dyn QrEncoder>,
}

impl PageService {
    pub fn new(store: Arc<dyn RecordStore>, uploads: UploadHandler, qr: Arc<dyn QrEncoder>) -> Self {
        Self { store, uploads, qr }
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    pub async fn create_page(
        &self,
        form: PageForm,
        image: Option<UploadedImage>,
        origin: &Origin,
    ) -> Result<CreatedPage, PageError> {
        let id = uuid::Uuid::new_v4().to_string();

        let image = self.uploads.store(image).await?;

        let record = PageRecord {
            id: id.clone(),
            title: form.title,
            author: form.author,
            message: form.message,
            theme: form.theme,
            image,
            views: 0,
            // Stored with millisecond precision
            created_at: Utc::now().trunc_subsecs(3),
        };

        if let Err(e) = self.store.append_and_save(&record).await {
            if let Some(ref path) = record.image {
                self.uploads.discard(path).await;
            }
            return Err(e.into());
        }

        let share_url = origin.page_url(&id);
        let qr_image = self.qr.encode(&share_url)?;

        tracing::info!(page_id = %id, has_image = record.image.is_some(), "Created page");

        Ok(CreatedPage {
            id,
            share_url,
            qr_image,
            record,
        })
    }

    /// Look up a page and count the visit.
    ///
    /// Returns `Ok(None)` without touching the store when no record matches.
    /// The returned record carries the incremented view count.
    pub async fn view_page(&self, id: &str) -> Result<Option<PageRecord>, PageError> {
        let mut pages = self.store.load_all().await?;

        let Some(index) = pages.iter().position(|p| p.id == id) else {
            return Ok(None);
        };

        pages[index].views += 1;
        let page = pages[index].clone();
        self.store.replace_all(&pages).await?;

        tracing::debug!(page_id = %id, views = page.views, "Counted page view");
        Ok(Some(page))
    }
}
