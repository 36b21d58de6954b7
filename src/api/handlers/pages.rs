use axum::extract::multipart::{Field, MultipartError};
use axum::extract::{FromRequest, Multipart, Path, Request, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::Html;
use std::sync::Arc;

use crate::api::response::{ApiError, AppForm};
use crate::api::views;
use crate::pages::{Origin, PageForm};
use crate::uploads::UploadedImage;
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

/// A create-form submission, either multipart (with an optional image) or urlencoded.
#[derive(Debug)]
pub struct CreateSubmission {
    pub form: PageForm,
    pub image: Option<UploadedImage>,
}

#[axum::async_trait]
impl<S> FromRequest<S> for CreateSubmission
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, ApiError> {
        let is_multipart = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.to_ascii_lowercase().starts_with("multipart/form-data"))
            .unwrap_or(false);

        if !is_multipart {
            let AppForm(form) = AppForm::<PageForm>::from_request(req, state).await?;
            return Ok(CreateSubmission { form, image: None });
        }

        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| ApiError::bad_request(format!("Invalid multipart data: {}", e.body_text())))?;

        let mut form = PageForm::default();
        let mut image: Option<UploadedImage> = None;

        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let field_name = field.name().unwrap_or("").to_string();

            match field_name.as_str() {
                "title" => form.title = read_text(field).await?,
                "author" => form.author = read_text(field).await?,
                "message" => form.message = read_text(field).await?,
                "theme" => form.theme = read_text(field).await?,
                "image" => {
                    let file_name = field.file_name().unwrap_or("").to_string();
                    let data = field.bytes().await.map_err(multipart_error)?;
                    let candidate = UploadedImage { file_name, data };
                    // Only the first real file counts.
                    if image.is_none() && !candidate.is_empty() {
                        image = Some(candidate);
                    }
                }
                _ => {
                    tracing::debug!(field = %field_name, "Ignoring unknown form field");
                }
            }
        }

        Ok(CreateSubmission { form, image })
    }
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn index() -> Html<String> {
    Html(views::index(views::INDEX_TITLE))
}

pub async fn create_form() -> Html<String> {
    Html(views::create_form(views::CREATE_TITLE))
}

pub async fn create_page(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    submission: CreateSubmission,
) -> Result<Html<String>, ApiError> {
    let origin = request_origin(&headers, &state.config.server.advertised_host());

    let created = state
        .pages
        .create_page(submission.form, submission.image, &origin)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to create page");
            ApiError::internal("Error generating the page.")
        })?;

    Ok(Html(views::result(
        views::RESULT_TITLE,
        &created.share_url,
        &created.qr_image,
        &created.id,
    )))
}

pub async fn view_page(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Html<String>, ApiError> {
    let page = state
        .pages
        .view_page(&id)
        .await
        .map_err(|e| {
            tracing::error!(page_id = %id, error = %e, "Failed to load page");
            ApiError::internal("Error loading the page.")
        })?
        .ok_or_else(ApiError::page_not_found)?;

    Ok(Html(views::page(&page)))
}

// ============================================================================
// Helpers
// ============================================================================

async fn read_text(field: Field<'_>) -> Result<String, ApiError> {
    let name = field.name().unwrap_or("").to_string();
    field
        .text()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid {name}: {}", e.body_text())))
}

fn multipart_error(e: MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::payload_too_large("Upload exceeds the maximum request size")
    } else {
        ApiError::bad_request(format!("Invalid multipart data: {}", e.body_text()))
    }
}

/// Scheme and host the client used, as far as the request headers tell.
pub(crate) fn request_origin(headers: &HeaderMap, fallback_host: &str) -> Origin {
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_ascii_lowercase())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| "http".to_string());

    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| fallback_host.to_string());

    Origin::new(scheme, host)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_request_origin_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("snap.example.com"));
        headers.insert("x-forwarded-proto", HeaderValue::from_static("https, http"));

        let origin = request_origin(&headers, "localhost:3000");
        assert_eq!(origin.page_url("abc"), "https://snap.example.com/page/abc");
    }

    #[test]
    fn test_request_origin_fallback() {
        let origin = request_origin(&HeaderMap::new(), "localhost:3000");
        assert_eq!(origin.page_url("abc"), "http://localhost:3000/page/abc");
    }
}
