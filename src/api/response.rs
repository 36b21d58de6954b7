use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use serde::de::DeserializeOwned;

use super::views;

// ============================================================================
// Unified error type for handlers
// ============================================================================

/// Errors surfaced by the HTTP layer.
///
/// Server errors carry a generic message only; the cause is logged by the
/// handler before it builds one.
#[derive(Debug)]
pub enum ApiError {
    /// No page matches; rendered with the landing template.
    PageNotFound,
    Fail(StatusCode, String),
    Error(StatusCode, String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::PageNotFound => (
                StatusCode::NOT_FOUND,
                Html(views::index(views::NOT_FOUND_TITLE)),
            )
                .into_response(),
            ApiError::Fail(code, msg) | ApiError::Error(code, msg) => (code, msg).into_response(),
        }
    }
}

impl ApiError {
    pub fn page_not_found() -> Self {
        ApiError::PageNotFound
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::Fail(StatusCode::BAD_REQUEST, message.into())
    }

    pub fn payload_too_large(message: impl Into<String>) -> Self {
        ApiError::Fail(StatusCode::PAYLOAD_TOO_LARGE, message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::Error(StatusCode::INTERNAL_SERVER_ERROR, message.into())
    }
}

// ============================================================================
// Custom extractors
// ============================================================================

/// Form extractor for `application/x-www-form-urlencoded` bodies.
///
/// Decodes with `serde_qs`, so nested keys such as `a[b]=c` are understood.
pub struct AppForm<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequest<S> for AppForm<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, ApiError> {
        let body = Bytes::from_request(req, state).await.map_err(|rejection| {
            if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                ApiError::payload_too_large("Request body is too large")
            } else {
                ApiError::bad_request("Failed to read request body")
            }
        })?;

        let text = std::str::from_utf8(&body)
            .map_err(|_| ApiError::bad_request("Form body is not valid UTF-8"))?;

        serde_qs::from_str(text)
            .map(AppForm)
            .map_err(|e| ApiError::bad_request(format!("Invalid form data: {e}")))
    }
}
