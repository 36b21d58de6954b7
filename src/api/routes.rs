use axum::{extract::DefaultBodyLimit, routing::get, Router};
use std::sync::Arc;
use tower_http::{services::ServeDir, trace::TraceLayer};

use super::handlers;
use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let upload_limit = state.config.max_upload_size as usize;
    let public_dir = state.config.storage.public_dir.clone();

    Router::new()
        // Pages
        .route("/", get(handlers::index))
        .route(
            "/create",
            get(handlers::create_form)
                .post(handlers::create_page)
                .layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/page/:id", get(handlers::view_page))
        // Internal
        .route("/_internal/health", get(handlers::health))
        // Public assets, uploads included
        .fallback_service(ServeDir::new(public_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    use std::sync::Arc;

    use async_trait::async_trait;
    use bytes::Bytes;

    use super::create_router;
    use crate::object_store::{ObjectStore, ObjectStoreError};
    use crate::testutil::{test_state, test_state_with_uploads};

    const BOUNDARY: &str = "qrsnapboundary";

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn multipart_body(fields: &[(&str, &str)], image: Option<(&str, &[u8])>) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
        if let Some((file_name, data)) = image {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn form_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/create")
            .header(header::HOST, "snap.test")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn multipart_request(body: Vec<u8>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/create")
            .header(header::HOST, "snap.test")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_landing_and_create_form() {
        let dir = tempfile::tempdir().unwrap();
        let app = create_router(test_state(&dir));

        let response = app.clone().oneshot(get("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains(r#"href="/create""#));

        let response = app.oneshot(get("/create")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains(r#"enctype="multipart/form-data""#));
        assert!(html.contains(r#"name="image""#));
    }

    #[tokio::test]
    async fn test_create_then_view_counts_visits() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        let app = create_router(state.clone());

        let response = app
            .clone()
            .oneshot(form_request("title=Hi&author=Bob&message=Hello&theme=blue"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;

        let pages = state.pages.store().load_all().await.unwrap();
        assert_eq!(pages.len(), 1);
        let page = &pages[0];
        assert_eq!(page.views, 0);
        assert_eq!(page.title, "Hi");
        assert_eq!(page.author, "Bob");
        assert_eq!(page.message, "Hello");
        assert_eq!(page.theme, "blue");
        assert_eq!(page.image, None);

        assert!(html.contains(&format!("http://snap.test/page/{}", page.id)));
        assert!(html.contains("data:image/svg+xml;base64,"));

        let uri = format!("/page/{}", page.id);
        let response = app.clone().oneshot(get(&uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("1 view"));
        assert!(html.contains("theme-blue"));
        assert!(!html.contains("<img"));

        let response = app.oneshot(get(&uri)).await.unwrap();
        assert!(body_text(response).await.contains("2 views"));

        let pages = state.pages.store().load_all().await.unwrap();
        assert_eq!(pages[0].views, 2);
    }

    #[tokio::test]
    async fn test_unknown_page_is_404_and_store_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        let app = create_router(state.clone());

        let response = app.oneshot(get("/page/does-not-exist")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(body_text(response).await.contains("Page not found"));

        assert!(!state.config.storage.db_file.exists());
    }

    #[tokio::test]
    async fn test_create_with_image_serves_upload() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        let app = create_router(state.clone());

        let png = b"\x89PNG\r\n\x1a\nnot really a png";
        let body = multipart_body(
            &[("title", "Cat"), ("author", "Ana"), ("message", "Meow"), ("theme", "green")],
            Some(("cat.png", &png[..])),
        );
        let response = app.clone().oneshot(multipart_request(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let pages = state.pages.store().load_all().await.unwrap();
        let image = pages[0].image.clone().expect("image should be stored");
        assert!(image.starts_with("/uploads/"));
        assert!(image.ends_with(".png"));

        let response = app.clone().oneshot(get(&image)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "image/png"
        );
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], &png[..]);

        let response = app
            .oneshot(get(&format!("/page/{}", pages[0].id)))
            .await
            .unwrap();
        assert!(body_text(response)
            .await
            .contains(&format!(r#"<img src="{image}""#)));
    }

    #[tokio::test]
    async fn test_empty_file_part_means_no_image() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        let app = create_router(state.clone());

        let body = multipart_body(&[("title", "Plain")], Some(("", &b""[..])));
        let response = app.oneshot(multipart_request(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let pages = state.pages.store().load_all().await.unwrap();
        assert_eq!(pages[0].image, None);
        assert_eq!(pages[0].author, "");
    }

    #[tokio::test]
    async fn test_missing_upload_is_404() {
        let dir = tempfile::tempdir().unwrap();
        let app = create_router(test_state(&dir));

        let response = app
            .clone()
            .oneshot(get("/uploads/123.png"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        // pages.json sits next to the public root, never below it
        let response = app
            .oneshot(get("/uploads/../../pages.json"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_public_assets_are_served() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        std::fs::write(
            state.config.storage.public_dir.join("style.css"),
            "body { color: red; }",
        )
        .unwrap();
        let app = create_router(state);

        let response = app.clone().oneshot(get("/style.css")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/css"
        );
        assert_eq!(body_text(response).await, "body { color: red; }");

        let head = Request::builder()
            .method("HEAD")
            .uri("/style.css")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(head).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.is_empty());
    }

    /// Refuses every write.
    struct FullDisk;

    #[async_trait]
    impl ObjectStore for FullDisk {
        async fn put_new(&self, _key: &str, _data: Bytes) -> Result<(), ObjectStoreError> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "no space left").into())
        }

        async fn get(&self, key: &str) -> Result<Bytes, ObjectStoreError> {
            Err(ObjectStoreError::NotFound(key.to_string()))
        }

        async fn delete(&self, _key: &str) -> Result<(), ObjectStoreError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_upload_failure_is_generic_500() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state_with_uploads(&dir, Arc::new(FullDisk));
        let app = create_router(state.clone());

        let body = multipart_body(&[("title", "Cat")], Some(("cat.png", &b"png"[..])));
        let response = app.oneshot(multipart_request(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_text(response).await, "Error generating the page.");

        assert!(state.pages.store().load_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_store_is_generic_500() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        std::fs::write(&state.config.storage.db_file, "{ not json").unwrap();
        let app = create_router(state);

        let response = app
            .oneshot(form_request("title=Hi&author=Bob&message=Hello&theme=blue"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_text(response).await, "Error generating the page.");
    }

    #[tokio::test]
    async fn test_health() {
        let dir = tempfile::tempdir().unwrap();
        let app = create_router(test_state(&dir));

        let response = app.oneshot(get("/_internal/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains(r#""status":"ok""#));
    }
}
