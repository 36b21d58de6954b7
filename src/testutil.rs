//! Shared test helpers for router tests.

use std::sync::Arc;

use crate::config::{Config, ServerConfig, StorageConfig, StoreBackend};
use crate::object_store::{LocalStore, ObjectStore};
use crate::pages::PageService;
use crate::qr::SvgQrEncoder;
use crate::storage::JsonFileStore;
use crate::uploads::UploadHandler;
use crate::AppState;

fn test_config(temp_dir: &tempfile::TempDir) -> Config {
    let storage = StorageConfig {
        backend: StoreBackend::Json,
        db_file: temp_dir.path().join("pages.json"),
        data_dir: temp_dir.path().join("data"),
        public_dir: temp_dir.path().join("public"),
    };

    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        max_upload_size: 10 * 1024 * 1024, // 10MB for tests
        storage,
    }
}

/// Create a test AppState with a temporary JSON store and local upload directory.
pub fn test_state(temp_dir: &tempfile::TempDir) -> Arc<AppState> {
    let uploads_dir = test_config(temp_dir).storage.uploads_dir();
    let object_store =
        Arc::new(LocalStore::new(uploads_dir).expect("Failed to create test object store"));
    test_state_with_uploads(temp_dir, object_store)
}

/// Like [`test_state`], but uploads go to `object_store`.
pub fn test_state_with_uploads(
    temp_dir: &tempfile::TempDir,
    object_store: Arc<dyn ObjectStore>,
) -> Arc<AppState> {
    let config = test_config(temp_dir);
    let pages = PageService::new(
        Arc::new(JsonFileStore::new(&config.storage.db_file)),
        UploadHandler::new(object_store),
        Arc::new(SvgQrEncoder::default()),
    );

    Arc::new(AppState { config, pages })
}
