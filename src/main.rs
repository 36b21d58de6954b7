use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use qr_snap::{
    api,
    config::{Config, StoreBackend},
    object_store as obj,
    pages::PageService,
    qr::SvgQrEncoder,
    storage::{JsonFileStore, RecordStore, RedbStore},
    uploads::UploadHandler,
    AppState,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());

    let log_format = std::env::var("LOG_FORMAT").unwrap_or_default();
    match log_format.to_lowercase().as_str() {
        "gcp" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_stackdriver::layer())
                .init();
        }
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_target(true)
                        .with_span_list(false),
                )
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    info!(version = env!("CARGO_PKG_VERSION"), "qr-snap starting");

    let config = Config::load()?;

    let store: Arc<dyn RecordStore> = match config.storage.backend {
        StoreBackend::Json => {
            info!(
                "Using JSON record store at: {}",
                config.storage.db_file.display()
            );
            Arc::new(JsonFileStore::new(&config.storage.db_file))
        }
        StoreBackend::Redb => {
            let store = RedbStore::open(&config.storage.data_dir)?;
            info!(
                "Using redb record store in: {}",
                config.storage.data_dir.display()
            );
            Arc::new(store)
        }
    };

    let uploads_dir = config.storage.uploads_dir();
    let object_store: Arc<dyn obj::ObjectStore> = Arc::new(obj::LocalStore::new(&uploads_dir)?);
    info!("Storing uploads in: {}", uploads_dir.display());

    let pages = PageService::new(
        store,
        UploadHandler::new(object_store),
        Arc::new(SvgQrEncoder::default()),
    );

    let state = Arc::new(AppState {
        config: config.clone(),
        pages,
    });

    let app = api::create_router(Arc::clone(&state));
    let bind_address = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    info!("Server listening on port {}", config.server.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, draining connections");
}
