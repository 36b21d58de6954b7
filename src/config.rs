use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    /// Maximum request body size for page creation, in bytes
    pub max_upload_size: u64,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Json,
    Redb,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub backend: StoreBackend,
    /// JSON document holding every page record
    pub db_file: PathBuf,
    /// Directory for the redb backend
    pub data_dir: PathBuf,
    /// Public asset root; uploads land in `uploads/` below it
    pub public_dir: PathBuf,
}

pub const DEFAULT_PORT: u16 = 3000;

/// Subdirectory of the public root that receives uploaded images.
pub const UPLOADS_SUBDIR: &str = "uploads";

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Json,
            db_file: PathBuf::from("pages.json"),
            data_dir: PathBuf::from("./data"),
            public_dir: PathBuf::from("./public"),
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Host used in share links when a request carries no `Host` header.
    pub fn advertised_host(&self) -> String {
        match self.host.as_str() {
            "0.0.0.0" | "::" | "[::]" => format!("localhost:{}", self.port),
            host => format!("{host}:{}", self.port),
        }
    }
}

impl StorageConfig {
    pub fn uploads_dir(&self) -> PathBuf {
        self.public_dir.join(UPLOADS_SUBDIR)
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let port = match std::env::var("PORT") {
            Ok(raw) => raw.trim().parse::<u16>().map_err(|e| {
                ConfigError::ValidationError(format!("PORT must be a port number, got '{raw}': {e}"))
            })?,
            Err(_) => DEFAULT_PORT,
        };

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let backend = match std::env::var("STORE_BACKEND")
            .unwrap_or_else(|_| "json".to_string())
            .to_lowercase()
            .as_str()
        {
            "json" => StoreBackend::Json,
            "redb" => StoreBackend::Redb,
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "STORE_BACKEND must be 'json' or 'redb', got '{other}'"
                )))
            }
        };

        let db_file = std::env::var("DB_FILE").unwrap_or_else(|_| "pages.json".to_string());
        let data_dir = std::env::var("DATA_DIR").unwrap_or_else(|_| "./data".to_string());
        let public_dir = std::env::var("PUBLIC_DIR").unwrap_or_else(|_| "./public".to_string());

        let max_upload_size = std::env::var("MAX_UPLOAD_SIZE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(10 * 1024 * 1024); // 10MB

        let config = Config {
            server: ServerConfig { host, port },
            storage: StorageConfig {
                backend,
                db_file: PathBuf::from(db_file),
                data_dir: PathBuf::from(data_dir),
                public_dir: PathBuf::from(public_dir),
            },
            max_upload_size,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.host.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "HOST cannot be empty".to_string(),
            ));
        }

        if self.storage.backend == StoreBackend::Json
            && self.storage.db_file.as_os_str().is_empty()
        {
            return Err(ConfigError::ValidationError(
                "DB_FILE cannot be empty when STORE_BACKEND=json".to_string(),
            ));
        }

        if self.max_upload_size == 0 {
            tracing::warn!("MAX_UPLOAD_SIZE is 0; every page creation request will be rejected");
        }

        Ok(())
    }
}
