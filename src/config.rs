/// Configuration management for the Country Explorer API
use crate::error::{ApiError, ApiResult};
use serde::{Deserialize, Serialize};
use std::env;

/// Main server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub service: ServiceConfig,
    pub storage: StorageConfig,
    pub countries: CountriesConfig,
    pub media: Option<MediaConfig>,
    pub logging: LoggingConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub hostname: String,
    pub port: u16,
    pub version: String,
    /// Maximum request body size in bytes (bounds image uploads)
    pub upload_limit: usize,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub database_url: String,
    pub max_connections: u32,
}

/// Upstream country API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountriesConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

/// Cloudinary credentials
#[derive(Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    pub folder: Option<String>,
    pub api_base_url: String,
}

impl std::fmt::Debug for MediaConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaConfig")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .field("folder", &self.folder)
            .field("api_base_url", &self.api_base_url)
            .finish()
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> ApiResult<Self> {
        dotenv::dotenv().ok();

        let hostname = env::var("EXPLORER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("EXPLORER_PORT")
            .unwrap_or_else(|_| "8000".to_string())
            .parse()
            .map_err(|_| ApiError::Config("Invalid port number".to_string()))?;
        let version = env!("CARGO_PKG_VERSION").to_string();
        let upload_limit = env::var("EXPLORER_UPLOAD_LIMIT")
            .unwrap_or_else(|_| "10485760".to_string())
            .parse()
            .unwrap_or(10 * 1024 * 1024);

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://./data/favorites.sqlite".to_string());
        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "5".to_string())
            .parse()
            .unwrap_or(5);

        let countries_url = env::var("COUNTRIES_API_URL")
            .unwrap_or_else(|_| "https://restcountries.com".to_string());
        let countries_timeout = env::var("COUNTRIES_API_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .unwrap_or(10);

        let media = media_from_parts(
            env::var("CLOUD_NAME").ok(),
            env::var("API_KEY").ok(),
            env::var("API_SECRET").ok(),
        )?
        .map(|mut media| {
            media.folder = env::var("CLOUDINARY_FOLDER").ok().filter(|s| !s.is_empty());
            if let Ok(base) = env::var("CLOUDINARY_API_URL") {
                media.api_base_url = base;
            }
            media
        });

        let level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let json = env::var("LOG_FORMAT")
            .map(|s| s.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        Ok(ServerConfig {
            service: ServiceConfig {
                hostname,
                port,
                version,
                upload_limit,
            },
            storage: StorageConfig {
                database_url,
                max_connections,
            },
            countries: CountriesConfig {
                base_url: countries_url,
                timeout_secs: countries_timeout,
                user_agent: format!("country-explorer/{}", env!("CARGO_PKG_VERSION")),
            },
            media,
            logging: LoggingConfig { level, json },
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> ApiResult<()> {
        if self.service.hostname.is_empty() {
            return Err(ApiError::Config("Hostname cannot be empty".to_string()));
        }

        if self.service.upload_limit == 0 {
            return Err(ApiError::Config("Upload limit must be positive".to_string()));
        }

        if self.storage.max_connections == 0 {
            return Err(ApiError::Config(
                "Database needs at least one connection".to_string(),
            ));
        }

        if !is_http_url(&self.countries.base_url) {
            return Err(ApiError::Config(format!(
                "Country API URL must be http(s): {}",
                self.countries.base_url
            )));
        }

        if let Some(media) = &self.media {
            if !is_http_url(&media.api_base_url) {
                return Err(ApiError::Config(format!(
                    "Cloudinary API URL must be http(s): {}",
                    media.api_base_url
                )));
            }
        }

        Ok(())
    }
}

/// Media credentials come as a triple; all or nothing
fn media_from_parts(
    cloud_name: Option<String>,
    api_key: Option<String>,
    api_secret: Option<String>,
) -> ApiResult<Option<MediaConfig>> {
    let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());

    match (non_empty(cloud_name), non_empty(api_key), non_empty(api_secret)) {
        (Some(cloud_name), Some(api_key), Some(api_secret)) => Ok(Some(MediaConfig {
            cloud_name,
            api_key,
            api_secret,
            folder: None,
            api_base_url: "https://api.cloudinary.com".to_string(),
        })),
        (None, None, None) => Ok(None),
        _ => Err(ApiError::Config(
            "CLOUD_NAME, API_KEY and API_SECRET must be set together".to_string(),
        )),
    }
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}
