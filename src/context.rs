/// Application context and dependency injection
use crate::{
    config::ServerConfig,
    countries::{CountrySource, RestCountriesClient},
    db,
    error::ApiResult,
    favorites::FavoriteStore,
    media::{CloudinaryMediaStore, MediaStore, UnconfiguredMediaStore},
};
use sqlx::SqlitePool;
use std::sync::Arc;

/// Application context holding all shared services
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<ServerConfig>,
    pub db: SqlitePool,
    pub favorites: FavoriteStore,
    pub countries: Arc<dyn CountrySource>,
    pub media: Arc<dyn MediaStore>,
}

impl AppContext {
    /// Create a new application context from configuration
    pub async fn new(config: ServerConfig) -> ApiResult<Self> {
        // Validate configuration
        config.validate()?;

        // Initialize favorites database
        let pool = db::create_pool(
            &config.storage.database_url,
            db::DatabaseOptions {
                max_connections: config.storage.max_connections,
                ..Default::default()
            },
        )
        .await?;
        db::run_migrations(&pool).await?;
        db::test_connection(&pool).await?;

        // Initialize upstream country client
        let countries: Arc<dyn CountrySource> =
            Arc::new(RestCountriesClient::new(&config.countries)?);

        // Initialize media host (optional - only if credentials configured)
        let media: Arc<dyn MediaStore> = match &config.media {
            Some(media_config) => Arc::new(CloudinaryMediaStore::new(media_config.clone())?),
            None => {
                tracing::warn!("Cloudinary credentials not set - image uploads disabled");
                Arc::new(UnconfiguredMediaStore)
            }
        };

        Ok(Self::from_parts(config, pool, countries, media))
    }

    /// Assemble a context from already-built collaborators
    pub fn from_parts(
        config: ServerConfig,
        pool: SqlitePool,
        countries: Arc<dyn CountrySource>,
        media: Arc<dyn MediaStore>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            favorites: FavoriteStore::new(pool.clone()),
            db: pool,
            countries,
            media,
        }
    }

    /// Address the server binds to
    pub fn bind_address(&self) -> String {
        format!(
            "{}:{}",
            self.config.service.hostname, self.config.service.port
        )
    }
}
