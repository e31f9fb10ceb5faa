//! HTTP server for finboard.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;

use crate::config::Config;
use crate::db::RefreshTokenRepository;
use crate::file::FileStorage;
use crate::{Database, FinboardError, Result};

use super::handlers::{AppState, SharedDatabase};
use super::middleware::{JwtState, RateLimitState};
use super::openapi::create_swagger_router;
use super::router::{create_health_router, create_router};

/// Interval between refresh token cleanups.
const CLEANUP_INTERVAL_SECS: u64 = 3600;

/// Web server for the API.
pub struct WebServer {
    addr: SocketAddr,
    app_state: Arc<AppState>,
    jwt_state: Arc<JwtState>,
    rate_limit: Arc<RateLimitState>,
    cors_origins: Vec<String>,
}

impl WebServer {
    /// Create a new web server.
    ///
    /// File endpoints answer with an internal error when the storage directory
    /// cannot be created.
    pub fn new(config: &Config, db: SharedDatabase) -> Result<Self> {
        let addr = format!("{}:{}", config.server.host, config.server.port)
            .parse()
            .map_err(|e| FinboardError::Config(format!("invalid server address: {e}")))?;

        let mut app_state = AppState::new(
            db,
            &config.auth.jwt_secret,
            config.auth.jwt_access_token_expiry_secs,
            config.auth.jwt_refresh_token_expiry_days,
        );

        match FileStorage::new(&config.files.storage_path) {
            Ok(storage) => {
                app_state = app_state.with_file_storage(storage, config.files.max_upload_size_mb);
                tracing::info!("File storage initialized at: {}", config.files.storage_path);
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to initialize file storage: {}. File API will be disabled.",
                    e
                );
            }
        }

        Ok(Self {
            addr,
            app_state: Arc::new(app_state),
            jwt_state: Arc::new(JwtState::new(&config.auth.jwt_secret)),
            rate_limit: Arc::new(RateLimitState::new(
                config.server.login_rate_limit,
                config.server.api_rate_limit,
            )),
            cors_origins: config.server.cors_origins.clone(),
        })
    }

    /// Create a new web server from a raw Database.
    pub fn from_database(config: &Config, db: Database) -> Result<Self> {
        Self::new(config, Arc::new(db))
    }

    /// Get the server address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// The complete application: API, health check and API docs.
    pub fn router(&self) -> Router {
        create_router(
            self.app_state.clone(),
            self.jwt_state.clone(),
            self.rate_limit.clone(),
            &self.cors_origins,
        )
        .merge(create_health_router())
        .merge(create_swagger_router())
        .layer(CompressionLayer::new())
    }

    /// Start the token cleanup background task.
    ///
    /// Runs every hour and removes expired and revoked refresh tokens.
    fn start_token_cleanup_task(db: SharedDatabase) {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(CLEANUP_INTERVAL_SECS));

            // Skip the first immediate tick
            interval.tick().await;

            loop {
                interval.tick().await;

                match RefreshTokenRepository::new(db.pool()).cleanup_expired().await {
                    Ok(count) if count > 0 => {
                        tracing::info!(
                            deleted_count = count,
                            "Cleaned up expired/revoked refresh tokens"
                        );
                    }
                    Ok(_) => tracing::debug!("No expired refresh tokens to clean up"),
                    Err(e) => tracing::warn!(error = %e, "Failed to cleanup refresh tokens"),
                }
            }
        });
    }

    async fn bind(self) -> Result<(TcpListener, Router)> {
        let router = self.router();
        let listener = TcpListener::bind(self.addr).await?;

        Self::start_token_cleanup_task(self.app_state.db.clone());
        self.rate_limit.clone().start_cleanup_task();
        tracing::info!("Token cleanup task started (runs every hour)");

        Ok((listener, router))
    }

    /// Run the web server until it fails.
    pub async fn run(self) -> Result<()> {
        let (listener, router) = self.bind().await?;
        tracing::info!("Web server listening on http://{}", listener.local_addr()?);

        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await?;
        Ok(())
    }

    /// Run the server in the background and return the actual bound address.
    ///
    /// This is useful for testing when binding to port 0.
    pub async fn run_with_addr(self) -> Result<SocketAddr> {
        let (listener, router) = self.bind().await?;
        let local_addr = listener.local_addr()?;
        tracing::info!("Web server listening on http://{}", local_addr);

        tokio::spawn(async move {
            if let Err(e) = axum::serve(
                listener,
                router.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            {
                tracing::error!("Web server error: {}", e);
            }
        });

        Ok(local_addr)
    }
}
