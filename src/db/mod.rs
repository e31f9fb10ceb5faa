//! Database module for finboard.
//!
//! Provides the sqlx connection pool, migration management, and the user and
//! refresh token repositories. Content repositories live next to their models in
//! `board` and `file`.

mod refresh_token;
mod repository;
mod schema;
mod user;

pub use refresh_token::{NewRefreshToken, RefreshToken, RefreshTokenRepository};
pub use repository::UserRepository;
pub use schema::MIGRATIONS;
pub use user::{NewUser, Role, User, UserUpdate};

#[cfg(all(feature = "sqlite", feature = "postgres"))]
compile_error!("features `sqlite` and `postgres` are mutually exclusive; use --no-default-features --features postgres");

#[cfg(feature = "sqlite")]
use std::path::Path;
#[cfg(feature = "sqlite")]
use std::str::FromStr;
#[cfg(feature = "sqlite")]
use std::time::Duration;

use tracing::{debug, info};

use crate::config::DatabaseConfig;
use crate::{FinboardError, Result};

/// Connection pool for the active backend.
#[cfg(feature = "sqlite")]
pub type DbPool = sqlx::SqlitePool;
/// Connection pool for the active backend.
#[cfg(feature = "postgres")]
pub type DbPool = sqlx::PgPool;

/// The active sqlx database driver.
#[cfg(feature = "sqlite")]
pub type DbBackend = sqlx::Sqlite;
/// The active sqlx database driver.
#[cfg(feature = "postgres")]
pub type DbBackend = sqlx::Postgres;

/// Transaction on the active backend.
pub type DbTransaction = sqlx::Transaction<'static, DbBackend>;

/// Database wrapper owning the connection pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: DbPool,
}

impl Database {
    /// Open the database described by the configuration and apply migrations.
    ///
    /// `url` wins over `path` when both are set.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        match &config.url {
            Some(url) => Self::open_url(url, config.max_connections).await,
            None => Self::open_path(config).await,
        }
    }

    #[cfg(feature = "sqlite")]
    async fn open_path(config: &DatabaseConfig) -> Result<Self> {
        Self::open(&config.path, config.max_connections).await
    }

    #[cfg(feature = "postgres")]
    async fn open_path(_config: &DatabaseConfig) -> Result<Self> {
        Err(FinboardError::Config(
            "database.url is required for the postgres backend".to_string(),
        ))
    }

    /// Open a SQLite database file, creating it and its parent directories if needed.
    #[cfg(feature = "sqlite")]
    pub async fn open(path: impl AsRef<Path>, max_connections: u32) -> Result<Self> {
        use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};

        let path = path.as_ref();
        info!("Opening database at {:?}", path);

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// Open a database from a connection URL.
    #[cfg(feature = "sqlite")]
    pub async fn open_url(url: &str, max_connections: u32) -> Result<Self> {
        use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

        info!("Opening database at {}", url);
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// Open a database from a connection URL.
    #[cfg(feature = "postgres")]
    pub async fn open_url(url: &str, max_connections: u32) -> Result<Self> {
        use sqlx::postgres::PgPoolOptions;

        info!("Connecting to PostgreSQL");
        let pool = PgPoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect(url)
            .await?;

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// Open an in-memory database for testing.
    ///
    /// Every SQLite in-memory connection is its own database, so the pool is pinned
    /// to one connection that never expires.
    #[cfg(feature = "sqlite")]
    pub async fn open_in_memory() -> Result<Self> {
        use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

        debug!("Opening in-memory database");
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// Begin a new transaction.
    pub async fn begin(&self) -> Result<DbTransaction> {
        self.pool
            .begin()
            .await
            .map_err(|e| FinboardError::Database(e.to_string()))
    }

    /// Get the current schema version (0 for a fresh database).
    pub async fn schema_version(&self) -> Result<i64> {
        let version: Option<i64> = sqlx::query_scalar("SELECT MAX(version) FROM schema_version")
            .fetch_one(&self.pool)
            .await?;
        Ok(version.unwrap_or(0))
    }

    /// Apply pending migrations, each in its own transaction.
    async fn migrate(&self) -> Result<()> {
        sqlx::raw_sql(
            "CREATE TABLE IF NOT EXISTS schema_version (
                version    BIGINT PRIMARY KEY,
                applied_at TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        let current = self.schema_version().await?;

        for (index, migration) in MIGRATIONS.iter().enumerate() {
            let version = (index + 1) as i64;
            if version <= current {
                continue;
            }

            debug!("Applying migration v{}", version);
            let mut tx = self.begin().await?;
            sqlx::raw_sql(migration).execute(&mut *tx).await?;
            sqlx::query("INSERT INTO schema_version (version, applied_at) VALUES ($1, $2)")
                .bind(version)
                .bind(crate::datetime::now_db_string())
                .execute(&mut *tx)
                .await?;
            tx.commit().await?;
        }

        let version = self.schema_version().await?;
        if version > current {
            info!("Database migrated from v{} to v{}", current, version);
        }

        Ok(())
    }
}
