//! API handlers for the Web API.

pub mod admin;
pub mod auth;
pub mod comment;
pub mod file;
pub mod post;

pub use admin::*;
pub use auth::*;
pub use comment::*;
pub use file::*;
pub use post::*;

use jsonwebtoken::{encode, EncodingKey, Header};
use std::sync::Arc;

use crate::datetime::days_from_now_db_string;
use crate::db::{NewRefreshToken, RefreshTokenRepository, User};
use crate::file::FileStorage;
use crate::web::error::ApiError;
use crate::web::middleware::JwtClaims;
use crate::Database;

/// Database handle shared by every request.
pub type SharedDatabase = Arc<Database>;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: SharedDatabase,
    /// JWT encoding key.
    pub encoding_key: EncodingKey,
    /// Access token expiry in seconds.
    pub access_token_expiry: u64,
    /// Refresh token expiry in days.
    pub refresh_token_expiry: u64,
    /// Attachment storage. File endpoints fail when it is not configured.
    pub file_storage: Option<FileStorage>,
    /// Maximum upload size in bytes.
    pub max_upload_size: u64,
}

impl AppState {
    /// Create a new application state.
    pub fn new(
        db: SharedDatabase,
        jwt_secret: &str,
        access_expiry: u64,
        refresh_expiry: u64,
    ) -> Self {
        Self {
            db,
            encoding_key: EncodingKey::from_secret(jwt_secret.as_bytes()),
            access_token_expiry: access_expiry,
            refresh_token_expiry: refresh_expiry,
            file_storage: None,
            max_upload_size: crate::file::DEFAULT_MAX_FILE_SIZE,
        }
    }

    /// Enable file endpoints.
    pub fn with_file_storage(mut self, storage: FileStorage, max_upload_size_mb: u64) -> Self {
        self.file_storage = Some(storage);
        self.max_upload_size = max_upload_size_mb * 1024 * 1024;
        self
    }

    /// Generate an access token for a user.
    pub fn generate_access_token(&self, user: &User) -> Result<String, ApiError> {
        let now = chrono::Utc::now().timestamp() as u64;
        let claims = JwtClaims {
            sub: user.id,
            username: user.username.clone(),
            role: user.role.as_str().to_string(),
            iat: now,
            exp: now + self.access_token_expiry,
            jti: uuid::Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to encode JWT: {}", e);
            ApiError::internal("Failed to generate token")
        })
    }

    /// Generate a refresh token.
    pub fn generate_refresh_token(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }

    /// Issue an access token and a stored refresh token for a user.
    pub async fn issue_tokens(&self, user: &User) -> Result<(String, String), ApiError> {
        let access_token = self.generate_access_token(user)?;
        let refresh_token = self.generate_refresh_token();

        let new_token = NewRefreshToken {
            user_id: user.id,
            token: refresh_token.clone(),
            expires_at: days_from_now_db_string(self.refresh_token_expiry as i64),
        };
        RefreshTokenRepository::new(self.db.pool())
            .create(&new_token)
            .await
            .map_err(|e| {
                tracing::error!("Failed to store refresh token: {}", e);
                ApiError::internal("Failed to create session")
            })?;

        Ok((access_token, refresh_token))
    }

    /// The configured file storage.
    pub fn storage(&self) -> Result<&FileStorage, ApiError> {
        self.file_storage
            .as_ref()
            .ok_or_else(|| ApiError::internal("File storage not configured"))
    }
}
