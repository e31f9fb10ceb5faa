//! Refresh token repository for JWT authentication.

use super::DbPool;
use crate::datetime::now_db_string;
use crate::{FinboardError, Result};

/// Refresh token entity.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RefreshToken {
    pub id: i64,
    pub user_id: i64,
    pub token: String,
    pub expires_at: String,
    pub created_at: String,
    /// Revocation timestamp (None if not revoked).
    pub revoked_at: Option<String>,
}

/// New refresh token for creation.
pub struct NewRefreshToken {
    pub user_id: i64,
    pub token: String,
    /// Expiration timestamp in storage format.
    pub expires_at: String,
}

/// Repository for refresh token operations.
pub struct RefreshTokenRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> RefreshTokenRepository<'a> {
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Store a new refresh token.
    pub async fn create(&self, new_token: &NewRefreshToken) -> Result<RefreshToken> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO refresh_tokens (user_id, token, expires_at, created_at)
             VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(new_token.user_id)
        .bind(&new_token.token)
        .bind(&new_token.expires_at)
        .bind(now_db_string())
        .fetch_one(self.pool)
        .await
        .map_err(|e| FinboardError::Database(e.to_string()))?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| FinboardError::NotFound("refresh token".to_string()))
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<RefreshToken>> {
        sqlx::query_as::<_, RefreshToken>(
            "SELECT id, user_id, token, expires_at, created_at, revoked_at
             FROM refresh_tokens WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| FinboardError::Database(e.to_string()))
    }

    /// Get a token that is neither expired nor revoked.
    pub async fn get_valid_token(&self, token: &str) -> Result<Option<RefreshToken>> {
        sqlx::query_as::<_, RefreshToken>(
            "SELECT id, user_id, token, expires_at, created_at, revoked_at
             FROM refresh_tokens
             WHERE token = $1
               AND revoked_at IS NULL
               AND expires_at > $2",
        )
        .bind(token)
        .bind(now_db_string())
        .fetch_optional(self.pool)
        .await
        .map_err(|e| FinboardError::Database(e.to_string()))
    }

    /// Revoke a token. Returns false if it was unknown or already revoked.
    pub async fn revoke(&self, token: &str) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET revoked_at = $1 WHERE token = $2 AND revoked_at IS NULL",
        )
        .bind(now_db_string())
        .bind(token)
        .execute(self.pool)
        .await
        .map_err(|e| FinboardError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    /// Revoke every active token of a user (used after a password change).
    pub async fn revoke_all_for_user(&self, user_id: i64) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET revoked_at = $1 WHERE user_id = $2 AND revoked_at IS NULL",
        )
        .bind(now_db_string())
        .bind(user_id)
        .execute(self.pool)
        .await
        .map_err(|e| FinboardError::Database(e.to_string()))?;

        Ok(result.rows_affected())
    }

    /// Delete expired and revoked tokens.
    pub async fn cleanup_expired(&self) -> Result<u64> {
        let result = sqlx::query(
            "DELETE FROM refresh_tokens WHERE expires_at <= $1 OR revoked_at IS NOT NULL",
        )
        .bind(now_db_string())
        .execute(self.pool)
        .await
        .map_err(|e| FinboardError::Database(e.to_string()))?;

        Ok(result.rows_affected())
    }
}

#[cfg(all(test, feature = "sqlite"))]
mod tests {
    use super::*;
    use crate::datetime::days_from_now_db_string;
    use crate::db::{Database, NewUser, UserRepository};

    async fn setup() -> (Database, i64) {
        let db = Database::open_in_memory().await.unwrap();
        let user = UserRepository::new(db.pool())
            .create(&NewUser::new("alice", "hash", "alice@example.com"))
            .await
            .unwrap();
        (db, user.id)
    }

    fn new_token(user_id: i64, token: &str, days: i64) -> NewRefreshToken {
        NewRefreshToken {
            user_id,
            token: token.to_string(),
            expires_at: days_from_now_db_string(days),
        }
    }

    #[tokio::test]
    async fn test_create_and_get_valid() {
        let (db, user_id) = setup().await;
        let repo = RefreshTokenRepository::new(db.pool());

        let created = repo.create(&new_token(user_id, "tok-1", 7)).await.unwrap();
        assert_eq!(created.user_id, user_id);
        assert!(created.revoked_at.is_none());

        let valid = repo.get_valid_token("tok-1").await.unwrap();
        assert_eq!(valid.unwrap().id, created.id);
    }

    #[tokio::test]
    async fn test_expired_token_is_invalid() {
        let (db, user_id) = setup().await;
        let repo = RefreshTokenRepository::new(db.pool());

        repo.create(&new_token(user_id, "old", -1)).await.unwrap();
        assert!(repo.get_valid_token("old").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_revoke() {
        let (db, user_id) = setup().await;
        let repo = RefreshTokenRepository::new(db.pool());

        repo.create(&new_token(user_id, "tok", 7)).await.unwrap();
        assert!(repo.revoke("tok").await.unwrap());
        assert!(!repo.revoke("tok").await.unwrap());
        assert!(repo.get_valid_token("tok").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_revoke_all_and_cleanup() {
        let (db, user_id) = setup().await;
        let repo = RefreshTokenRepository::new(db.pool());

        repo.create(&new_token(user_id, "a", 7)).await.unwrap();
        repo.create(&new_token(user_id, "b", 7)).await.unwrap();
        repo.create(&new_token(user_id, "expired", -1)).await.unwrap();

        assert_eq!(repo.revoke_all_for_user(user_id).await.unwrap(), 3);
        assert_eq!(repo.cleanup_expired().await.unwrap(), 3);
    }
}
