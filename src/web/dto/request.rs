//! Request DTOs for Web API.

use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::validation::{no_control_chars, not_empty_trimmed};
use crate::board::{Pagination, DEFAULT_PAGE_SIZE};

/// Largest page size a client may ask for.
pub const MAX_PER_PAGE: u32 = 100;

/// Pagination query parameters (`?page=&per_page=`), 1-based.
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationQuery {
    /// Page number (starting at 1).
    #[serde(default = "default_page")]
    pub page: u32,
    /// Items per page.
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

fn default_page() -> u32 {
    1
}

fn default_per_page() -> u32 {
    DEFAULT_PAGE_SIZE as u32
}

impl Default for PaginationQuery {
    fn default() -> Self {
        Self {
            page: default_page(),
            per_page: default_per_page(),
        }
    }
}

impl PaginationQuery {
    /// Page and page size after clamping to sane bounds.
    pub fn normalized(&self) -> (u32, u32) {
        (self.page.max(1), self.per_page.clamp(1, MAX_PER_PAGE))
    }

    /// Convert to (offset, limit) for repository queries.
    pub fn to_offset_limit(&self) -> (i64, i64) {
        let (page, per_page) = self.normalized();
        let offset = (page as i64 - 1) * per_page as i64;
        (offset, per_page as i64)
    }

    pub fn to_pagination(&self) -> Pagination {
        let (offset, limit) = self.to_offset_limit();
        Pagination::new(offset, limit)
    }
}

/// Title search query parameters.
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Title substring, matched case-insensitively.
    #[serde(default)]
    pub keyword: String,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

impl SearchQuery {
    pub fn pagination(&self) -> PaginationQuery {
        PaginationQuery {
            page: self.page,
            per_page: self.per_page,
        }
    }
}

// ============================================================================
// Account DTOs
// ============================================================================

/// User registration request.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(custom(function = "no_control_chars"))]
    pub username: String,
    pub password: String,
    #[validate(length(max = 254, message = "Email is too long"))]
    pub email: String,
}

/// Login request.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Logout request.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LogoutRequest {
    /// Refresh token to invalidate.
    #[validate(custom(function = "not_empty_trimmed"))]
    pub refresh_token: String,
}

/// Token refresh request.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RefreshRequest {
    #[validate(custom(function = "not_empty_trimmed"))]
    pub refresh_token: String,
}

/// Account update request. Missing or blank fields are left unchanged.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateAccountRequest {
    #[serde(default)]
    #[validate(custom(function = "no_control_chars"))]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

// ============================================================================
// Board DTOs
// ============================================================================

/// Create post request.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreatePostRequest {
    #[validate(custom(function = "no_control_chars"))]
    pub title: String,
    pub content: String,
    /// Hide the post from everyone except its author and admins.
    #[serde(default)]
    pub secret: bool,
}

/// Update post request.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdatePostRequest {
    #[serde(default)]
    #[validate(custom(function = "no_control_chars"))]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub secret: Option<bool>,
}

/// Create comment request.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCommentRequest {
    pub post_id: i64,
    pub content: String,
}

/// Update comment request.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCommentRequest {
    pub content: String,
}

// ============================================================================
// Admin DTOs
// ============================================================================

/// Admin rename request.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RenameUserRequest {
    #[validate(custom(function = "no_control_chars"))]
    pub username: String,
}

/// Admin password reset request.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ResetPasswordRequest {
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_defaults() {
        let query: PaginationQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.page, 1);
        assert_eq!(query.per_page, DEFAULT_PAGE_SIZE as u32);
        assert_eq!(query.to_offset_limit(), (0, DEFAULT_PAGE_SIZE));
    }

    #[test]
    fn test_pagination_offset() {
        let query = PaginationQuery {
            page: 3,
            per_page: 20,
        };
        assert_eq!(query.to_offset_limit(), (40, 20));
    }

    #[test]
    fn test_pagination_clamped() {
        let query = PaginationQuery {
            page: 0,
            per_page: 10_000,
        };
        assert_eq!(query.normalized(), (1, MAX_PER_PAGE));
        assert_eq!(query.to_offset_limit(), (0, MAX_PER_PAGE as i64));
    }

    #[test]
    fn test_create_post_request_validation() {
        let ok = CreatePostRequest {
            title: "hello".to_string(),
            content: "body".to_string(),
            secret: false,
        };
        assert!(ok.validate().is_ok());

        let bad = CreatePostRequest {
            title: "bad\x07title".to_string(),
            content: "body".to_string(),
            secret: false,
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_secret_defaults_false() {
        let req: CreatePostRequest =
            serde_json::from_str(r#"{"title":"t","content":"c"}"#).unwrap();
        assert!(!req.secret);
    }

    #[test]
    fn test_refresh_request_rejects_blank() {
        let req = RefreshRequest {
            refresh_token: "  ".to_string(),
        };
        assert!(req.validate().is_err());
    }
}
