//! Account handlers: registration, login, token refresh and profile updates.

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::auth::{authenticate, register as register_user, AccountUpdate, RegistrationRequest};
use crate::board::CommentService;
use crate::db::{RefreshTokenRepository, UserRepository};
use crate::web::dto::{
    ApiResponse, CommentResponse, LoginRequest, LoginResponse, LogoutRequest, RefreshRequest,
    RefreshResponse, RegisterRequest, UpdateAccountRequest, UserInfo, ValidatedJson,
};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::{AuthUser, OptionalAuthUser};
use crate::FinboardError;

/// POST /api/users/register - User registration.
///
/// The new user is logged in right away.
#[utoipa::path(
    post,
    path = "/users/register",
    tag = "users",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "User registered", body = LoginResponse),
        (status = 409, description = "Username or email already in use"),
        (status = 422, description = "Invalid username, password or email")
    )
)]
pub async fn register(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    let repo = UserRepository::new(state.db.pool());
    let request = RegistrationRequest::new(req.username.trim(), req.password, req.email.trim());
    let user = register_user(&repo, &request)
        .await
        .map_err(FinboardError::from)?;

    let (access_token, refresh_token) = state.issue_tokens(&user).await?;

    Ok(Json(ApiResponse::new(LoginResponse {
        access_token,
        refresh_token,
        expires_in: state.access_token_expiry,
        user: user.into(),
    })))
}

/// POST /api/users/login - Log in with email and password.
#[utoipa::path(
    post,
    path = "/users/login",
    tag = "users",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 400, description = "Email or password missing"),
        (status = 401, description = "Unknown email or wrong password")
    )
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    let email = req.email.trim();
    if email.is_empty() || req.password.is_empty() {
        return Err(ApiError::bad_request("Email and password are required"));
    }

    let repo = UserRepository::new(state.db.pool());
    let user = authenticate(&repo, email, &req.password)
        .await
        .map_err(|e| {
            tracing::warn!(email = %email, "Login failed: {}", e);
            FinboardError::from(e)
        })?;

    let (access_token, refresh_token) = state.issue_tokens(&user).await?;
    tracing::info!(user_id = user.id, username = %user.username, "User logged in");

    Ok(Json(ApiResponse::new(LoginResponse {
        access_token,
        refresh_token,
        expires_in: state.access_token_expiry,
        user: user.into(),
    })))
}

/// POST /api/users/logout - Revoke a refresh token.
#[utoipa::path(
    post,
    path = "/users/logout",
    tag = "users",
    request_body = LogoutRequest,
    responses(
        (status = 200, description = "Logged out")
    )
)]
pub async fn logout(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<LogoutRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let revoked = RefreshTokenRepository::new(state.db.pool())
        .revoke(&req.refresh_token)
        .await?;
    if !revoked {
        tracing::debug!("Logout with unknown or already revoked refresh token");
    }

    Ok(Json(ApiResponse::new(())))
}

/// POST /api/users/refresh - Exchange a refresh token for a new token pair.
///
/// The presented refresh token is revoked (rotation).
#[utoipa::path(
    post,
    path = "/users/refresh",
    tag = "users",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "New tokens", body = RefreshResponse),
        (status = 401, description = "Invalid or expired refresh token")
    )
)]
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<RefreshRequest>,
) -> Result<Json<ApiResponse<RefreshResponse>>, ApiError> {
    let token_repo = RefreshTokenRepository::new(state.db.pool());
    let token = token_repo
        .get_valid_token(&req.refresh_token)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid or expired refresh token"))?;

    let user = UserRepository::new(state.db.pool())
        .get_by_id(token.user_id)
        .await?
        .ok_or_else(|| ApiError::unauthorized("User not found"))?;

    token_repo.revoke(&req.refresh_token).await?;
    let (access_token, refresh_token) = state.issue_tokens(&user).await?;

    Ok(Json(ApiResponse::new(RefreshResponse {
        access_token,
        refresh_token,
        expires_in: state.access_token_expiry,
    })))
}

/// GET /api/users/me - Get the current user.
#[utoipa::path(
    get,
    path = "/users/me",
    tag = "users",
    responses(
        (status = 200, description = "Current user", body = UserInfo),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn me(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
) -> Result<Json<ApiResponse<UserInfo>>, ApiError> {
    let user = UserRepository::new(state.db.pool())
        .get_by_id(claims.sub)
        .await?
        .ok_or_else(|| ApiError::not_found("user not found"))?;

    Ok(Json(ApiResponse::new(user.into())))
}

/// PUT /api/users/:id - Update username and/or password.
///
/// Users may only update their own account; admins may update any.
#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = "users",
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    request_body = UpdateAccountRequest,
    responses(
        (status = 200, description = "Account updated", body = UserInfo),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not your account"),
        (status = 404, description = "User not found"),
        (status = 409, description = "Username already in use"),
        (status = 422, description = "Invalid username or password")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(user_id): Path<i64>,
    ValidatedJson(req): ValidatedJson<UpdateAccountRequest>,
) -> Result<Json<ApiResponse<UserInfo>>, ApiError> {
    let update = AccountUpdate {
        username: req.username.map(|u| u.trim().to_string()),
        password: req.password,
    };

    let repo = UserRepository::new(state.db.pool());
    let user = crate::auth::update_account(&repo, user_id, &auth.principal(), &update).await?;

    Ok(Json(ApiResponse::new(user.into())))
}

/// GET /api/users/:id/comments - Comments written by a user.
///
/// Comments under secret posts the caller cannot read are left out.
#[utoipa::path(
    get,
    path = "/users/{id}/comments",
    tag = "users",
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "The user's visible comments", body = Vec<CommentResponse>)
    )
)]
pub async fn list_user_comments(
    State(state): State<Arc<AppState>>,
    auth: OptionalAuthUser,
    Path(user_id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<CommentResponse>>>, ApiError> {
    let comments = CommentService::new(&state.db)
        .list_comments_by_user(user_id, &auth.principal())
        .await?;

    Ok(Json(ApiResponse::new(
        comments.into_iter().map(Into::into).collect(),
    )))
}
