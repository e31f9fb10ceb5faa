//! OpenAPI document and Swagger UI.

use axum::Router;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use super::dto::{
    CommentResponse, CreateCommentRequest, CreatePostRequest, FileResponse, LoginRequest,
    LoginResponse, LogoutRequest, PaginationMeta, PostResponse, RefreshRequest, RefreshResponse,
    RegisterRequest, RenameUserRequest, ResetPasswordRequest, UpdateAccountRequest,
    UpdateCommentRequest, UpdatePostRequest, UserDetailResponse, UserInfo,
};
use super::handlers;

#[derive(OpenApi)]
#[openapi(
    info(title = "finboard API"),
    servers((url = "/api")),
    paths(
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::logout,
        handlers::auth::refresh,
        handlers::auth::me,
        handlers::auth::update_user,
        handlers::auth::list_user_comments,
        handlers::post::create_post,
        handlers::post::list_posts,
        handlers::post::search_posts,
        handlers::post::get_post,
        handlers::post::update_post,
        handlers::post::delete_post,
        handlers::comment::create_comment,
        handlers::comment::list_comments,
        handlers::comment::update_comment,
        handlers::comment::delete_comment,
        handlers::file::upload_file,
        handlers::file::download_file,
        handlers::file::list_post_files,
        handlers::file::delete_file,
        handlers::admin::admin_list_users,
        handlers::admin::admin_rename_user,
        handlers::admin::admin_reset_password,
        handlers::admin::admin_user_details,
        handlers::admin::admin_list_posts,
        handlers::admin::admin_delete_post,
    ),
    components(schemas(
        RegisterRequest,
        LoginRequest,
        LogoutRequest,
        RefreshRequest,
        UpdateAccountRequest,
        CreatePostRequest,
        UpdatePostRequest,
        CreateCommentRequest,
        UpdateCommentRequest,
        RenameUserRequest,
        ResetPasswordRequest,
        LoginResponse,
        RefreshResponse,
        UserInfo,
        PostResponse,
        CommentResponse,
        FileResponse,
        UserDetailResponse,
        PaginationMeta,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "users", description = "Registration, login and accounts"),
        (name = "posts", description = "Posts, including secret posts"),
        (name = "comments", description = "Comments on posts"),
        (name = "files", description = "Attachments"),
        (name = "admin", description = "Administration")
    )
)]
pub struct ApiDoc;

/// Registers the `bearer_auth` scheme referenced by protected endpoints.
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Swagger UI at `/swagger-ui`, document at `/api-docs/openapi.json`.
pub fn create_swagger_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_endpoints() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;
        assert!(paths.contains_key("/posts"));
        assert!(paths.contains_key("/posts/{id}"));
        assert!(paths.contains_key("/comments/post/{post_id}"));
        assert!(paths.contains_key("/admin/users/{id}/reset-password"));
    }

    #[test]
    fn test_openapi_has_bearer_scheme() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
