//! File handlers for Web API.

use axum::{
    body::Body,
    extract::{Multipart, Path, State},
    http::header,
    response::Response,
    Json,
};
use std::sync::Arc;

use crate::file::{FileService, UploadRequest};
use crate::web::dto::validation::sanitize_filename;
use crate::web::dto::{ApiResponse, FileResponse};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::{AuthUser, OptionalAuthUser};

/// Build a Content-Disposition value that is safe to put in a header.
///
/// The plain `filename` parameter is an ASCII fallback: control characters (CR, LF)
/// are dropped, quotes, backslashes and non-ASCII characters become `_`. Names that
/// needed changes also get an RFC 5987 `filename*` parameter with the exact UTF-8 name.
fn content_disposition_header(filename: &str) -> String {
    let needs_encoding = filename
        .chars()
        .any(|c| !c.is_ascii() || c.is_control() || c == '"' || c == '\\');
    if !needs_encoding {
        return format!("attachment; filename=\"{}\"", filename);
    }

    let sanitized: String = filename
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| match c {
            '"' | '\\' => '_',
            c if !c.is_ascii() => '_',
            _ => c,
        })
        .collect();

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        sanitized,
        urlencoding::encode(filename)
    )
}

/// POST /api/files/upload - Upload a file.
///
/// Request body: multipart/form-data with a `file` field and an optional `post_id`
/// field attaching the file to one of the caller's posts.
#[utoipa::path(
    post,
    path = "/files/upload",
    tag = "files",
    responses(
        (status = 200, description = "File uploaded", body = FileResponse),
        (status = 400, description = "Malformed multipart body"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the author of the post"),
        (status = 404, description = "Post not found"),
        (status = 422, description = "Invalid filename or file too large")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<FileResponse>>, ApiError> {
    let storage = state.storage()?;

    let mut filename: Option<String> = None;
    let mut content_type: Option<String> = None;
    let mut content: Option<Vec<u8>> = None;
    let mut post_id: Option<i64> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::warn!("Failed to read multipart field: {}", e);
        ApiError::bad_request("Invalid multipart data")
    })? {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "file" => {
                filename = field.file_name().map(sanitize_filename);
                content_type = field.content_type().map(|s| s.to_string());
                content = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| {
                            tracing::warn!("Failed to read file content: {}", e);
                            ApiError::bad_request("Failed to read file")
                        })?
                        .to_vec(),
                );
            }
            "post_id" => {
                let text = field
                    .text()
                    .await
                    .map_err(|_| ApiError::bad_request("Invalid post_id"))?;
                let text = text.trim();
                if !text.is_empty() {
                    post_id = Some(
                        text.parse()
                            .map_err(|_| ApiError::bad_request("Invalid post_id"))?,
                    );
                }
            }
            _ => {}
        }
    }

    let filename = filename.ok_or_else(|| ApiError::bad_request("No file provided"))?;
    let content = content.ok_or_else(|| ApiError::bad_request("No file content"))?;

    let request = UploadRequest::new(filename, content)
        .with_post(post_id)
        .with_content_type(content_type);

    let record = FileService::new(&state.db, storage)
        .with_max_file_size(state.max_upload_size)
        .upload(&auth.principal(), &request)
        .await?;

    Ok(Json(ApiResponse::new(record.into())))
}

/// GET /api/files/:id - Download a file.
///
/// Files attached to a secret post are only served to its author and admins.
#[utoipa::path(
    get,
    path = "/files/{id}",
    tag = "files",
    params(
        ("id" = i64, Path, description = "File ID")
    ),
    responses(
        (status = 200, description = "File content", content_type = "application/octet-stream"),
        (status = 403, description = "Access denied"),
        (status = 404, description = "File not found")
    )
)]
pub async fn download_file(
    State(state): State<Arc<AppState>>,
    auth: OptionalAuthUser,
    Path(file_id): Path<i64>,
) -> Result<Response, ApiError> {
    let storage = state.storage()?;

    let download = FileService::new(&state.db, storage)
        .download(file_id, &auth.principal())
        .await?;

    Response::builder()
        .header(header::CONTENT_TYPE, download.record.content_type.as_str())
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition_header(&download.record.original_name),
        )
        .header(header::CONTENT_LENGTH, download.content.len())
        .body(Body::from(download.content))
        .map_err(|e| {
            tracing::error!("Failed to build download response: {}", e);
            ApiError::internal("Failed to build response")
        })
}

/// GET /api/files/post/:post_id - Files attached to a post.
#[utoipa::path(
    get,
    path = "/files/post/{post_id}",
    tag = "files",
    params(
        ("post_id" = i64, Path, description = "Post ID")
    ),
    responses(
        (status = 200, description = "Attached files", body = Vec<FileResponse>),
        (status = 403, description = "Secret post of another user"),
        (status = 404, description = "Post not found")
    )
)]
pub async fn list_post_files(
    State(state): State<Arc<AppState>>,
    auth: OptionalAuthUser,
    Path(post_id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<FileResponse>>>, ApiError> {
    let storage = state.storage()?;

    let files = FileService::new(&state.db, storage)
        .list_by_post(post_id, &auth.principal())
        .await?;

    Ok(Json(ApiResponse::new(
        files.into_iter().map(Into::into).collect(),
    )))
}

/// DELETE /api/files/:id - Delete a file.
#[utoipa::path(
    delete,
    path = "/files/{id}",
    tag = "files",
    params(
        ("id" = i64, Path, description = "File ID")
    ),
    responses(
        (status = 200, description = "File deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Access denied"),
        (status = 404, description = "File not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_file(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(file_id): Path<i64>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let storage = state.storage()?;

    FileService::new(&state.db, storage)
        .delete(file_id, &auth.principal())
        .await?;

    Ok(Json(ApiResponse::new(())))
}
