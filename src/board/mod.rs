//! Board module for finboard.
//!
//! This module provides the message board:
//! - Posts with an optional secret flag
//! - Comments attached to posts
//! - Projection of entities into outward views after a visibility decision
//! - Services that combine storage, validation and the permission engine

mod comment;
mod comment_repository;
mod comment_service;
mod post;
pub mod projection;
mod repository;
mod service;

pub use comment::{Comment, NewComment};
pub use comment_repository::CommentRepository;
pub use comment_service::{validate_comment, CommentService, MAX_COMMENT_LENGTH};
pub use post::{NewPost, Post, PostUpdate};
pub use projection::{project_listing, project_post, CommentView, PostView, SECRET_POST_TITLE};
pub use repository::PostRepository;
pub use service::{
    validate_content, validate_title, PaginatedResult, Pagination, PostService,
    DEFAULT_PAGE_SIZE, MAX_CONTENT_LENGTH, MAX_TITLE_LENGTH,
};
