//! finboard - Message board backend
//!
//! Posts, comments and attachments behind a JSON API, with secret posts that
//! only their author and administrators can read in full.

pub mod admin;
pub mod auth;
pub mod board;
pub mod config;
pub mod datetime;
pub mod db;
pub mod error;
pub mod file;
pub mod logging;
pub mod web;

pub use admin::{AdminService, UserDetail};
pub use auth::{
    can_create_comment, can_delete_comment, can_mutate, can_view, Principal, ReadContext,
    Visibility,
};
pub use board::{
    Comment, CommentService, CommentView, Post, PostService, PostView, SECRET_POST_TITLE,
};
pub use config::Config;
pub use db::{Database, NewUser, Role, User, UserRepository, UserUpdate};
pub use error::{FinboardError, Result};
pub use file::{FileRecord, FileService, FileStorage};
pub use web::WebServer;
