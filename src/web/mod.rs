//! Web API module for finboard.
//!
//! A JSON REST API under `/api` with JWT bearer authentication, plus a health
//! check and Swagger UI.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use router::{create_health_router, create_router};
pub use server::WebServer;
