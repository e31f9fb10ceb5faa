//! Per-client rate limiting for the login endpoint and the rest of the API.
//!
//! Clients are keyed by IP. Behind a reverse proxy the first `X-Forwarded-For`
//! entry (or `X-Real-IP`) is used, otherwise the peer address.

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{DefaultKeyedRateLimiter, Quota};
use std::{net::SocketAddr, num::NonZeroU32, sync::Arc, time::Duration};

use crate::web::error::{ApiError, ErrorCode};

/// How often idle client entries are dropped.
const CLEANUP_INTERVAL: Duration = Duration::from_secs(300);

/// Key used when no client address can be determined.
const UNKNOWN_CLIENT: &str = "unknown";

type ClientLimiter = DefaultKeyedRateLimiter<String>;

fn per_minute(limit: u32) -> ClientLimiter {
    ClientLimiter::keyed(Quota::per_minute(
        NonZeroU32::new(limit).unwrap_or(NonZeroU32::MIN),
    ))
}

/// Rate limiters shared by every request.
pub struct RateLimitState {
    login: ClientLimiter,
    api: ClientLimiter,
}

impl RateLimitState {
    /// Limits are requests per minute per client. Zero is treated as one.
    pub fn new(login_rate_limit: u32, api_rate_limit: u32) -> Self {
        Self {
            login: per_minute(login_rate_limit),
            api: per_minute(api_rate_limit),
        }
    }

    /// Whether `client` may attempt another login.
    pub fn check_login(&self, client: &str) -> bool {
        self.login.check_key(&client.to_string()).is_ok()
    }

    /// Whether `client` may make another API request.
    pub fn check_api(&self, client: &str) -> bool {
        self.api.check_key(&client.to_string()).is_ok()
    }

    /// Forget clients whose quota has fully replenished.
    pub fn cleanup(&self) {
        self.login.retain_recent();
        self.api.retain_recent();
        self.login.shrink_to_fit();
        self.api.shrink_to_fit();
    }

    /// Run [`cleanup`](Self::cleanup) in the background every five minutes.
    pub fn start_cleanup_task(self: Arc<Self>) {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(CLEANUP_INTERVAL);
            interval.tick().await;
            loop {
                interval.tick().await;
                self.cleanup();
                tracing::debug!(
                    login_clients = self.login.len(),
                    api_clients = self.api.len(),
                    "Rate limiter cleanup"
                );
            }
        });
    }
}

fn header_value<'a>(req: &'a Request<Body>, name: &str) -> Option<&'a str> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Identify the client of a request.
fn client_key(req: &Request<Body>) -> String {
    if let Some(first) = header_value(req, "X-Forwarded-For")
        .and_then(|chain| chain.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
    {
        return first.to_string();
    }

    if let Some(real_ip) = header_value(req, "X-Real-IP") {
        return real_ip.to_string();
    }

    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

fn too_many_requests(message: &str) -> Response {
    ApiError::new(ErrorCode::TooManyRequests, message).into_response()
}

/// Limits login attempts per client.
pub async fn login_rate_limit(
    state: Arc<RateLimitState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let client = client_key(&req);
    if !state.check_login(&client) {
        tracing::warn!(client = %client, "Login rate limit exceeded");
        return too_many_requests("Too many login attempts. Please try again later.");
    }
    next.run(req).await
}

/// Limits all API requests per client.
pub async fn api_rate_limit(
    state: Arc<RateLimitState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let client = client_key(&req);
    if !state.check_api(&client) {
        tracing::warn!(client = %client, "API rate limit exceeded");
        return too_many_requests("Too many requests. Please try again later.");
    }
    next.run(req).await
}
