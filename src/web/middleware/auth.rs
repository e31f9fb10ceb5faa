//! JWT authentication: claims, verification and the request extractors that
//! turn a bearer token into a [`Principal`].

use axum::{
    body::Body,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, Request},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::auth::permission::LOGIN_REQUIRED;
use crate::auth::Principal;
use crate::db::Role;
use crate::web::error::ApiError;

/// Claims carried by an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    /// User ID.
    pub sub: i64,
    pub username: String,
    /// Role name as stored on the user ("user" or "admin").
    pub role: String,
    pub iat: u64,
    pub exp: u64,
    pub jti: String,
}

impl JwtClaims {
    /// Unknown role names never grant admin rights.
    pub fn is_admin(&self) -> bool {
        self.role
            .parse::<Role>()
            .map(|role| role.is_admin())
            .unwrap_or(false)
    }

    pub fn principal(&self) -> Principal {
        Principal::new(Some(self.sub), self.is_admin())
    }
}

/// Key material for verifying access tokens.
#[derive(Clone)]
pub struct JwtState {
    pub decoding_key: DecodingKey,
    pub validation: Validation,
}

impl JwtState {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::default();
        validation.validate_exp = true;

        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Check a token's signature and expiry and return its claims.
    pub fn verify(&self, token: &str) -> Result<JwtClaims, jsonwebtoken::errors::Error> {
        decode::<JwtClaims>(token, &self.decoding_key, &self.validation).map(|data| data.claims)
    }
}

/// Bearer token from the Authorization header, else the `token` query parameter.
///
/// The query form lets browsers follow plain download links.
fn request_token(parts: &Parts) -> Option<String> {
    if let Some(header) = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
    {
        return header.strip_prefix("Bearer ").map(str::to_string);
    }

    parts
        .uri
        .query()?
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == "token")
        .and_then(|(_, value)| urlencoding::decode(value).ok())
        .map(|value| value.into_owned())
}

/// What the request says about its caller.
enum Presented {
    Nothing,
    Invalid(jsonwebtoken::errors::Error),
    Valid(JwtClaims),
}

fn presented_token(parts: &Parts) -> Result<Presented, ApiError> {
    let Some(token) = request_token(parts) else {
        return Ok(Presented::Nothing);
    };

    // Inserted by the jwt_auth middleware
    let jwt_state = parts
        .extensions
        .get::<Arc<JwtState>>()
        .ok_or_else(|| ApiError::internal("JWT state not configured"))?;

    Ok(match jwt_state.verify(&token) {
        Ok(claims) => Presented::Valid(claims),
        Err(e) => Presented::Invalid(e),
    })
}

/// Extractor for handlers that require a logged-in caller.
#[derive(Debug, Clone)]
pub struct AuthUser(pub JwtClaims);

impl AuthUser {
    pub fn principal(&self) -> Principal {
        self.0.principal()
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut Parts,
        _state: &'life1 S,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            match presented_token(parts)? {
                Presented::Valid(claims) => Ok(AuthUser(claims)),
                Presented::Nothing => Err(ApiError::unauthorized(LOGIN_REQUIRED)),
                Presented::Invalid(e) => {
                    tracing::debug!("JWT validation failed: {}", e);
                    Err(ApiError::unauthorized("Invalid or expired token"))
                }
            }
        })
    }
}

/// Extractor for handlers open to anonymous callers.
///
/// A missing, invalid or expired token all read as anonymous.
/// A token arriving without [`jwt_auth`] in front is an internal error.
#[derive(Debug, Clone)]
pub struct OptionalAuthUser(pub Option<JwtClaims>);

impl OptionalAuthUser {
    pub fn principal(&self) -> Principal {
        self.0
            .as_ref()
            .map(JwtClaims::principal)
            .unwrap_or_else(Principal::anonymous)
    }
}

impl<S> FromRequestParts<S> for OptionalAuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut Parts,
        _state: &'life1 S,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            let claims = match presented_token(parts)? {
                Presented::Valid(claims) => Some(claims),
                Presented::Invalid(e) => {
                    tracing::debug!("Ignoring invalid optional token: {}", e);
                    None
                }
                Presented::Nothing => None,
            };
            Ok(OptionalAuthUser(claims))
        })
    }
}

/// Make the [`JwtState`] available to the extractors.
pub async fn jwt_auth(
    jwt_state: Arc<JwtState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    request.extensions_mut().insert(jwt_state);
    next.run(request).await
}
