//! Request body extraction and the field checks shared by the DTOs.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationError};

use crate::web::error::ApiError;

/// `Json<T>` that also runs `T`'s `validator` rules.
///
/// Malformed JSON is a 400; a well-formed body that breaks a field rule is a
/// 422 whose `details` lists the offending fields.
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = match Json::<T>::from_request(req, state).await {
            Ok(Json(body)) => body,
            Err(rejection) => {
                return Err(ApiError::bad_request(format!(
                    "Invalid JSON: {}",
                    rejection.body_text()
                )))
            }
        };

        body.validate().map_err(ApiError::from_validation_errors)?;
        Ok(Self(body))
    }
}

fn rule(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(message.into())
}

/// Rejects control characters other than line breaks and tabs.
pub fn no_control_chars(value: &str) -> Result<(), ValidationError> {
    let is_forbidden = |c: char| c.is_control() && !matches!(c, '\n' | '\r' | '\t');
    match value.chars().any(is_forbidden) {
        true => Err(rule(
            "no_control_chars",
            "Must not contain control characters",
        )),
        false => Ok(()),
    }
}

/// Rejects values that are blank once whitespace is stripped.
pub fn not_empty_trimmed(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(rule("not_empty_trimmed", "Must not be empty"))
    } else {
        Ok(())
    }
}

/// Last path component of an uploaded filename with control characters removed.
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    base.chars()
        .filter(|c| !c.is_control())
        .collect::<String>()
        .trim()
        .to_string()
}
