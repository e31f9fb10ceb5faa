//! Account registration, credential checks and account updates.

use thiserror::Error;
use tracing::info;

use crate::auth::permission::{check_mutate, Principal};
use crate::auth::validation::{
    validate_registration, validate_updated_password, validate_updated_username, ValidationError,
};
use crate::auth::{hash_password, verify_password, PasswordError};
use crate::db::{NewUser, User, UserRepository, UserUpdate};
use crate::{FinboardError, Result};

/// Account-specific errors.
#[derive(Error, Debug)]
pub enum AccountError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("이미 사용 중인 사용자 이름입니다.")]
    UsernameExists,

    #[error("이미 사용 중인 이메일입니다.")]
    EmailExists,

    #[error("가입되지 않은 이메일입니다.")]
    UnknownEmail,

    #[error("비밀번호가 일치하지 않습니다.")]
    WrongPassword,

    #[error("password error: {0}")]
    Password(#[from] PasswordError),

    #[error("database error: {0}")]
    Database(String),
}

impl From<AccountError> for FinboardError {
    fn from(e: AccountError) -> Self {
        match e {
            AccountError::Validation(v) => FinboardError::Validation(v.to_string()),
            AccountError::UsernameExists | AccountError::EmailExists => {
                FinboardError::Conflict(e.to_string())
            }
            AccountError::UnknownEmail | AccountError::WrongPassword => {
                FinboardError::Auth(e.to_string())
            }
            AccountError::Password(p) => FinboardError::Auth(p.to_string()),
            AccountError::Database(msg) => FinboardError::Database(msg),
        }
    }
}

/// Registration request data.
#[derive(Debug, Clone)]
pub struct RegistrationRequest {
    /// Desired username (2-10 characters).
    pub username: String,
    /// Plain password (at least 4 characters).
    pub password: String,
    pub email: String,
}

impl RegistrationRequest {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            email: email.into(),
        }
    }
}

/// Requested changes to an account. Blank values mean "leave unchanged".
#[derive(Debug, Clone, Default)]
pub struct AccountUpdate {
    pub username: Option<String>,
    /// New plain password.
    pub password: Option<String>,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

/// Register a new user.
///
/// Validates the fields, rejects a taken username or email, hashes the password
/// and creates the user. The role follows the admin-username rule.
pub async fn register(
    repo: &UserRepository<'_>,
    request: &RegistrationRequest,
) -> std::result::Result<User, AccountError> {
    validate_registration(&request.username, &request.password, &request.email)?;

    if repo
        .username_exists(&request.username)
        .await
        .map_err(|e| AccountError::Database(e.to_string()))?
    {
        return Err(AccountError::UsernameExists);
    }
    if repo
        .email_exists(&request.email)
        .await
        .map_err(|e| AccountError::Database(e.to_string()))?
    {
        return Err(AccountError::EmailExists);
    }

    let password_hash = hash_password(&request.password)?;

    let user = repo
        .create(&NewUser::new(&request.username, password_hash, &request.email))
        .await
        .map_err(|e| AccountError::Database(e.to_string()))?;

    info!(
        username = %user.username,
        user_id = user.id,
        role = %user.role,
        "New user registered"
    );

    Ok(user)
}

/// Check login credentials and return the matching user.
pub async fn authenticate(
    repo: &UserRepository<'_>,
    email: &str,
    password: &str,
) -> std::result::Result<User, AccountError> {
    let user = repo
        .get_by_email(email)
        .await
        .map_err(|e| AccountError::Database(e.to_string()))?
        .ok_or(AccountError::UnknownEmail)?;

    verify_password(password, &user.password).map_err(|_| AccountError::WrongPassword)?;

    Ok(user)
}

/// Make sure `new_username` can replace `current`. Unchanged names always pass.
pub(crate) async fn ensure_username_available(
    repo: &UserRepository<'_>,
    current: &str,
    new_username: &str,
) -> Result<()> {
    if current != new_username && repo.username_exists(new_username).await? {
        return Err(AccountError::UsernameExists.into());
    }
    Ok(())
}

/// Update a user's own account (or any account, for an admin).
pub async fn update_account(
    repo: &UserRepository<'_>,
    id: i64,
    principal: &Principal,
    update: &AccountUpdate,
) -> Result<User> {
    let user = repo
        .get_by_id(id)
        .await?
        .ok_or_else(|| FinboardError::NotFound("user".to_string()))?;

    check_mutate(user.id, principal, "본인 계정만 수정할 수 있습니다.")?;

    let mut changes = UserUpdate::new();

    if let Some(username) = non_blank(&update.username) {
        validate_updated_username(username).map_err(AccountError::from)?;
        ensure_username_available(repo, &user.username, username).await?;
        if username != user.username {
            changes = changes.username(username);
        }
    }

    if let Some(password) = non_blank(&update.password) {
        validate_updated_password(password).map_err(AccountError::from)?;
        changes = changes.password(hash_password(password).map_err(AccountError::from)?);
    }

    let updated = repo
        .update(user.id, &changes)
        .await?
        .ok_or_else(|| FinboardError::NotFound("user".to_string()))?;

    info!(user_id = updated.id, "Account updated");
    Ok(updated)
}
