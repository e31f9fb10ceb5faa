//! Password hashing and validation.
//!
//! Uses Argon2id for password hashing.

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, Params,
};
use rand_core::OsRng;
use thiserror::Error;

/// Minimum password length accepted at registration.
pub const MIN_REGISTER_PASSWORD_LENGTH: usize = 4;

/// Minimum password length accepted on account update.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum password length accepted on account update.
pub const MAX_PASSWORD_LENGTH: usize = 20;

/// Password-related errors.
#[derive(Error, Debug)]
pub enum PasswordError {
    #[error("password must be at least {0} characters")]
    TooShort(usize),

    #[error("password must be at most {0} characters")]
    TooLong(usize),

    /// Password hashing failed.
    #[error("password hashing failed: {0}")]
    HashError(String),

    /// Stored hash could not be parsed.
    #[error("invalid password hash format")]
    InvalidHash,

    /// Wrong password.
    #[error("password verification failed")]
    VerificationFailed,
}

/// Create the Argon2id hasher (64 MiB memory, 3 iterations, 4 lanes).
fn create_argon2() -> Result<Argon2<'static>, PasswordError> {
    let m_cost = 65536;
    let t_cost = 3;
    let p_cost = 4;

    let params = Params::new(m_cost, t_cost, p_cost, None)
        .map_err(|e| PasswordError::HashError(e.to_string()))?;
    Ok(Argon2::new(
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        params,
    ))
}

/// Hash a password using Argon2id.
///
/// Returns a PHC-formatted hash string that includes the salt and parameters.
/// Length rules are not applied here; callers validate first.
///
/// # Examples
///
/// ```
/// use finboard::auth::hash_password;
///
/// let hash = hash_password("my_secure_password").unwrap();
/// assert!(hash.starts_with("$argon2id$"));
/// ```
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = create_argon2()?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::HashError(e.to_string()))?;

    Ok(hash.to_string())
}

/// Verify a password against a stored hash.
///
/// The parameters come from the parsed hash, so hashes created with other
/// parameters still verify.
pub fn verify_password(password: &str, hash: &str) -> Result<(), PasswordError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| PasswordError::InvalidHash)?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| PasswordError::VerificationFailed)
}

/// Validate a password chosen at registration (at least 4 characters).
pub fn validate_register_password(password: &str) -> Result<(), PasswordError> {
    if password.chars().count() < MIN_REGISTER_PASSWORD_LENGTH {
        return Err(PasswordError::TooShort(MIN_REGISTER_PASSWORD_LENGTH));
    }
    Ok(())
}

/// Validate a new password on account update (8 to 20 characters).
///
/// # Examples
///
/// ```
/// use finboard::auth::validate_password;
///
/// assert!(validate_password("short").is_err());
/// assert!(validate_password("long_enough").is_ok());
/// ```
pub fn validate_password(password: &str) -> Result<(), PasswordError> {
    let len = password.chars().count();
    if len < MIN_PASSWORD_LENGTH {
        return Err(PasswordError::TooShort(MIN_PASSWORD_LENGTH));
    }
    if len > MAX_PASSWORD_LENGTH {
        return Err(PasswordError::TooLong(MAX_PASSWORD_LENGTH));
    }
    Ok(())
}
