//! Input validation for account fields.

use thiserror::Error;

/// Username length bounds at registration.
pub const MIN_USERNAME_LENGTH: usize = 2;
pub const MAX_USERNAME_LENGTH: usize = 10;

/// Username length bounds on account update.
pub const MAX_UPDATED_USERNAME_LENGTH: usize = 20;

/// Maximum email length.
pub const MAX_EMAIL_LENGTH: usize = 254;

/// Validation errors. Messages are shown to end users as-is.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("사용자 이름은 필수입니다.")]
    UsernameRequired,

    #[error("사용자 이름은 2자 이상 10자 이하이어야 합니다.")]
    UsernameLength,

    #[error("사용자 이름은 2자 이상 20자 이하로 입력해주세요.")]
    UpdatedUsernameLength,

    #[error("비밀번호는 필수입니다.")]
    PasswordRequired,

    #[error("비밀번호는 4자 이상이어야 합니다.")]
    PasswordTooShort,

    #[error("비밀번호는 8자 이상 20자 이하로 입력해주세요.")]
    UpdatedPasswordLength,

    #[error("이메일은 필수입니다.")]
    EmailRequired,

    #[error("유효한 이메일 형식이 아닙니다.")]
    EmailInvalidFormat,
}

fn char_len(value: &str) -> usize {
    value.chars().count()
}

/// Validate a username at registration (2 to 10 characters, not blank).
///
/// # Examples
///
/// ```
/// use finboard::auth::validation::validate_username;
///
/// assert!(validate_username("철수").is_ok());
/// assert!(validate_username("a").is_err());
/// ```
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.trim().is_empty() {
        return Err(ValidationError::UsernameRequired);
    }
    let len = char_len(username);
    if !(MIN_USERNAME_LENGTH..=MAX_USERNAME_LENGTH).contains(&len) {
        return Err(ValidationError::UsernameLength);
    }
    Ok(())
}

/// Validate a new username on account update (2 to 20 characters).
pub fn validate_updated_username(username: &str) -> Result<(), ValidationError> {
    if username.trim().is_empty() {
        return Err(ValidationError::UsernameRequired);
    }
    let len = char_len(username);
    if !(MIN_USERNAME_LENGTH..=MAX_UPDATED_USERNAME_LENGTH).contains(&len) {
        return Err(ValidationError::UpdatedUsernameLength);
    }
    Ok(())
}

/// Validate a password at registration.
pub fn validate_registration_password(password: &str) -> Result<(), ValidationError> {
    if password.trim().is_empty() {
        return Err(ValidationError::PasswordRequired);
    }
    crate::auth::password::validate_register_password(password)
        .map_err(|_| ValidationError::PasswordTooShort)
}

/// Validate a new password on account update.
pub fn validate_updated_password(password: &str) -> Result<(), ValidationError> {
    crate::auth::password::validate_password(password)
        .map_err(|_| ValidationError::UpdatedPasswordLength)
}

/// Validate an email address.
///
/// The check is deliberately simple: one `@`, a non-empty local part, and a
/// dotted domain with no empty labels.
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.trim().is_empty() {
        return Err(ValidationError::EmailRequired);
    }
    if email.len() > MAX_EMAIL_LENGTH || email.chars().any(char::is_whitespace) {
        return Err(ValidationError::EmailInvalidFormat);
    }

    let Some((local, domain)) = email.split_once('@') else {
        return Err(ValidationError::EmailInvalidFormat);
    };
    if local.is_empty() || domain.contains('@') || !domain.contains('.') {
        return Err(ValidationError::EmailInvalidFormat);
    }
    if domain.split('.').any(str::is_empty) {
        return Err(ValidationError::EmailInvalidFormat);
    }

    Ok(())
}

/// Validate all registration fields at once, returning the first failure.
pub fn validate_registration(
    username: &str,
    password: &str,
    email: &str,
) -> Result<(), ValidationError> {
    validate_username(username)?;
    validate_registration_password(password)?;
    validate_email(email)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_username() {
        assert!(validate_username("ab").is_ok());
        assert!(validate_username("abcdefghij").is_ok());
        assert!(validate_username("김철수").is_ok());
        assert_eq!(
            validate_username("a"),
            Err(ValidationError::UsernameLength)
        );
        assert_eq!(
            validate_username("abcdefghijk"),
            Err(ValidationError::UsernameLength)
        );
        assert_eq!(
            validate_username("   "),
            Err(ValidationError::UsernameRequired)
        );
    }

    #[test]
    fn test_validate_updated_username() {
        assert!(validate_updated_username(&"a".repeat(20)).is_ok());
        assert_eq!(
            validate_updated_username(&"a".repeat(21)),
            Err(ValidationError::UpdatedUsernameLength)
        );
        assert_eq!(
            validate_updated_username("x"),
            Err(ValidationError::UpdatedUsernameLength)
        );
    }

    #[test]
    fn test_validate_registration_password() {
        assert!(validate_registration_password("1234").is_ok());
        assert_eq!(
            validate_registration_password("123"),
            Err(ValidationError::PasswordTooShort)
        );
        assert_eq!(
            validate_registration_password(""),
            Err(ValidationError::PasswordRequired)
        );
    }

    #[test]
    fn test_validate_updated_password() {
        assert!(validate_updated_password("password1").is_ok());
        assert_eq!(
            validate_updated_password("short"),
            Err(ValidationError::UpdatedPasswordLength)
        );
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("first.last@mail.example.co.kr").is_ok());

        assert_eq!(validate_email(""), Err(ValidationError::EmailRequired));
        for bad in [
            "invalid",
            "@example.com",
            "user@",
            "user@example",
            "user@@example.com",
            "user@example..com",
            "us er@example.com",
        ] {
            assert_eq!(
                validate_email(bad),
                Err(ValidationError::EmailInvalidFormat),
                "{bad}"
            );
        }
    }

    #[test]
    fn test_validate_registration_first_error_wins() {
        assert!(validate_registration("alice", "1234", "alice@example.com").is_ok());
        assert_eq!(
            validate_registration("a", "1", "bad"),
            Err(ValidationError::UsernameLength)
        );
    }
}
