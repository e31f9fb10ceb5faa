//! Authentication and authorization for finboard.
//!
//! This module provides password hashing, account registration and the
//! content permission engine shared by every service.

mod password;
pub mod permission;
pub mod registration;
pub mod validation;

pub use password::{
    hash_password, validate_password, validate_register_password, verify_password, PasswordError,
};
pub use permission::{
    can_create_comment, can_delete_comment, can_mutate, can_view, check_mutate, check_view,
    require_admin, require_login, Principal, ReadContext, Visibility,
};
pub use registration::{
    authenticate, register, update_account, AccountError, AccountUpdate, RegistrationRequest,
};
pub use validation::ValidationError;
