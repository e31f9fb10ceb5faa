//! User model for finboard.

use std::fmt;
use std::str::FromStr;

/// Reserved username that is granted the admin role at registration.
pub const ADMIN_USERNAME: &str = "admin";

/// User role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Role {
    /// Regular member.
    #[default]
    User,
    /// Administrator. Passes every ownership check.
    Admin,
}

impl Role {
    /// Convert role to its database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    /// Role assigned to a newly registered username.
    ///
    /// The username "admin" (any ASCII case) becomes an administrator, everyone
    /// else a regular user.
    ///
    /// # Examples
    ///
    /// ```
    /// use finboard::db::Role;
    ///
    /// assert_eq!(Role::for_username("Admin"), Role::Admin);
    /// assert_eq!(Role::for_username("alice"), Role::User);
    /// ```
    pub fn for_username(username: &str) -> Role {
        if username.eq_ignore_ascii_case(ADMIN_USERNAME) {
            Role::Admin
        } else {
            Role::User
        }
    }

    /// Whether this role carries the admin bypass.
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            _ => Err(format!("unknown role: {s}")),
        }
    }
}

/// A registered user.
#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    /// Login name shown as the author name on content (unique).
    pub username: String,
    /// Password hash (Argon2 PHC string).
    pub password: String,
    /// Login email (unique).
    pub email: String,
    pub role: Role,
    pub created_at: String,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Data for creating a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    /// Password hash (already hashed with Argon2).
    pub password: String,
    pub email: String,
    pub role: Role,
}

impl NewUser {
    /// Create a new user. The role is derived from the username.
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        let username = username.into();
        let role = Role::for_username(&username);
        Self {
            username,
            password: password.into(),
            email: email.into(),
            role,
        }
    }
}

/// Data for updating an existing user.
///
/// Role is deliberately absent: it is fixed at registration.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub username: Option<String>,
    /// New password hash.
    pub password: Option<String>,
}

impl UserUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn password(mut self, password_hash: impl Into<String>) -> Self {
        self.password = Some(password_hash.into());
        self
    }

    /// Check if the update has no changes.
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.password.is_none()
    }
}
