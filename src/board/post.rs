//! Post model for finboard.

/// Post entity. `author_name` is joined from the owning user.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Post {
    pub id: i64,
    /// ID of the user who created the post. Never changes.
    pub owner_id: i64,
    pub author_name: String,
    pub title: String,
    pub content: String,
    /// Secret posts are readable only by their owner and admins.
    pub secret: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Data for creating a new post.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub owner_id: i64,
    pub title: String,
    pub content: String,
    pub secret: bool,
}

impl NewPost {
    /// Create a new public post.
    pub fn new(owner_id: i64, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            owner_id,
            title: title.into(),
            content: content.into(),
            secret: false,
        }
    }

    /// Set the secret flag.
    pub fn with_secret(mut self, secret: bool) -> Self {
        self.secret = secret;
        self
    }
}

/// Data for updating an existing post. The owner is not updatable.
#[derive(Debug, Clone, Default)]
pub struct PostUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    pub secret: Option<bool>,
}

impl PostUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn secret(mut self, secret: bool) -> Self {
        self.secret = Some(secret);
        self
    }

    /// Check if any fields are set.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none() && self.secret.is_none()
    }
}
