//! Comment model for finboard.

/// Comment entity. A comment always belongs to exactly one post.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    /// ID of the user who wrote the comment. Never changes.
    pub owner_id: i64,
    pub author_name: String,
    pub content: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Data for creating a new comment.
#[derive(Debug, Clone)]
pub struct NewComment {
    pub post_id: i64,
    pub owner_id: i64,
    pub content: String,
}

impl NewComment {
    pub fn new(post_id: i64, owner_id: i64, content: impl Into<String>) -> Self {
        Self {
            post_id,
            owner_id,
            content: content.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_comment() {
        let comment = NewComment::new(3, 7, "hello");
        assert_eq!(comment.post_id, 3);
        assert_eq!(comment.owner_id, 7);
        assert_eq!(comment.content, "hello");
    }
}
