//! Response projection.
//!
//! Turns entities plus a [`Visibility`] decision into the shapes that leave the
//! service layer. A redacted post keeps its identity and timestamps so listings
//! stay stable, but never carries its real title or content.

use super::{Comment, Post};
use crate::auth::{can_view, Principal, ReadContext, Visibility};

/// Title shown in place of a secret post the caller may not read.
pub const SECRET_POST_TITLE: &str = "비밀글입니다.";

/// Outward view of a post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostView {
    pub id: i64,
    pub owner_id: i64,
    pub author_name: String,
    pub title: String,
    pub content: String,
    pub secret: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl PostView {
    /// Whether this view is a placeholder for an unreadable secret post.
    pub fn is_redacted(&self) -> bool {
        self.secret && self.title == SECRET_POST_TITLE && self.content.is_empty()
    }
}

impl From<&Post> for PostView {
    fn from(post: &Post) -> Self {
        Self {
            id: post.id,
            owner_id: post.owner_id,
            author_name: post.author_name.clone(),
            title: post.title.clone(),
            content: post.content.clone(),
            secret: post.secret,
            created_at: post.created_at.clone(),
            updated_at: post.updated_at.clone(),
        }
    }
}

/// Project a post for a visibility decision. `Denied` yields nothing.
pub fn project_post(post: &Post, visibility: Visibility) -> Option<PostView> {
    match visibility {
        Visibility::Full => Some(PostView::from(post)),
        Visibility::Redacted => Some(PostView {
            title: SECRET_POST_TITLE.to_string(),
            content: String::new(),
            secret: true,
            ..PostView::from(post)
        }),
        Visibility::Denied => None,
    }
}

/// Project a page of posts in listing context. Every input post yields one view.
pub fn project_listing(posts: &[Post], principal: &Principal) -> Vec<PostView> {
    posts
        .iter()
        .filter_map(|post| project_post(post, can_view(post, principal, ReadContext::Listing)))
        .collect()
}

/// Outward view of a comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentView {
    pub id: i64,
    pub post_id: i64,
    pub owner_id: i64,
    pub author_name: String,
    pub content: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Comment> for CommentView {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id,
            post_id: comment.post_id,
            owner_id: comment.owner_id,
            author_name: comment.author_name,
            content: comment.content,
            created_at: comment.created_at,
            updated_at: comment.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret_post() -> Post {
        Post {
            id: 5,
            owner_id: 1,
            author_name: "alice".to_string(),
            title: "My diary".to_string(),
            content: "private stuff".to_string(),
            secret: true,
            created_at: "2024-01-01 00:00:00".to_string(),
            updated_at: "2024-01-02 00:00:00".to_string(),
        }
    }

    #[test]
    fn test_full_projection_keeps_everything() {
        let post = secret_post();
        let view = project_post(&post, Visibility::Full).unwrap();

        assert_eq!(view.title, "My diary");
        assert_eq!(view.content, "private stuff");
        assert!(view.secret);
        assert!(!view.is_redacted());
    }

    #[test]
    fn test_redacted_projection() {
        let post = secret_post();
        let view = project_post(&post, Visibility::Redacted).unwrap();

        assert_eq!(view.id, 5);
        assert_eq!(view.owner_id, 1);
        assert_eq!(view.author_name, "alice");
        assert_eq!(view.title, SECRET_POST_TITLE);
        assert_eq!(view.content, "");
        assert!(view.secret);
        assert_eq!(view.created_at, post.created_at);
        assert_eq!(view.updated_at, post.updated_at);
        assert!(view.is_redacted());
    }

    #[test]
    fn test_denied_projection_is_none() {
        assert!(project_post(&secret_post(), Visibility::Denied).is_none());
    }

    #[test]
    fn test_listing_never_drops_items() {
        let mut public = secret_post();
        public.id = 6;
        public.secret = false;
        let posts = vec![secret_post(), public];

        let anonymous = project_listing(&posts, &Principal::anonymous());
        assert_eq!(anonymous.len(), 2);
        assert!(anonymous[0].is_redacted());
        assert_eq!(anonymous[1].title, "My diary");

        let owner = project_listing(&posts, &Principal::user(1));
        assert_eq!(owner[0].content, "private stuff");
    }

    #[test]
    fn test_comment_view_from_comment() {
        let comment = Comment {
            id: 1,
            post_id: 5,
            owner_id: 3,
            author_name: "carol".to_string(),
            content: "nice".to_string(),
            created_at: "2024-01-01 00:00:00".to_string(),
            updated_at: "2024-01-01 00:00:00".to_string(),
        };
        let view = CommentView::from(comment);
        assert_eq!(view.author_name, "carol");
        assert_eq!(view.post_id, 5);
    }
}
