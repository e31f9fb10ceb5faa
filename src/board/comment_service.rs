//! Comment service.
//!
//! Comments have no visibility of their own: every operation first checks
//! the parent post with a direct read.

use std::collections::HashMap;

use tracing::info;

use crate::auth::{
    can_create_comment, can_delete_comment, can_view, check_mutate, check_view, require_login,
    Principal, ReadContext,
};
use crate::auth::permission::SECRET_POST_DENIED;
use crate::db::Database;
use crate::{FinboardError, Result};

use super::comment_repository::CommentRepository;
use super::projection::CommentView;
use super::repository::PostRepository;
use super::{Comment, NewComment, Post};

/// Maximum comment length in characters.
pub const MAX_COMMENT_LENGTH: usize = 1_000;

/// Validate comment content.
pub fn validate_comment(content: &str) -> Result<()> {
    if content.trim().is_empty() {
        return Err(FinboardError::Validation(
            "댓글 내용은 필수 입력 항목입니다.".to_string(),
        ));
    }
    if content.chars().count() > MAX_COMMENT_LENGTH {
        return Err(FinboardError::Validation(format!(
            "댓글은 {MAX_COMMENT_LENGTH}자 이하로 입력해주세요."
        )));
    }
    Ok(())
}

/// Service for comment operations.
pub struct CommentService<'a> {
    db: &'a Database,
}

impl<'a> CommentService<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    async fn fetch_post(&self, post_id: i64) -> Result<Post> {
        PostRepository::new(self.db.pool())
            .get_by_id(post_id)
            .await?
            .ok_or_else(|| FinboardError::NotFound("post".to_string()))
    }

    async fn fetch_comment(&self, id: i64) -> Result<Comment> {
        CommentRepository::new(self.db.pool())
            .get_by_id(id)
            .await?
            .ok_or_else(|| FinboardError::NotFound("comment".to_string()))
    }

    /// Add a comment to a post the principal can fully read.
    pub async fn create_comment(
        &self,
        principal: &Principal,
        post_id: i64,
        content: &str,
    ) -> Result<CommentView> {
        let owner_id = require_login(principal)?;
        let post = self.fetch_post(post_id).await?;

        if !can_create_comment(can_view(&post, principal, ReadContext::Direct)) {
            return Err(FinboardError::AccessDenied(SECRET_POST_DENIED.to_string()));
        }
        validate_comment(content)?;

        let comment = CommentRepository::new(self.db.pool())
            .create(&NewComment::new(post_id, owner_id, content))
            .await?;

        info!(comment_id = comment.id, post_id, owner_id, "Comment created");
        Ok(comment.into())
    }

    /// List the comments of a post, oldest first.
    pub async fn list_comments(
        &self,
        post_id: i64,
        principal: &Principal,
    ) -> Result<Vec<CommentView>> {
        let post = self.fetch_post(post_id).await?;
        check_view(&post, principal)?;

        let comments = CommentRepository::new(self.db.pool())
            .list_by_post(post_id)
            .await?;
        Ok(comments.into_iter().map(CommentView::from).collect())
    }

    /// Edit a comment. Only its author or an admin may do this, and only while
    /// the parent post is readable to them.
    pub async fn update_comment(
        &self,
        id: i64,
        principal: &Principal,
        content: &str,
    ) -> Result<CommentView> {
        let comment = self.fetch_comment(id).await?;
        let post = self.fetch_post(comment.post_id).await?;
        check_view(&post, principal)?;
        check_mutate(comment.owner_id, principal, "댓글을 수정할 권한이 없습니다.")?;
        validate_comment(content)?;

        let updated = CommentRepository::new(self.db.pool())
            .update_content(id, content)
            .await?
            .ok_or_else(|| FinboardError::NotFound("comment".to_string()))?;

        info!(comment_id = id, "Comment updated");
        Ok(updated.into())
    }

    /// Delete a comment. Allowed for its author, the post's author and admins.
    pub async fn delete_comment(&self, id: i64, principal: &Principal) -> Result<()> {
        let comment = self.fetch_comment(id).await?;
        let post = self.fetch_post(comment.post_id).await?;
        check_view(&post, principal)?;

        if !can_delete_comment(&comment, &post, principal) {
            return Err(FinboardError::AccessDenied(
                "댓글을 삭제할 권한이 없습니다.".to_string(),
            ));
        }

        CommentRepository::new(self.db.pool()).delete(id).await?;
        info!(comment_id = id, post_id = post.id, "Comment deleted");
        Ok(())
    }

    /// A user's comments, limited to posts the principal can fully read.
    pub async fn list_comments_by_user(
        &self,
        user_id: i64,
        principal: &Principal,
    ) -> Result<Vec<CommentView>> {
        let comments = CommentRepository::new(self.db.pool())
            .list_by_owner(user_id)
            .await?;
        let posts = PostRepository::new(self.db.pool());

        // post id -> whether the principal can read it in full
        let mut readable: HashMap<i64, bool> = HashMap::new();
        let mut visible = Vec::with_capacity(comments.len());
        for comment in comments {
            let is_readable = match readable.get(&comment.post_id) {
                Some(&cached) => cached,
                None => {
                    let full = posts
                        .get_by_id(comment.post_id)
                        .await?
                        .is_some_and(|post| {
                            can_view(&post, principal, ReadContext::Direct).is_full()
                        });
                    readable.insert(comment.post_id, full);
                    full
                }
            };
            if is_readable {
                visible.push(CommentView::from(comment));
            }
        }
        Ok(visible)
    }
}

#[cfg(all(test, feature = "sqlite"))]
mod tests {
    use super::*;
    use crate::board::{PostService, PostUpdate};
    use crate::db::{NewUser, UserRepository};

    struct Fixture {
        db: Database,
        /// Post author.
        u1: i64,
        /// Another user.
        u2: i64,
        /// Comment author.
        u3: i64,
        /// Unrelated user.
        u4: i64,
        admin: i64,
    }

    async fn setup() -> Fixture {
        let db = Database::open_in_memory().await.unwrap();
        let repo = UserRepository::new(db.pool());
        let mut ids = Vec::new();
        for name in ["user1", "user2", "user3", "user4", "admin"] {
            let user = repo
                .create(&NewUser::new(name, "h", format!("{name}@example.com")))
                .await
                .unwrap();
            ids.push(user.id);
        }
        Fixture {
            db,
            u1: ids[0],
            u2: ids[1],
            u3: ids[2],
            u4: ids[3],
            admin: ids[4],
        }
    }

    async fn create_post(f: &Fixture, secret: bool) -> i64 {
        PostService::new(&f.db)
            .create_post(&Principal::user(f.u1), "title", "content", secret)
            .await
            .unwrap()
            .id
    }

    #[test]
    fn test_validate_comment() {
        assert!(validate_comment("hi").is_ok());
        assert!(validate_comment(" ").is_err());
        assert!(validate_comment(&"a".repeat(MAX_COMMENT_LENGTH + 1)).is_err());
    }

    #[tokio::test]
    async fn test_create_and_list() {
        let f = setup().await;
        let post_id = create_post(&f, false).await;
        let service = CommentService::new(&f.db);

        service
            .create_comment(&Principal::user(f.u3), post_id, "first")
            .await
            .unwrap();
        service
            .create_comment(&Principal::user(f.u2), post_id, "second")
            .await
            .unwrap();

        let comments = service
            .list_comments(post_id, &Principal::anonymous())
            .await
            .unwrap();
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].content, "first");
        assert_eq!(comments[0].author_name, "user3");
    }

    #[tokio::test]
    async fn test_create_requires_login_and_post() {
        let f = setup().await;
        let post_id = create_post(&f, false).await;
        let service = CommentService::new(&f.db);

        let anonymous = service
            .create_comment(&Principal::anonymous(), post_id, "hi")
            .await;
        assert!(matches!(anonymous, Err(FinboardError::Auth(_))));

        let missing = service
            .create_comment(&Principal::user(f.u2), 999, "hi")
            .await;
        assert!(matches!(missing, Err(FinboardError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_secret_post_comments_unreachable() {
        let f = setup().await;
        let post_id = create_post(&f, true).await;
        let service = CommentService::new(&f.db);

        let create = service
            .create_comment(&Principal::user(f.u2), post_id, "sneaky")
            .await;
        assert!(matches!(create, Err(FinboardError::AccessDenied(_))));

        let list = service.list_comments(post_id, &Principal::user(f.u2)).await;
        assert!(matches!(list, Err(FinboardError::AccessDenied(_))));

        let list = service.list_comments(post_id, &Principal::anonymous()).await;
        assert!(matches!(list, Err(FinboardError::AccessDenied(_))));

        // owner and admin can
        service
            .create_comment(&Principal::user(f.u1), post_id, "mine")
            .await
            .unwrap();
        let list = service
            .list_comments(post_id, &Principal::admin(f.admin))
            .await
            .unwrap();
        assert_eq!(list.len(), 1);
    }

    #[tokio::test]
    async fn test_post_owner_deletes_foreign_comment() {
        let f = setup().await;
        let post_id = create_post(&f, false).await;
        let service = CommentService::new(&f.db);

        let comment = service
            .create_comment(&Principal::user(f.u3), post_id, "by user3")
            .await
            .unwrap();

        service
            .delete_comment(comment.id, &Principal::user(f.u1))
            .await
            .unwrap();
        let remaining = service
            .list_comments(post_id, &Principal::user(f.u1))
            .await
            .unwrap();
        assert!(remaining.is_empty());
    }

    #[tokio::test]
    async fn test_unrelated_user_cannot_delete_comment() {
        let f = setup().await;
        let post_id = create_post(&f, false).await;
        let service = CommentService::new(&f.db);

        let comment = service
            .create_comment(&Principal::user(f.u3), post_id, "by user3")
            .await
            .unwrap();

        match service.delete_comment(comment.id, &Principal::user(f.u4)).await {
            Err(FinboardError::AccessDenied(msg)) => {
                assert_eq!(msg, "댓글을 삭제할 권한이 없습니다.")
            }
            other => panic!("expected AccessDenied, got {other:?}"),
        }

        // comment author and admin may delete
        service
            .delete_comment(comment.id, &Principal::user(f.u3))
            .await
            .unwrap();
        let again = service
            .delete_comment(comment.id, &Principal::admin(f.admin))
            .await;
        assert!(matches!(again, Err(FinboardError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_comment_owner_only() {
        let f = setup().await;
        let post_id = create_post(&f, false).await;
        let service = CommentService::new(&f.db);

        let comment = service
            .create_comment(&Principal::user(f.u3), post_id, "before")
            .await
            .unwrap();

        // post owner may delete but not edit
        let denied = service
            .update_comment(comment.id, &Principal::user(f.u1), "edited")
            .await;
        assert!(matches!(denied, Err(FinboardError::AccessDenied(_))));

        let updated = service
            .update_comment(comment.id, &Principal::user(f.u3), "after")
            .await
            .unwrap();
        assert_eq!(updated.content, "after");

        let by_admin = service
            .update_comment(comment.id, &Principal::admin(f.admin), "moderated")
            .await
            .unwrap();
        assert_eq!(by_admin.content, "moderated");
    }

    #[tokio::test]
    async fn test_list_comments_by_user_hides_secret_parents() {
        let f = setup().await;
        let public_post = create_post(&f, false).await;
        let secret_post = create_post(&f, true).await;
        let service = CommentService::new(&f.db);

        service
            .create_comment(&Principal::user(f.u1), public_post, "public")
            .await
            .unwrap();
        service
            .create_comment(&Principal::user(f.u1), secret_post, "hidden")
            .await
            .unwrap();

        let seen_by_other = service
            .list_comments_by_user(f.u1, &Principal::user(f.u2))
            .await
            .unwrap();
        assert_eq!(seen_by_other.len(), 1);
        assert_eq!(seen_by_other[0].content, "public");

        let seen_by_self = service
            .list_comments_by_user(f.u1, &Principal::user(f.u1))
            .await
            .unwrap();
        assert_eq!(seen_by_self.len(), 2);
    }

    #[tokio::test]
    async fn test_comment_locked_when_post_turns_secret() {
        let f = setup().await;
        let post_id = create_post(&f, false).await;
        let service = CommentService::new(&f.db);

        let comment = service
            .create_comment(&Principal::user(f.u3), post_id, "while public")
            .await
            .unwrap();

        PostService::new(&f.db)
            .update_post(post_id, &Principal::user(f.u1), &PostUpdate::new().secret(true))
            .await
            .unwrap();

        let edit = service
            .update_comment(comment.id, &Principal::user(f.u3), "edited")
            .await;
        assert!(matches!(edit, Err(FinboardError::AccessDenied(_))));

        let delete = service
            .delete_comment(comment.id, &Principal::user(f.u3))
            .await;
        assert!(matches!(delete, Err(FinboardError::AccessDenied(_))));

        // post owner and admin still reach it
        let moderated = service
            .update_comment(comment.id, &Principal::admin(f.admin), "moderated")
            .await
            .unwrap();
        assert_eq!(moderated.content, "moderated");
        service
            .delete_comment(comment.id, &Principal::user(f.u1))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_list_comments_by_user_many_on_one_post() {
        let f = setup().await;
        let public_post = create_post(&f, false).await;
        let secret_post = create_post(&f, true).await;
        let service = CommentService::new(&f.db);

        for content in ["a", "b", "c"] {
            service
                .create_comment(&Principal::user(f.u1), public_post, content)
                .await
                .unwrap();
            service
                .create_comment(&Principal::user(f.u1), secret_post, content)
                .await
                .unwrap();
        }

        let seen = service
            .list_comments_by_user(f.u1, &Principal::user(f.u2))
            .await
            .unwrap();
        assert_eq!(seen.len(), 3);
        assert!(seen.iter().all(|c| c.post_id == public_post));
    }
}
