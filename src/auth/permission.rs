//! Content visibility and ownership authorization.
//!
//! Every read, write and delete decision on posts, comments and files goes through
//! the functions in this module. They are pure: the caller fetches a fresh entity
//! snapshot, resolves the acting [`Principal`], and asks for a decision. Nothing is
//! cached between calls.
//!
//! The rules:
//! - A public post is fully visible to everyone, including anonymous callers.
//! - A secret post is fully visible to its owner and to admins. Anyone else sees a
//!   redacted placeholder in listings and is refused on a direct fetch.
//! - Mutation (post update/delete, comment update, file upload/delete) requires the
//!   owner or an admin.
//! - A comment may also be deleted by the author of the post it belongs to.
//! - Comments and files inherit reachability from their parent post.

use crate::board::{Comment, Post};
use crate::{FinboardError, Result};

/// Message for a refused direct read of a secret post.
pub const SECRET_POST_DENIED: &str = "비밀글은 작성자 또는 관리자만 볼 수 있습니다.";

/// Message for operations that need a logged-in user.
pub const LOGIN_REQUIRED: &str = "로그인이 필요합니다.";

/// Message for admin-only operations.
pub const ADMIN_REQUIRED: &str = "관리자 권한이 필요합니다.";

/// The acting party of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Principal {
    /// Authenticated user ID, or None for anonymous callers.
    pub user_id: Option<i64>,
    /// Admin bypass flag.
    pub is_admin: bool,
}

impl Principal {
    /// Create a principal from its two components.
    pub fn new(user_id: Option<i64>, is_admin: bool) -> Self {
        Self { user_id, is_admin }
    }

    /// An unauthenticated caller.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A regular authenticated user.
    pub fn user(user_id: i64) -> Self {
        Self::new(Some(user_id), false)
    }

    /// An authenticated administrator.
    pub fn admin(user_id: i64) -> Self {
        Self::new(Some(user_id), true)
    }

    pub fn is_authenticated(&self) -> bool {
        self.user_id.is_some()
    }

    /// Whether this principal is the given owner. Anonymous never owns anything.
    pub fn is_owner(&self, owner_id: i64) -> bool {
        self.user_id == Some(owner_id)
    }
}

/// Outcome of a read decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Every field may be returned.
    Full,
    /// Existence may be shown, content must be replaced by a placeholder.
    Redacted,
    /// Nothing may be returned; the caller fails with access denied.
    Denied,
}

impl Visibility {
    pub fn is_full(&self) -> bool {
        matches!(self, Visibility::Full)
    }

    pub fn is_denied(&self) -> bool {
        matches!(self, Visibility::Denied)
    }
}

/// The kind of read being decided.
///
/// Listings degrade unauthorized secret posts to a placeholder so that ordering and
/// page counts stay stable. A direct fetch by ID has nothing to degrade to and fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadContext {
    /// List or search results.
    Listing,
    /// Single item fetched by ID, including the parent check for comments and files.
    Direct,
}

/// Decide how much of a post the principal may see.
pub fn can_view(post: &Post, principal: &Principal, context: ReadContext) -> Visibility {
    if !post.secret || principal.is_admin || principal.is_owner(post.owner_id) {
        return Visibility::Full;
    }

    match context {
        ReadContext::Listing => Visibility::Redacted,
        ReadContext::Direct => Visibility::Denied,
    }
}

/// Owner-or-admin check shared by every mutation.
pub fn can_mutate(owner_id: i64, principal: &Principal) -> bool {
    principal.is_admin || principal.is_owner(owner_id)
}

/// Comment deletion: admin, the comment's author, or the parent post's author.
pub fn can_delete_comment(comment: &Comment, post: &Post, principal: &Principal) -> bool {
    principal.is_admin || principal.is_owner(comment.owner_id) || principal.is_owner(post.owner_id)
}

/// Comment creation is allowed only on a post the principal can see in full.
pub fn can_create_comment(visibility: Visibility) -> bool {
    visibility.is_full()
}

/// Direct read check on a post, failing with access denied unless fully visible.
///
/// Comments and files call this on their parent post, which is what makes their
/// visibility transitive.
pub fn check_view(post: &Post, principal: &Principal) -> Result<()> {
    match can_view(post, principal, ReadContext::Direct) {
        Visibility::Full => Ok(()),
        Visibility::Redacted | Visibility::Denied => {
            Err(FinboardError::AccessDenied(SECRET_POST_DENIED.to_string()))
        }
    }
}

/// Owner-or-admin check that fails with the given message.
pub fn check_mutate(owner_id: i64, principal: &Principal, message: &str) -> Result<()> {
    if can_mutate(owner_id, principal) {
        Ok(())
    } else {
        Err(FinboardError::AccessDenied(message.to_string()))
    }
}

/// Require an authenticated principal and return its user ID.
pub fn require_login(principal: &Principal) -> Result<i64> {
    principal
        .user_id
        .ok_or_else(|| FinboardError::Auth(LOGIN_REQUIRED.to_string()))
}

/// Require an authenticated admin.
pub fn require_admin(principal: &Principal) -> Result<i64> {
    let user_id = require_login(principal)?;
    if !principal.is_admin {
        return Err(FinboardError::AccessDenied(ADMIN_REQUIRED.to_string()));
    }
    Ok(user_id)
}
