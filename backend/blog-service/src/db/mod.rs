/// Database access layer
///
/// Repository traits describe the capabilities the services need; they are
/// implemented by `PgStore` (PostgreSQL via sqlx) and `MemoryStore`
/// (process-local, used for development and tests). Listings always come back
/// newest first with ties broken by id, so offsets are stable across requests.
pub mod memory;
pub mod postgres_store;

pub use memory::MemoryStore;
pub use postgres_store::PgStore;

use crate::models::{Comment, CommentView, Group, Post, PostDraft, PostView, User};
use anyhow::Result;

/// Which posts a listing covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedScope {
    /// Every post
    All,
    /// Posts filed under a group
    Group(i64),
    /// Posts written by one author
    Author(i64),
    /// Posts written by anyone the given user follows
    FollowedBy(i64),
}

impl FeedScope {
    /// Label used for logs and metrics
    pub fn label(&self) -> &'static str {
        match self {
            FeedScope::All => "all",
            FeedScope::Group(_) => "group",
            FeedScope::Author(_) => "author",
            FeedScope::FollowedBy(_) => "follow",
        }
    }
}

/// Slice of an ordered listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub limit: u64,
    pub offset: u64,
}

#[async_trait::async_trait]
pub trait PostRepository: Send + Sync {
    /// Number of posts in scope
    async fn count_posts(&self, scope: FeedScope) -> Result<u64>;

    /// Posts in scope, newest first (`created_at DESC, id DESC`)
    async fn find_posts(&self, scope: FeedScope, window: Window) -> Result<Vec<PostView>>;

    async fn find_post(&self, post_id: i64) -> Result<Option<PostView>>;

    async fn create_post(&self, author_id: i64, draft: &PostDraft) -> Result<Post>;

    /// Applies a draft; an absent image leaves the stored one untouched
    async fn update_post(&self, post_id: i64, draft: &PostDraft) -> Result<Option<Post>>;
}

#[async_trait::async_trait]
pub trait GroupRepository: Send + Sync {
    async fn find_group_by_slug(&self, slug: &str) -> Result<Option<Group>>;

    async fn find_group(&self, group_id: i64) -> Result<Option<Group>>;

    /// All groups ordered by title, for the post form's choice list
    async fn list_groups(&self) -> Result<Vec<Group>>;
}

#[async_trait::async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Mirror a user from the identity service, keeping its id
    async fn upsert_user(&self, user_id: i64, username: &str) -> Result<()>;
}

#[async_trait::async_trait]
pub trait CommentRepository: Send + Sync {
    async fn create_comment(&self, post_id: i64, author_id: i64, text: &str) -> Result<Comment>;

    /// Comments of a post, oldest first
    async fn list_comments(&self, post_id: i64) -> Result<Vec<CommentView>>;
}

#[async_trait::async_trait]
pub trait FollowRepository: Send + Sync {
    /// Idempotent insert; returns true if a new edge was created
    async fn insert_follow(&self, user_id: i64, author_id: i64) -> Result<bool>;

    /// Idempotent delete; returns true if an edge was removed
    async fn delete_follow(&self, user_id: i64, author_id: i64) -> Result<bool>;

    async fn follow_exists(&self, user_id: i64, author_id: i64) -> Result<bool>;
}

/// Everything the service needs from persistence
#[async_trait::async_trait]
pub trait BlogStore:
    PostRepository + GroupRepository + UserRepository + CommentRepository + FollowRepository
{
    /// Health check (optional)
    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}
