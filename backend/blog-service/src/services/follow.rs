/// Follow service - manages the viewer -> author follow graph
///
/// Both directions are idempotent: following twice, following yourself and
/// unfollowing someone you don't follow all succeed without changing anything.
use crate::db::BlogStore;
use crate::error::{AppError, Result};
use crate::metrics::feed::record_follow_event;
use crate::models::User;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowOutcome {
    Created,
    AlreadyFollowing,
    SelfFollow,
}

impl FollowOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            FollowOutcome::Created => "created",
            FollowOutcome::AlreadyFollowing => "already_following",
            FollowOutcome::SelfFollow => "self_follow",
        }
    }
}

pub struct FollowService {
    store: Arc<dyn BlogStore>,
}

impl FollowService {
    pub fn new(store: Arc<dyn BlogStore>) -> Self {
        Self { store }
    }

    /// Resolve the author a follow route points at
    pub async fn author(&self, username: &str) -> Result<User> {
        self.store
            .find_user_by_username(username)
            .await?
            .ok_or_else(|| AppError::not_found(format!("user '{}'", username)))
    }

    pub async fn follow(&self, follower_id: i64, author_id: i64) -> Result<FollowOutcome> {
        let outcome = if follower_id == author_id {
            FollowOutcome::SelfFollow
        } else if self.store.insert_follow(follower_id, author_id).await? {
            FollowOutcome::Created
        } else {
            FollowOutcome::AlreadyFollowing
        };

        record_follow_event(outcome.as_str());
        info!(
            follower_id,
            author_id,
            outcome = outcome.as_str(),
            "follow requested"
        );
        Ok(outcome)
    }

    /// Returns true if an edge was removed
    pub async fn unfollow(&self, follower_id: i64, author_id: i64) -> Result<bool> {
        let removed = self.store.delete_follow(follower_id, author_id).await?;

        record_follow_event(if removed { "removed" } else { "not_following" });
        info!(follower_id, author_id, removed, "unfollow requested");
        Ok(removed)
    }

    pub async fn is_following(&self, follower_id: i64, author_id: i64) -> Result<bool> {
        Ok(self.store.follow_exists(follower_id, author_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    #[tokio::test]
    async fn test_follow_twice_creates_one_edge() {
        let store = Arc::new(MemoryStore::new());
        let reader = store.insert_user("reader").await;
        let author = store.insert_user("author").await;
        let service = FollowService::new(store.clone());

        assert_eq!(
            service.follow(reader.id, author.id).await.unwrap(),
            FollowOutcome::Created
        );
        assert_eq!(
            service.follow(reader.id, author.id).await.unwrap(),
            FollowOutcome::AlreadyFollowing
        );
        assert_eq!(store.follow_count().await, 1);
        assert!(service.is_following(reader.id, author.id).await.unwrap());
        assert!(!service.is_following(author.id, reader.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_self_follow_is_ignored() {
        let store = Arc::new(MemoryStore::new());
        let user = store.insert_user("loner").await;
        let service = FollowService::new(store.clone());

        assert_eq!(
            service.follow(user.id, user.id).await.unwrap(),
            FollowOutcome::SelfFollow
        );
        assert_eq!(store.follow_count().await, 0);
    }

    #[tokio::test]
    async fn test_unfollow_missing_edge_is_noop() {
        let store = Arc::new(MemoryStore::new());
        let reader = store.insert_user("reader").await;
        let author = store.insert_user("author").await;
        let service = FollowService::new(store.clone());

        assert!(!service.unfollow(reader.id, author.id).await.unwrap());
        assert_eq!(store.follow_count().await, 0);
    }
}
