/// Feed service - builds paginated listings for the four feed scopes
use crate::db::{BlogStore, FeedScope};
use crate::error::{AppError, Result};
use crate::metrics::feed::record_feed_request;
use crate::models::{Group, PostView, User};
use crate::services::pagination::{Page, Paginator};
use std::sync::Arc;
use tracing::debug;

pub struct FeedService {
    store: Arc<dyn BlogStore>,
    paginator: Paginator,
}

impl FeedService {
    pub fn new(store: Arc<dyn BlogStore>, paginator: Paginator) -> Self {
        Self { store, paginator }
    }

    /// Every post, newest first
    pub async fn list_all(&self, page: Option<&str>) -> Result<Page<PostView>> {
        self.list(FeedScope::All, page).await
    }

    /// Posts filed under the group with `slug`
    pub async fn list_by_group(
        &self,
        slug: &str,
        page: Option<&str>,
    ) -> Result<(Group, Page<PostView>)> {
        let group = self
            .store
            .find_group_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::not_found(format!("group '{}'", slug)))?;

        let posts = self.list(FeedScope::Group(group.id), page).await?;
        Ok((group, posts))
    }

    /// Posts written by `username`
    pub async fn list_by_author(
        &self,
        username: &str,
        page: Option<&str>,
    ) -> Result<(User, Page<PostView>)> {
        let author = self
            .store
            .find_user_by_username(username)
            .await?
            .ok_or_else(|| AppError::not_found(format!("user '{}'", username)))?;

        let posts = self.list(FeedScope::Author(author.id), page).await?;
        Ok((author, posts))
    }

    /// Posts from every author `viewer_id` follows; empty when they follow no one
    pub async fn list_followed_feed(
        &self,
        viewer_id: i64,
        page: Option<&str>,
    ) -> Result<Page<PostView>> {
        self.list(FeedScope::FollowedBy(viewer_id), page).await
    }

    async fn list(&self, scope: FeedScope, page: Option<&str>) -> Result<Page<PostView>> {
        let total = self.store.count_posts(scope).await?;
        let located = self.paginator.locate(page, total);
        let posts = self.store.find_posts(scope, located.window).await?;

        record_feed_request(scope.label());
        debug!(
            scope = scope.label(),
            page = located.number,
            total,
            returned = posts.len(),
            "built listing page"
        );

        Ok(self.paginator.page(located, posts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{MemoryStore, PostRepository};
    use crate::models::PostDraft;

    fn draft(text: &str, group_id: Option<i64>) -> PostDraft {
        PostDraft {
            text: text.to_string(),
            group_id,
            image: None,
        }
    }

    #[tokio::test]
    async fn test_group_listing_is_isolated() {
        let store = Arc::new(MemoryStore::new());
        let author = store.insert_user("author").await;
        let group = store.insert_group("Test", "test_slug", "").await;
        let other = store.insert_group("Other", "other_slug", "").await;
        store
            .create_post(author.id, &draft("grouped", Some(group.id)))
            .await
            .unwrap();

        let feed = FeedService::new(store.clone(), Paginator::new(10));
        let (_, page) = feed.list_by_group("test_slug", None).await.unwrap();
        assert_eq!(page.count, 1);
        let (found, page) = feed.list_by_group("other_slug", None).await.unwrap();
        assert_eq!(found.id, other.id);
        assert!(page.object_list.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_slug_and_username_are_not_found() {
        let feed = FeedService::new(Arc::new(MemoryStore::new()), Paginator::new(10));
        assert!(matches!(
            feed.list_by_group("missing", None).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            feed.list_by_author("nobody", None).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_followed_feed_empty_without_follows() {
        let store = Arc::new(MemoryStore::new());
        let viewer = store.insert_user("viewer").await;
        let author = store.insert_user("author").await;
        store.create_post(author.id, &draft("hello", None)).await.unwrap();

        let feed = FeedService::new(store, Paginator::new(10));
        let page = feed.list_followed_feed(viewer.id, None).await.unwrap();
        assert_eq!(page.count, 0);
        assert_eq!(page.num_pages, 1);
    }
}
