use crate::db::BlogStore;
use crate::services::{CommentService, FeedService, FollowService, Paginator, PostService};
use page_cache::PageCache;
use std::sync::Arc;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn BlogStore>,
    pub page_cache: Arc<PageCache>,
    pub feed: Arc<FeedService>,
    pub posts: Arc<PostService>,
    pub comments: Arc<CommentService>,
    pub follows: Arc<FollowService>,
}

impl AppState {
    pub fn new(store: Arc<dyn BlogStore>, page_cache: Arc<PageCache>, posts_per_page: u64) -> Self {
        let paginator = Paginator::new(posts_per_page);

        Self {
            feed: Arc::new(FeedService::new(store.clone(), paginator)),
            posts: Arc::new(PostService::new(store.clone())),
            comments: Arc::new(CommentService::new(store.clone())),
            follows: Arc::new(FollowService::new(store.clone())),
            store,
            page_cache,
        }
    }
}
