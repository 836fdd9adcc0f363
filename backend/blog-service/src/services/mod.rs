pub mod comments;
pub mod feed;
pub mod follow;
pub mod pagination;
pub mod posts;

pub use comments::CommentService;
pub use feed::FeedService;
pub use follow::{FollowOutcome, FollowService};
pub use pagination::{Page, PageWindow, Paginator};
pub use posts::{EditOutcome, PostDetail, PostService};
