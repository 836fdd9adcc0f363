/// Process-local store
///
/// Same contract as `PgStore`, held behind one `RwLock`. Used when
/// `STORE_BACKEND=memory` and by the integration tests, which seed it through
/// the inherent helpers below.
use super::{
    BlogStore, CommentRepository, FeedScope, FollowRepository, GroupRepository, PostRepository,
    UserRepository, Window,
};
use crate::models::{
    AuthorRef, Comment, CommentView, Follow, Group, GroupRef, Post, PostDraft, PostView, User,
};
use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Default)]
struct Tables {
    users: HashMap<i64, User>,
    groups: HashMap<i64, Group>,
    posts: HashMap<i64, Post>,
    comments: Vec<Comment>,
    follows: Vec<Follow>,
    next_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn in_scope(&self, post: &Post, scope: FeedScope) -> bool {
        match scope {
            FeedScope::All => true,
            FeedScope::Group(group_id) => post.group_id == Some(group_id),
            FeedScope::Author(author_id) => post.author_id == author_id,
            FeedScope::FollowedBy(user_id) => self
                .follows
                .iter()
                .any(|f| f.user_id == user_id && f.author_id == post.author_id),
        }
    }

    fn view(&self, post: &Post) -> PostView {
        let username = self
            .users
            .get(&post.author_id)
            .map(|u| u.username.clone())
            .unwrap_or_default();
        let group = post
            .group_id
            .and_then(|id| self.groups.get(&id))
            .map(|g| GroupRef {
                id: g.id,
                slug: g.slug.clone(),
                title: g.title.clone(),
            });

        PostView {
            id: post.id,
            text: post.text.clone(),
            image: post.image.clone(),
            created_at: post.created_at,
            author: AuthorRef {
                id: post.author_id,
                username,
            },
            group,
        }
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user mirrored from the identity service
    pub async fn insert_user(&self, username: &str) -> User {
        let mut tables = self.tables.write().await;
        let id = tables.next_id();
        let user = User {
            id,
            username: username.to_string(),
        };
        tables.users.insert(id, user.clone());
        user
    }

    pub async fn insert_group(&self, title: &str, slug: &str, description: &str) -> Group {
        let mut tables = self.tables.write().await;
        let id = tables.next_id();
        let group = Group {
            id,
            title: title.to_string(),
            slug: slug.to_string(),
            description: description.to_string(),
        };
        tables.groups.insert(id, group.clone());
        group
    }

    /// Insert a post with an explicit timestamp
    pub async fn insert_post_at(
        &self,
        author_id: i64,
        draft: &PostDraft,
        created_at: DateTime<Utc>,
    ) -> Result<Post> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&author_id) {
            bail!("Unknown author {}", author_id);
        }
        if let Some(group_id) = draft.group_id {
            if !tables.groups.contains_key(&group_id) {
                bail!("Unknown group {}", group_id);
            }
        }

        let id = tables.next_id();
        let post = Post {
            id,
            author_id,
            group_id: draft.group_id,
            text: draft.text.clone(),
            image: draft.image.clone(),
            created_at,
        };
        tables.posts.insert(id, post.clone());
        Ok(post)
    }

    /// Delete every post and its comments
    pub async fn clear_posts(&self) {
        let mut tables = self.tables.write().await;
        tables.posts.clear();
        tables.comments.clear();
    }

    pub async fn post_count(&self) -> usize {
        self.tables.read().await.posts.len()
    }

    pub async fn comment_count(&self) -> usize {
        self.tables.read().await.comments.len()
    }

    pub async fn follow_count(&self) -> usize {
        self.tables.read().await.follows.len()
    }
}

#[async_trait::async_trait]
impl PostRepository for MemoryStore {
    async fn count_posts(&self, scope: FeedScope) -> Result<u64> {
        let tables = self.tables.read().await;
        let count = tables
            .posts
            .values()
            .filter(|p| tables.in_scope(p, scope))
            .count();
        Ok(count as u64)
    }

    async fn find_posts(&self, scope: FeedScope, window: Window) -> Result<Vec<PostView>> {
        let tables = self.tables.read().await;
        let mut posts: Vec<&Post> = tables
            .posts
            .values()
            .filter(|p| tables.in_scope(p, scope))
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        Ok(posts
            .into_iter()
            .skip(window.offset as usize)
            .take(window.limit as usize)
            .map(|p| tables.view(p))
            .collect())
    }

    async fn find_post(&self, post_id: i64) -> Result<Option<PostView>> {
        let tables = self.tables.read().await;
        Ok(tables.posts.get(&post_id).map(|p| tables.view(p)))
    }

    async fn create_post(&self, author_id: i64, draft: &PostDraft) -> Result<Post> {
        self.insert_post_at(author_id, draft, Utc::now()).await
    }

    async fn update_post(&self, post_id: i64, draft: &PostDraft) -> Result<Option<Post>> {
        let mut tables = self.tables.write().await;
        let Some(post) = tables.posts.get_mut(&post_id) else {
            return Ok(None);
        };

        post.text = draft.text.clone();
        post.group_id = draft.group_id;
        if let Some(image) = &draft.image {
            post.image = Some(image.clone());
        }
        Ok(Some(post.clone()))
    }
}

#[async_trait::async_trait]
impl GroupRepository for MemoryStore {
    async fn find_group_by_slug(&self, slug: &str) -> Result<Option<Group>> {
        let tables = self.tables.read().await;
        Ok(tables.groups.values().find(|g| g.slug == slug).cloned())
    }

    async fn find_group(&self, group_id: i64) -> Result<Option<Group>> {
        Ok(self.tables.read().await.groups.get(&group_id).cloned())
    }

    async fn list_groups(&self) -> Result<Vec<Group>> {
        let tables = self.tables.read().await;
        let mut groups: Vec<Group> = tables.groups.values().cloned().collect();
        groups.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));
        Ok(groups)
    }
}

#[async_trait::async_trait]
impl UserRepository for MemoryStore {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn upsert_user(&self, user_id: i64, username: &str) -> Result<()> {
        let mut tables = self.tables.write().await;
        if tables
            .users
            .values()
            .any(|u| u.username == username && u.id != user_id)
        {
            bail!("Username '{}' already belongs to another user", username);
        }

        tables.users.insert(
            user_id,
            User {
                id: user_id,
                username: username.to_string(),
            },
        );
        tables.next_id = tables.next_id.max(user_id);
        Ok(())
    }
}

#[async_trait::async_trait]
impl CommentRepository for MemoryStore {
    async fn create_comment(&self, post_id: i64, author_id: i64, text: &str) -> Result<Comment> {
        let mut tables = self.tables.write().await;
        if !tables.posts.contains_key(&post_id) {
            bail!("Unknown post {}", post_id);
        }
        if !tables.users.contains_key(&author_id) {
            bail!("Unknown author {}", author_id);
        }

        let id = tables.next_id();
        let comment = Comment {
            id,
            post_id,
            author_id,
            text: text.to_string(),
            created_at: Utc::now(),
        };
        tables.comments.push(comment.clone());
        Ok(comment)
    }

    async fn list_comments(&self, post_id: i64) -> Result<Vec<CommentView>> {
        let tables = self.tables.read().await;
        let mut comments: Vec<CommentView> = tables
            .comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .map(|c| CommentView {
                id: c.id,
                post_id: c.post_id,
                text: c.text.clone(),
                created_at: c.created_at,
                author: AuthorRef {
                    id: c.author_id,
                    username: tables
                        .users
                        .get(&c.author_id)
                        .map(|u| u.username.clone())
                        .unwrap_or_default(),
                },
            })
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(comments)
    }
}

#[async_trait::async_trait]
impl FollowRepository for MemoryStore {
    async fn insert_follow(&self, user_id: i64, author_id: i64) -> Result<bool> {
        if user_id == author_id {
            bail!("A user cannot follow themselves");
        }

        let mut tables = self.tables.write().await;
        for id in [user_id, author_id] {
            if !tables.users.contains_key(&id) {
                bail!("Unknown user {}", id);
            }
        }
        if tables
            .follows
            .iter()
            .any(|f| f.user_id == user_id && f.author_id == author_id)
        {
            return Ok(false);
        }

        let id = tables.next_id();
        tables.follows.push(Follow {
            id,
            user_id,
            author_id,
            created_at: Utc::now(),
        });
        Ok(true)
    }

    async fn delete_follow(&self, user_id: i64, author_id: i64) -> Result<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.follows.len();
        tables
            .follows
            .retain(|f| !(f.user_id == user_id && f.author_id == author_id));
        Ok(tables.follows.len() < before)
    }

    async fn follow_exists(&self, user_id: i64, author_id: i64) -> Result<bool> {
        let tables = self.tables.read().await;
        Ok(tables
            .follows
            .iter()
            .any(|f| f.user_id == user_id && f.author_id == author_id))
    }
}

impl BlogStore for MemoryStore {}
