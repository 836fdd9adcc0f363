use super::{
    BlogStore, CommentRepository, FeedScope, FollowRepository, GroupRepository, PostRepository,
    UserRepository, Window,
};
use crate::models::{
    Comment, CommentRow, CommentView, Group, Post, PostDraft, PostRow, PostView, User,
};
use anyhow::{Context, Result};
use sqlx::PgPool;
use tracing::debug;

const POST_VIEW_SELECT: &str = r#"
    SELECT p.id, p.text, p.image, p.created_at,
           p.author_id, u.username AS author_username,
           p.group_id, g.slug AS group_slug, g.title AS group_title
    FROM posts p
    JOIN users u ON u.id = p.author_id
    LEFT JOIN post_groups g ON g.id = p.group_id
"#;

const POST_COLUMNS: &str = "id, author_id, group_id, text, image, created_at";

/// PostgreSQL-backed store (source of truth in production)
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// `WHERE` fragment for a scope; the scope's id, if any, is always `$1`
fn scope_filter(scope: FeedScope) -> (&'static str, Option<i64>) {
    match scope {
        FeedScope::All => ("", None),
        FeedScope::Group(group_id) => ("WHERE p.group_id = $1", Some(group_id)),
        FeedScope::Author(author_id) => ("WHERE p.author_id = $1", Some(author_id)),
        FeedScope::FollowedBy(user_id) => (
            "WHERE p.author_id IN (SELECT f.author_id FROM follows f WHERE f.user_id = $1)",
            Some(user_id),
        ),
    }
}

#[async_trait::async_trait]
impl PostRepository for PgStore {
    async fn count_posts(&self, scope: FeedScope) -> Result<u64> {
        let (filter, id) = scope_filter(scope);
        let sql = format!("SELECT COUNT(*) FROM posts p {}", filter);

        let mut query = sqlx::query_scalar::<_, i64>(&sql);
        if let Some(id) = id {
            query = query.bind(id);
        }
        let count = query
            .fetch_one(&self.pool)
            .await
            .with_context(|| format!("Failed to count posts ({})", scope.label()))?;

        Ok(count.max(0) as u64)
    }

    async fn find_posts(&self, scope: FeedScope, window: Window) -> Result<Vec<PostView>> {
        let (filter, id) = scope_filter(scope);
        let (limit_at, offset_at) = if id.is_some() { (2, 3) } else { (1, 2) };
        let sql = format!(
            "{} {} ORDER BY p.created_at DESC, p.id DESC LIMIT ${} OFFSET ${}",
            POST_VIEW_SELECT, filter, limit_at, offset_at
        );

        let mut query = sqlx::query_as::<_, PostRow>(&sql);
        if let Some(id) = id {
            query = query.bind(id);
        }
        let rows = query
            .bind(window.limit as i64)
            .bind(window.offset as i64)
            .fetch_all(&self.pool)
            .await
            .with_context(|| format!("Failed to list posts ({})", scope.label()))?;

        Ok(rows.into_iter().map(PostView::from).collect())
    }

    async fn find_post(&self, post_id: i64) -> Result<Option<PostView>> {
        let sql = format!("{} WHERE p.id = $1", POST_VIEW_SELECT);
        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(post_id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch post")?;

        Ok(row.map(PostView::from))
    }

    async fn create_post(&self, author_id: i64, draft: &PostDraft) -> Result<Post> {
        let sql = format!(
            r#"
            INSERT INTO posts (author_id, group_id, text, image)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            POST_COLUMNS
        );
        let post = sqlx::query_as::<_, Post>(&sql)
            .bind(author_id)
            .bind(draft.group_id)
            .bind(&draft.text)
            .bind(&draft.image)
            .fetch_one(&self.pool)
            .await
            .context("Failed to create post")?;

        debug!("Created post {} by {}", post.id, author_id);
        Ok(post)
    }

    async fn update_post(&self, post_id: i64, draft: &PostDraft) -> Result<Option<Post>> {
        let sql = format!(
            r#"
            UPDATE posts
            SET text = $2, group_id = $3, image = COALESCE($4, image)
            WHERE id = $1
            RETURNING {}
            "#,
            POST_COLUMNS
        );
        let post = sqlx::query_as::<_, Post>(&sql)
            .bind(post_id)
            .bind(&draft.text)
            .bind(draft.group_id)
            .bind(&draft.image)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to update post")?;

        Ok(post)
    }
}

#[async_trait::async_trait]
impl GroupRepository for PgStore {
    async fn find_group_by_slug(&self, slug: &str) -> Result<Option<Group>> {
        sqlx::query_as::<_, Group>(
            "SELECT id, title, slug, description FROM post_groups WHERE slug = $1",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch group by slug")
    }

    async fn find_group(&self, group_id: i64) -> Result<Option<Group>> {
        sqlx::query_as::<_, Group>(
            "SELECT id, title, slug, description FROM post_groups WHERE id = $1",
        )
        .bind(group_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch group")
    }

    async fn list_groups(&self) -> Result<Vec<Group>> {
        sqlx::query_as::<_, Group>(
            "SELECT id, title, slug, description FROM post_groups ORDER BY title, id",
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list groups")
    }
}

#[async_trait::async_trait]
impl UserRepository for PgStore {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        sqlx::query_as::<_, User>("SELECT id, username FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch user by username")
    }

    async fn upsert_user(&self, user_id: i64, username: &str) -> Result<()> {
        // Unchanged rows are left alone so repeat requests don't rewrite them.
        sqlx::query(
            r#"
            INSERT INTO users (id, username)
            VALUES ($1, $2)
            ON CONFLICT (id) DO UPDATE SET username = EXCLUDED.username
            WHERE users.username IS DISTINCT FROM EXCLUDED.username
            "#,
        )
        .bind(user_id)
        .bind(username)
        .execute(&self.pool)
        .await
        .context("Failed to upsert user")?;

        debug!("Upserted user {} ({})", user_id, username);
        Ok(())
    }
}

#[async_trait::async_trait]
impl CommentRepository for PgStore {
    async fn create_comment(&self, post_id: i64, author_id: i64, text: &str) -> Result<Comment> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (post_id, author_id, text)
            VALUES ($1, $2, $3)
            RETURNING id, post_id, author_id, text, created_at
            "#,
        )
        .bind(post_id)
        .bind(author_id)
        .bind(text)
        .fetch_one(&self.pool)
        .await
        .context("Failed to create comment")?;

        debug!("Created comment {} on post {}", comment.id, post_id);
        Ok(comment)
    }

    async fn list_comments(&self, post_id: i64) -> Result<Vec<CommentView>> {
        let rows = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT c.id, c.post_id, c.text, c.created_at,
                   c.author_id, u.username AS author_username
            FROM comments c
            JOIN users u ON u.id = c.author_id
            WHERE c.post_id = $1
            ORDER BY c.created_at ASC, c.id ASC
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list comments")?;

        Ok(rows.into_iter().map(CommentView::from).collect())
    }
}

#[async_trait::async_trait]
impl FollowRepository for PgStore {
    async fn insert_follow(&self, user_id: i64, author_id: i64) -> Result<bool> {
        let inserted = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO follows (user_id, author_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, author_id) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(author_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to create follow")?;

        if inserted.is_some() {
            debug!("Created follow {} -> {}", user_id, author_id);
        }
        Ok(inserted.is_some())
    }

    async fn delete_follow(&self, user_id: i64, author_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM follows WHERE user_id = $1 AND author_id = $2")
            .bind(user_id)
            .bind(author_id)
            .execute(&self.pool)
            .await
            .context("Failed to delete follow")?;

        Ok(result.rows_affected() > 0)
    }

    async fn follow_exists(&self, user_id: i64, author_id: i64) -> Result<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM follows WHERE user_id = $1 AND author_id = $2)",
        )
        .bind(user_id)
        .bind(author_id)
        .fetch_one(&self.pool)
        .await
        .context("Failed to check follow")
    }
}

#[async_trait::async_trait]
impl BlogStore for PgStore {
    async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .context("PostgreSQL health check failed")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_filter_binds_id_first() {
        assert_eq!(scope_filter(FeedScope::All), ("", None));
        assert_eq!(scope_filter(FeedScope::Group(4)).1, Some(4));
        assert!(scope_filter(FeedScope::FollowedBy(9))
            .0
            .contains("SELECT f.author_id FROM follows f WHERE f.user_id = $1"));
    }
}
