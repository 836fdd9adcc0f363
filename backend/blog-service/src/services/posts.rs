/// Post service - handles post creation, editing and the detail page
use crate::db::BlogStore;
use crate::error::{AppError, Result};
use crate::forms::{invalid_choice, PostForm};
use crate::models::{CommentView, Group, Post, PostDraft, PostView};
use std::sync::Arc;
use tracing::info;
use validator::ValidationErrors;

/// Result of an edit attempt by some viewer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    Updated(Post),
    /// Viewer isn't the author; nothing was written
    NotAuthor,
}

/// Post with its comments, oldest comment first
#[derive(Debug, Clone)]
pub struct PostDetail {
    pub post: PostView,
    pub comments: Vec<CommentView>,
}

pub struct PostService {
    store: Arc<dyn BlogStore>,
}

impl PostService {
    pub fn new(store: Arc<dyn BlogStore>) -> Self {
        Self { store }
    }

    /// Get a post by ID
    pub async fn get_post(&self, post_id: i64) -> Result<PostView> {
        self.store
            .find_post(post_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("post {}", post_id)))
    }

    pub async fn detail(&self, post_id: i64) -> Result<PostDetail> {
        let post = self.get_post(post_id).await?;
        let comments = self.store.list_comments(post_id).await?;
        Ok(PostDetail { post, comments })
    }

    /// Choices for the post form's group field
    pub async fn groups(&self) -> Result<Vec<Group>> {
        Ok(self.store.list_groups().await?)
    }

    pub async fn create_post(&self, author_id: i64, form: &PostForm) -> Result<Post> {
        let draft = self.clean(form).await?;
        let post = self.store.create_post(author_id, &draft).await?;

        info!(post_id = post.id, author_id, "post created");
        Ok(post)
    }

    /// Apply an edit if `editor_id` wrote the post
    pub async fn edit_post(
        &self,
        post_id: i64,
        editor_id: i64,
        form: &PostForm,
    ) -> Result<EditOutcome> {
        let post = self.get_post(post_id).await?;
        if post.author.id != editor_id {
            info!(post_id, editor_id, "edit refused for non-author");
            return Ok(EditOutcome::NotAuthor);
        }

        let draft = self.clean(form).await?;
        let updated = self
            .store
            .update_post(post_id, &draft)
            .await?
            .ok_or_else(|| AppError::not_found(format!("post {}", post_id)))?;

        info!(post_id, editor_id, "post updated");
        Ok(EditOutcome::Updated(updated))
    }

    async fn clean(&self, form: &PostForm) -> Result<PostDraft> {
        let draft = form.to_draft()?;

        if let Some(group_id) = draft.group_id {
            if self.store.find_group(group_id).await?.is_none() {
                let mut errors = ValidationErrors::new();
                errors.add("group", invalid_choice());
                return Err(AppError::Validation(errors));
            }
        }

        Ok(draft)
    }
}
