/// Comment service - attaches comments to posts
use crate::db::BlogStore;
use crate::error::{AppError, Result};
use crate::forms::CommentForm;
use crate::models::Comment;
use std::sync::Arc;
use tracing::{debug, info};

pub struct CommentService {
    store: Arc<dyn BlogStore>,
}

impl CommentService {
    pub fn new(store: Arc<dyn BlogStore>) -> Self {
        Self { store }
    }

    /// Add a comment to an existing post
    ///
    /// Returns `Ok(None)` when the submitted text is invalid; nothing is
    /// written in that case.
    pub async fn add_comment(
        &self,
        post_id: i64,
        author_id: i64,
        form: Option<&CommentForm>,
    ) -> Result<Option<Comment>> {
        if self.store.find_post(post_id).await?.is_none() {
            return Err(AppError::not_found(format!("post {}", post_id)));
        }

        let text = match form.map(CommentForm::cleaned_text) {
            Some(Ok(text)) => text,
            Some(Err(errors)) => {
                debug!(post_id, author_id, %errors, "comment rejected");
                return Ok(None);
            }
            None => return Ok(None),
        };

        let comment = self.store.create_comment(post_id, author_id, &text).await?;
        info!(comment_id = comment.id, post_id, author_id, "comment created");
        Ok(Some(comment))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{MemoryStore, PostRepository};
    use crate::models::PostDraft;

    #[tokio::test]
    async fn test_invalid_text_writes_nothing() {
        let store = Arc::new(MemoryStore::new());
        let author = store.insert_user("author").await;
        let post = store
            .create_post(
                author.id,
                &PostDraft {
                    text: "text".into(),
                    group_id: None,
                    image: None,
                },
            )
            .await
            .unwrap();
        let service = CommentService::new(store.clone());

        let blank = CommentForm { text: "  ".into() };
        assert!(service
            .add_comment(post.id, author.id, Some(&blank))
            .await
            .unwrap()
            .is_none());
        assert!(service.add_comment(post.id, author.id, None).await.unwrap().is_none());
        assert_eq!(store.comment_count().await, 0);

        let valid = CommentForm { text: "nice".into() };
        let comment = service
            .add_comment(post.id, author.id, Some(&valid))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(comment.text, "nice");
    }

    #[tokio::test]
    async fn test_unknown_post_is_not_found() {
        let store = Arc::new(MemoryStore::new());
        let author = store.insert_user("author").await;
        let service = CommentService::new(store);
        let form = CommentForm { text: "hi".into() };

        assert!(matches!(
            service.add_comment(42, author.id, Some(&form)).await,
            Err(AppError::NotFound(_))
        ));
    }
}
