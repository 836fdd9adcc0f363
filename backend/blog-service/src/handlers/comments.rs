use crate::app_state::AppState;
use crate::error::Result;
use crate::forms::CommentForm;
use crate::handlers::{post_detail_url, redirect};
use crate::middleware::CurrentUser;
use actix_web::{web, HttpResponse};

/// Add a comment; always lands back on the post, whether or not the text was valid
pub async fn add_comment(
    state: web::Data<AppState>,
    user: CurrentUser,
    post_id: web::Path<i64>,
    form: Option<web::Form<CommentForm>>,
) -> Result<HttpResponse> {
    let post_id = post_id.into_inner();

    state
        .comments
        .add_comment(post_id, user.0.id, form.as_deref())
        .await?;

    Ok(redirect(post_detail_url(post_id)))
}
